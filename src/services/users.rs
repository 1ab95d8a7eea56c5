// src/services/users.rs

use crate::{
    error::AppError,
    models::user::User,
    store::{QuizStore, StoreError},
    utils::slug::slugify,
};

/// Trims a submitted display name and rejects blank ones.
pub fn normalize_display_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("User name must not be blank".to_string()));
    }
    Ok(name.to_string())
}

/// Returns the user registered under `display_name`, creating it on first use.
///
/// Two different display names can share a slug ("Ada Lovelace" and
/// "ada lovelace"); the second one resolves to the user owning the slug.
pub async fn find_or_create_user(store: &dyn QuizStore, display_name: &str) -> Result<User, AppError> {
    let display_name = normalize_display_name(display_name)?;

    if let Some(user) = store.find_user_by_display_name(&display_name).await? {
        return Ok(user);
    }

    let username = slugify(&display_name);
    match store.insert_user(&username, &display_name).await {
        Ok(user) => {
            tracing::info!("Created user {} ({})", user.id, user.username);
            Ok(user)
        }
        Err(StoreError::UniqueViolation(_)) => {
            tracing::debug!("Username {} already taken, re-fetching", username);
            store
                .find_user_by_username(&username)
                .await?
                .ok_or_else(|| {
                    AppError::InternalServerError(format!(
                        "user '{}' vanished after a unique violation",
                        username
                    ))
                })
        }
        Err(e) => Err(e.into()),
    }
}

/// Loads a user or fails with 404.
pub async fn require_user(store: &dyn QuizStore, user_id: i64) -> Result<User, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
