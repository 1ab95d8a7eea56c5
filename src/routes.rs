// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, leaderboard, questions, quiz, user},
    state::AppState,
    utils::admin::{ADMIN_TOKEN_HEADER, admin_token_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, questions, quiz, user, leaderboard, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://localhost:10000"),
        HeaderValue::from_static("http://127.0.0.1:10000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(ADMIN_TOKEN_HEADER),
        ]);

    let auth_routes = Router::new().route("/login", post(auth::login));

    let quiz_routes = Router::new()
        .route("/start", post(quiz::start_quiz))
        .route("/{session_id}", get(quiz::get_quiz).put(quiz::update_quiz))
        .route("/{session_id}/submit", post(quiz::submit_quiz));

    let user_routes = Router::new()
        .route("/{user_id}/progress", get(user::get_progress))
        .route("/{user_id}/reset", post(user::reset_progress))
        .route("/{user_id}/sessions", get(user::list_sessions));

    let leaderboard_routes = Router::new()
        .route("/global", get(leaderboard::global))
        .route("/user/{user_id}", get(leaderboard::for_user));

    let admin_routes = Router::new()
        .route("/flush", post(admin::flush))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_token_middleware,
        ));

    Router::new()
        .route("/api/questions", get(questions::list_questions))
        .nest("/api/auth", auth_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/user", user_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
