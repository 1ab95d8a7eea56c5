// tests/leaderboard_tests.rs

use quiz_backend::{
    config::Config,
    models::question::NewQuestion,
    routes,
    state::AppState,
    store::{MemoryStore, QuizStore},
};
use std::collections::HashMap;
use std::sync::Arc;

const ADMIN_TOKEN: &str = "leaderboard_admin_token";

async fn spawn_app(legacy_flush_login: bool) -> String {
    let store = Arc::new(MemoryStore::new());
    let questions: Vec<NewQuestion> = (1..=60)
        .map(|i| NewQuestion {
            question: format!("Question {}", i),
            options: [("A", "Right"), ("B", "Wrong")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            answer: "A".to_string(),
            explanation: None,
        })
        .collect();
    store.seed_questions(&questions).await.unwrap();

    let config = Config {
        database_url: None,
        rust_log: "error".to_string(),
        port: 0,
        log_dir: "logs".to_string(),
        questions_path: None,
        admin_token: Some(ADMIN_TOKEN.to_string()),
        legacy_flush_login,
    };

    let state = AppState { store, config };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Plays a full quiz with `correct` right answers and the given elapsed time.
/// Returns the user id.
async fn play(
    client: &reqwest::Client,
    address: &str,
    name: &str,
    count: usize,
    correct: usize,
    elapsed: i64,
) -> i64 {
    let session: serde_json::Value = client
        .post(&format!("{}/api/quiz/start", address))
        .json(&serde_json::json!({ "questionCount": count, "userName": name }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session_id = session["id"].as_i64().unwrap();

    let mut answers = HashMap::new();
    for (i, id) in session["questionIds"].as_array().unwrap().iter().enumerate() {
        let key = if i < correct { "A" } else { "B" };
        answers.insert(id.as_i64().unwrap().to_string(), key);
    }

    let update = client
        .put(&format!("{}/api/quiz/{}", address, session_id))
        .json(&serde_json::json!({ "answers": answers, "timeElapsed": elapsed }))
        .send()
        .await
        .unwrap();
    assert_eq!(update.status().as_u16(), 200);

    let submit = client
        .post(&format!("{}/api/quiz/{}/submit", address, session_id))
        .send()
        .await
        .unwrap();
    assert_eq!(submit.status().as_u16(), 200);

    session["userId"].as_i64().unwrap()
}

async fn get_json(client: &reqwest::Client, url: String) -> serde_json::Value {
    client.get(&url).send().await.unwrap().json().await.unwrap()
}

fn names(board: &serde_json::Value) -> Vec<String> {
    board
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["displayName"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn global_board_orders_by_percentage_then_time() {
    let address = spawn_app(true).await;
    let client = reqwest::Client::new();

    play(&client, &address, "Eighty Fast", 20, 16, 60).await; // 80%
    play(&client, &address, "Ninety Slow", 20, 18, 120).await; // 90%
    play(&client, &address, "Ninety Quick", 20, 18, 90).await; // 90%

    let board = get_json(&client, format!("{}/api/leaderboard/global", address)).await;
    assert_eq!(
        names(&board),
        vec!["Ninety Quick", "Ninety Slow", "Eighty Fast"]
    );
    assert_eq!(board[0]["percentage"], 90);
    assert_eq!(board[0]["timeElapsed"], 90);
    assert_eq!(board[2]["score"], 16);
}

#[tokio::test]
async fn question_count_filters_the_board() {
    let address = spawn_app(true).await;
    let client = reqwest::Client::new();

    play(&client, &address, "Twenty", 20, 10, 60).await;
    play(&client, &address, "Thirty", 30, 10, 60).await;

    let thirty = get_json(
        &client,
        format!("{}/api/leaderboard/global?questionCount=30", address),
    )
    .await;
    assert_eq!(names(&thirty), vec!["Thirty"]);

    let all = get_json(
        &client,
        format!("{}/api/leaderboard/global?questionCount=", address),
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn user_board_holds_only_that_user() {
    let address = spawn_app(true).await;
    let client = reqwest::Client::new();

    let alice = play(&client, &address, "Alice", 20, 10, 60).await;
    play(&client, &address, "Bob", 20, 20, 60).await;
    play(&client, &address, "Alice", 20, 15, 60).await;

    let board = get_json(
        &client,
        format!("{}/api/leaderboard/user/{}", address, alice),
    )
    .await;
    assert_eq!(names(&board), vec!["Alice", "Alice"]);
    assert_eq!(board[0]["percentage"], 75);
    assert_eq!(board[1]["percentage"], 50);

    let sessions = get_json(&client, format!("{}/api/user/{}/sessions", address, alice)).await;
    assert_eq!(sessions.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn flush_login_wipes_boards_and_progress() {
    let address = spawn_app(true).await;
    let client = reqwest::Client::new();
    let alice = play(&client, &address, "Alice", 20, 10, 60).await;

    let flushed: serde_json::Value = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "userName": "FLUSH" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(flushed["id"], 999);
    assert_eq!(flushed["displayName"], "Scoreboards Flushed");

    let board = get_json(&client, format!("{}/api/leaderboard/global", address)).await;
    assert!(board.as_array().unwrap().is_empty());

    let progress = get_json(&client, format!("{}/api/user/{}/progress", address, alice)).await;
    assert_eq!(progress["seenQuestions"], 0);
}

#[tokio::test]
async fn flush_is_an_ordinary_name_when_legacy_login_is_off() {
    let address = spawn_app(false).await;
    let client = reqwest::Client::new();
    play(&client, &address, "Alice", 20, 10, 60).await;

    let user: serde_json::Value = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "userName": "flush" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(user["id"], 999);
    assert_eq!(user["username"], "flush");

    let board = get_json(&client, format!("{}/api/leaderboard/global", address)).await;
    assert_eq!(board.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_flush_requires_the_token() {
    let address = spawn_app(false).await;
    let client = reqwest::Client::new();
    play(&client, &address, "Alice", 20, 10, 60).await;

    let denied = client
        .post(&format!("{}/api/admin/flush", address))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 401);

    let wrong = client
        .post(&format!("{}/api/admin/flush", address))
        .header("x-admin-token", "nope")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status().as_u16(), 401);

    let ok = client
        .post(&format!("{}/api/admin/flush", address))
        .header("x-admin-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status().as_u16(), 200);
    let summary: serde_json::Value = ok.json().await.unwrap();
    assert_eq!(summary["sessionsDeleted"], 1);
    assert_eq!(summary["ledgerRowsDeleted"], 20);

    let board = get_json(&client, format!("{}/api/leaderboard/global", address)).await;
    assert!(board.as_array().unwrap().is_empty());
}
