mod common;

use common::BOT_SECRET;
use reqwest::StatusCode;

async fn init_token(app: &common::TestApp) -> String {
    let response = app
        .client
        .post(app.url("/auth/telegram/init"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(StatusCode::OK, response.status());

    let body: serde_json::Value = response.json().await.unwrap();
    let bot_url = body["item"]["bot_url"].as_str().unwrap();
    let token = body["item"]["token"].as_str().unwrap().to_string();
    assert!(bot_url.ends_with(&format!("?start={}", token)));
    token
}

async fn complete(app: &common::TestApp, token: &str, secret: &str) -> reqwest::Response {
    let body = serde_json::to_vec(&serde_json::json!({
        "token": token,
        "telegram_id": 777001,
        "username": "tg_user",
        "first_name": "Ivan",
    }))
    .unwrap();
    let signature = pcbuilds::sign_body(secret.as_bytes(), &body).unwrap();

    app.client
        .post(app.url("/auth/telegram/complete"))
        .header("Content-Type", "application/json")
        .header("X-Bot-Signature", signature)
        .body(body)
        .send()
        .await
        .expect("Failed to execute request.")
}

async fn check(app: &common::TestApp, token: &str) -> reqwest::Response {
    app.client
        .get(app.url(&format!("/auth/telegram/check/{}", token)))
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn handshake_yields_a_token_exactly_once() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = init_token(&app).await;

    let response = check(&app, &token).await;
    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["item"]["status"], "pending");

    let response = complete(&app, &token, BOT_SECRET).await;
    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    let user_id = body["id"].as_i64().unwrap();

    let response = check(&app, &token).await;
    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["item"]["status"], "completed");
    assert_eq!(body["item"]["user_id"].as_i64(), Some(user_id));
    let access_token = body["item"]["access_token"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = check(&app, &token).await;
    assert_eq!(StatusCode::NOT_FOUND, response.status());

    let response = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(&access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["item"]["name"], "Ivan");
}

#[tokio::test]
async fn completion_with_a_wrong_signature_is_unauthorized() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = init_token(&app).await;

    let response = complete(&app, &token, "some-other-secret").await;
    assert_eq!(StatusCode::UNAUTHORIZED, response.status());

    let response = app
        .client
        .post(app.url("/auth/telegram/complete"))
        .json(&serde_json::json!({"token": token, "telegram_id": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::UNAUTHORIZED, response.status());

    let body: serde_json::Value = check(&app, &token).await.json().await.unwrap();
    assert_eq!(body["item"]["status"], "pending");
}

#[tokio::test]
async fn completing_twice_conflicts_and_unknown_tokens_are_not_found() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = init_token(&app).await;

    assert_eq!(StatusCode::OK, complete(&app, &token, BOT_SECRET).await.status());
    assert_eq!(
        StatusCode::CONFLICT,
        complete(&app, &token, BOT_SECRET).await.status()
    );

    let unknown = "0123456789abcdef0123456789abcdef";
    assert_eq!(
        StatusCode::NOT_FOUND,
        complete(&app, unknown, BOT_SECRET).await.status()
    );
    assert_eq!(StatusCode::NOT_FOUND, check(&app, unknown).await.status());
}
