mod common;

use pcbuilds::models::Role;
use reqwest::StatusCode;

#[tokio::test]
async fn second_rating_conflicts_and_update_moves_the_average() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let (_, author_token) = app.create_user("Author", Role::User).await;
    let (_, fan_token) = app.create_user("Fan", Role::User).await;
    let build_id = app.create_build(&author_token, "Quiet rig").await;
    let url = app.url(&format!("/builds/{}/rating", build_id));

    let response = app
        .client
        .post(&url)
        .bearer_auth(&fan_token)
        .json(&serde_json::json!({"rating": 4}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::CREATED, response.status());

    let response = app
        .client
        .post(&url)
        .bearer_auth(&fan_token)
        .json(&serde_json::json!({"rating": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::CONFLICT, response.status());

    let response = app
        .client
        .put(&url)
        .bearer_auth(&fan_token)
        .json(&serde_json::json!({"rating": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());

    let body: serde_json::Value = app
        .client
        .get(&url)
        .bearer_auth(&fan_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["item"]["count"], 1);
    assert_eq!(body["item"]["average"].as_f64(), Some(2.0));
    assert_eq!(body["item"]["my_rating"], 2);
}

#[tokio::test]
async fn out_of_range_rating_is_a_form_error() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let (_, token) = app.create_user("Author", Role::User).await;
    let build_id = app.create_build(&token, "Rig").await;

    let response = app
        .client
        .post(app.url(&format!("/builds/{}/rating", build_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({"rating": 6}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
}

#[tokio::test]
async fn comments_nest_one_level_deep() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let (_, author_token) = app.create_user("Author", Role::User).await;
    let (_, reader_token) = app.create_user("Reader", Role::User).await;
    let build_id = app.create_build(&author_token, "Streaming rig").await;
    let url = app.url(&format!("/builds/{}/comments", build_id));

    let response = app
        .client
        .post(&url)
        .bearer_auth(&reader_token)
        .json(&serde_json::json!({"text": "Nice airflow"}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::CREATED, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    let root_id = body["id"].as_i64().unwrap();

    let response = app
        .client
        .post(&url)
        .bearer_auth(&author_token)
        .json(&serde_json::json!({"text": "Thanks!", "parent_id": root_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::CREATED, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    let reply_id = body["id"].as_i64().unwrap();

    let response = app
        .client
        .post(&url)
        .bearer_auth(&reader_token)
        .json(&serde_json::json!({"text": "Deeper", "parent_id": reply_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    let body: serde_json::Value = app
        .client
        .get(&url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tree = body["list"].as_array().unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["id"].as_i64(), Some(root_id));
    assert_eq!(tree[0]["replies"].as_array().unwrap().len(), 1);
    assert_eq!(tree[0]["replies"][0]["id"].as_i64(), Some(reply_id));
}

#[tokio::test]
async fn comments_are_edited_only_by_their_author() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let (_, author_token) = app.create_user("Author", Role::User).await;
    let (_, other_token) = app.create_user("Other", Role::User).await;
    let build_id = app.create_build(&author_token, "Rig").await;

    let body: serde_json::Value = app
        .client
        .post(app.url(&format!("/builds/{}/comments", build_id)))
        .bearer_auth(&author_token)
        .json(&serde_json::json!({"text": "First"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let comment_url = app.url(&format!(
        "/builds/{}/comments/{}",
        build_id,
        body["id"].as_i64().unwrap()
    ));

    let response = app
        .client
        .put(&comment_url)
        .bearer_auth(&other_token)
        .json(&serde_json::json!({"text": "Hijacked"}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::FORBIDDEN, response.status());

    let response = app
        .client
        .put(&comment_url)
        .bearer_auth(&author_token)
        .json(&serde_json::json!({"text": "Edited"}))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["item"]["text"], "Edited");
}
