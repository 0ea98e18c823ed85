mod common;

use pcbuilds::configuration::ScraperCategory;
use pcbuilds::models::{ComponentCategory, Role};
use reqwest::StatusCode;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = r#"
<html><body>
  <div class="product-card">
    <a class="product-card__link" href="/p/ryzen-7600">
      <span class="product-card__title">AMD Ryzen 5 7600</span>
    </a>
    <span class="product-card__price">18 999 ₽</span>
    <img src="/img/7600.jpg">
  </div>
  <div class="product-card">
    <a class="product-card__link" href="/p/i5-13400f">
      <span class="product-card__title">Intel Core i5-13400F</span>
    </a>
    <span class="product-card__price">15 490 ₽</span>
  </div>
</body></html>
"#;

#[tokio::test]
async fn catalog_management_is_admin_only() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let (_, user_token) = app.create_user("Shopper", Role::User).await;
    let (_, admin_token) = app.create_user("Curator", Role::Admin).await;
    let form = serde_json::json!({
        "name": "Noctua NH-D15",
        "link": "https://shop.example/p/nh-d15",
        "price": "9990.00",
        "category": "COOLER",
    });

    let response = app
        .client
        .post(app.url("/admin/components"))
        .bearer_auth(&user_token)
        .json(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::FORBIDDEN, response.status());

    let response = app
        .client
        .post(app.url("/admin/components"))
        .bearer_auth(&admin_token)
        .json(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::CREATED, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();

    let body: serde_json::Value = app
        .client
        .get(app.url("/components/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let categories = body["list"].as_array().unwrap();
    let cooler = categories
        .iter()
        .find(|entry| entry["category"] == "COOLER")
        .unwrap();
    assert_eq!(cooler["count"], 1);
    assert!(categories.iter().any(|entry| entry["count"] == 0));

    let response = app
        .client
        .delete(app.url(&format!("/admin/components/{}", id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());

    let response = app
        .client
        .get(app.url(&format!("/components/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::NOT_FOUND, response.status());
}

#[tokio::test]
async fn component_used_in_a_build_cannot_be_deleted() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let (_, token) = app.create_user("Builder", Role::User).await;
    let (_, admin_token) = app.create_user("Curator", Role::Admin).await;
    let build_id = app.create_build(&token, "Rig").await;

    let component_id: i32 = sqlx::query_scalar(
        "SELECT component_id FROM build_components WHERE build_id = $1 LIMIT 1",
    )
    .bind(build_id)
    .fetch_one(&app.db_pool)
    .await
    .unwrap();

    let response = app
        .client
        .delete(app.url(&format!("/admin/components/{}", component_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::CONFLICT, response.status());
}

#[tokio::test]
async fn scraper_fills_the_catalog() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/cpu"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&shop)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalog/cpu"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&shop)
        .await;

    let mut configuration = common::test_configuration();
    configuration.scraper.base_url = shop.uri();
    configuration.scraper.request_delay_ms = 0;
    configuration.scraper.categories = vec![ScraperCategory {
        category: ComponentCategory::Cpu,
        path: "/catalog/cpu".to_string(),
    }];
    let app = match common::spawn_app_with_configuration(configuration).await {
        Some(app) => app,
        None => return,
    };
    let (_, admin_token) = app.create_user("Curator", Role::Admin).await;

    let response = app
        .client
        .post(app.url("/admin/scraper/start"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::ACCEPTED, response.status());

    let mut status = serde_json::Value::Null;
    for _ in 0..50 {
        status = app
            .client
            .get(app.url("/admin/scraper/status"))
            .bearer_auth(&admin_token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if status["item"]["is_running"] == false {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(status["item"]["is_running"], false);
    assert_eq!(status["item"]["processed_categories"], 1);
    assert_eq!(status["item"]["total_categories"], 1);
    assert_eq!(status["item"]["components_saved"], 2);

    let body: serde_json::Value = app
        .client
        .get(app.url("/components?category=CPU&sort=price_asc"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["meta"]["total"], 2);
    let list = body["list"].as_array().unwrap();
    assert_eq!(list[0]["name"], "Intel Core i5-13400F");
    assert_eq!(list[0]["link"], format!("{}/p/i5-13400f", shop.uri()));
    assert_eq!(list[1]["image"], format!("{}/img/7600.jpg", shop.uri()));

    let response = app
        .client
        .post(app.url("/admin/scraper/stop"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::CONFLICT, response.status());
}
