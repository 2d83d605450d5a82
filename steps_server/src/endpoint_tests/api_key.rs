use actix_web::{
    body::MessageBody,
    http::{Method, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use serde_json::json;
use steps_engine::ShopApi;

use super::{
    helpers::{api_request, TEST_API_KEY},
    mocks::MockShopManager,
};
use crate::routes::{health, PromoGroupsRoute};

fn configure(cfg: &mut ServiceConfig) {
    let mut shop = MockShopManager::new();
    shop.expect_fetch_active_promo_groups().returning(|| Ok(vec![]));
    cfg.service(PromoGroupsRoute::<MockShopManager>::new())
        .app_data(web::Data::new(ShopApi::new(shop, Default::default())));
}

#[actix_web::test]
async fn health_needs_no_key() {
    let app = test::init_service(App::new().service(health)).await;
    let req = TestRequest::get().uri("/health").to_request();
    let (_req, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = res.into_body().try_into_bytes().unwrap();
    assert!(status.is_success());
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn missing_key_is_refused() {
    let (status, body) = api_request(Method::GET, "/api/promo/groups", None, None, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "A valid API key is required");
}

#[actix_web::test]
async fn wrong_key_is_refused() {
    let (status, _) = api_request(Method::GET, "/api/promo/groups", None, Some("guess"), configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn correct_key_is_accepted() {
    let (status, body) = api_request(Method::GET, "/api/promo/groups", None, Some(TEST_API_KEY), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
    // The key guards writes too
    let (status, _) =
        api_request(Method::POST, "/api/promo/1/purchase", Some(json!({"telegram_id": 1})), None, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
