use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use mockall::predicate::eq;
use serde_json::json;
use steps_engine::{
    db_types::{Owner, Points, PromoCode, PromoGroup, UserRef},
    traits::PromoPurchase,
    ShopApi,
    ShopError,
};

use super::{
    helpers::{get, json, post},
    mocks::MockShopManager,
};
use crate::routes::{BuyProductRoute, BuyPromoCodeRoute, PromoGroupsRoute};

fn group(id: i64, name: &str, discount: i64) -> PromoGroup {
    PromoGroup {
        id,
        name: name.into(),
        discount_percent: discount,
        price: Points::from(50),
        is_active: true,
        created_at: Utc::now(),
    }
}

fn shop_routes(shop: MockShopManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(PromoGroupsRoute::<MockShopManager>::new())
            .service(BuyPromoCodeRoute::<MockShopManager>::new())
            .service(BuyProductRoute::<MockShopManager>::new())
            .app_data(web::Data::new(ShopApi::new(shop, Default::default())));
    }
}

#[actix_web::test]
async fn list_promo_groups() {
    let mut shop = MockShopManager::new();
    shop.expect_fetch_active_promo_groups().returning(|| Ok(vec![group(2, "Cinema", 30), group(1, "Coffee", 10)]));
    let (status, body) = get("/api/promo/groups", shop_routes(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let groups = json(&body);
    assert_eq!(groups[0]["name"], "Cinema");
    assert_eq!(groups[1]["price"], 50);
}

#[actix_web::test]
async fn buy_a_promo_code() {
    let mut shop = MockShopManager::new();
    shop.expect_acquire_promo_code().with(eq(4), eq(UserRef::Telegram(42))).times(1).returning(|group_id, _| {
        Ok(PromoPurchase {
            group: group(group_id, "Coffee", 10),
            code: PromoCode {
                id: 11,
                group_id,
                code: "COFFEE-1".into(),
                max_uses: 1,
                used_count: 1,
                is_active: false,
                created_at: Utc::now(),
            },
            buyer_id: 3,
            payer: Owner::Family(8),
            entries: vec![],
        })
    });
    let (status, body) = post("/api/promo/4/purchase", json!({"telegram_id": 42}), shop_routes(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let purchase = json(&body);
    assert_eq!(purchase["code"]["code"], "COFFEE-1");
    assert_eq!(purchase["buyer_id"], 3);
}

async fn failed_purchase(error: ShopError) -> (StatusCode, String) {
    let mut shop = MockShopManager::new();
    shop.expect_acquire_promo_code().returning(move |_, _| Err(error.clone()));
    let (status, body) = post("/api/promo/1/purchase", json!({"telegram_id": 1}), shop_routes(shop)).await;
    (status, json(&body)["error"].as_str().unwrap_or_default().to_string())
}

#[actix_web::test]
async fn purchase_failures_have_short_messages() {
    let (status, message) = failed_purchase(ShopError::OutOfStock("Coffee".into())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(message, "Out of stock");

    let (status, message) = failed_purchase(ShopError::RequiresFamily).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(message, "A family is required");

    let error = ShopError::InsufficientBalance { required: Points::from(50), available: Points::from(20) };
    let (status, message) = failed_purchase(error).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(message, "Insufficient points");

    let (status, _) = failed_purchase(ShopError::NotFound("promo group #1".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn sold_products_are_out_of_stock() {
    let mut shop = MockShopManager::new();
    shop.expect_purchase_product()
        .with(eq(6), eq(UserRef::Telegram(77)))
        .returning(|_, _| Err(ShopError::OutOfStock("Water bottle".into())));
    let (status, body) = post("/api/catalog/6/purchase", json!({"telegram_id": 77}), shop_routes(shop)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body), json!({"error": "Out of stock"}));
}

#[actix_web::test]
async fn malformed_requests_are_rejected() {
    let shop = MockShopManager::new();
    let (status, _) = post("/api/promo/1/purchase", json!({"buyer": "me"}), shop_routes(shop)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
