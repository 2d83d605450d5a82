use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use mockall::predicate::eq;
use serde_json::json;
use steps_engine::{
    db_types::{LedgerEntry, OperationType, OwnerKind, Points, UserRef},
    traits::{FamilyStats, FamilySummary},
    AccountApi,
    AccountApiError,
    FamilyApi,
    FamilyError,
    LedgerApi,
};

use super::{
    helpers::{get, json, post, user_account},
    mocks::{MockAccountManager, MockFamilyManager, MockLedgerManager},
};
use crate::routes::{ContributionRoute, HistoryRoute, RegisterUserRoute, StatsRoute};

fn entry(id: i64, amount: i64) -> LedgerEntry {
    LedgerEntry {
        id,
        owner_type: OwnerKind::Family,
        user_id: None,
        family_id: Some(3),
        operation: OperationType::StepsAccrual,
        amount: Points::from(amount),
        balance_after: Some(Points::from(amount * id)),
        order_id: None,
        title: Some("Walk reward".into()),
        description: None,
        created_at: Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, id as u32).unwrap(),
    }
}

#[actix_web::test]
async fn register_strips_the_at_sign() {
    let mut accounts = MockAccountManager::new();
    accounts
        .expect_register_user()
        .withf(|u| u.telegram_id == 42 && u.username.as_deref() == Some("walker"))
        .times(1)
        .returning(|u| Ok(user_account(7, u.telegram_id, u.username.as_deref())));
    let (status, body) = post("/api/users", json!({"telegram_id": 42, "username": " @walker "}), move |cfg| {
        cfg.service(RegisterUserRoute::<MockAccountManager>::new())
            .app_data(web::Data::new(AccountApi::new(accounts)));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let account = json(&body);
    assert_eq!(account["id"], 7);
    assert_eq!(account["username"], "walker");
    assert_eq!(account["balance"], 0);
}

#[actix_web::test]
async fn registration_failures_are_server_errors() {
    let mut accounts = MockAccountManager::new();
    accounts.expect_register_user().returning(|_| Err(AccountApiError::DatabaseError("disk full".into())));
    let (status, body) = post("/api/users", json!({"telegram_id": 1}), move |cfg| {
        cfg.service(RegisterUserRoute::<MockAccountManager>::new())
            .app_data(web::Data::new(AccountApi::new(accounts)));
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["error"].as_str().unwrap().contains("disk full"));
}

fn ledger_routes(ledger: MockLedgerManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(HistoryRoute::<MockLedgerManager>::new())
            .service(ContributionRoute::<MockLedgerManager>::new())
            .app_data(web::Data::new(LedgerApi::new(ledger)));
    }
}

#[actix_web::test]
async fn history_uses_the_default_limit() {
    let mut ledger = MockLedgerManager::new();
    ledger
        .expect_history()
        .with(eq(UserRef::Telegram(42)), eq(20))
        .times(1)
        .returning(|_, _| Ok(vec![entry(2, 30), entry(1, 15)]));
    let (status, body) = get("/api/accounts/42/history", ledger_routes(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = json(&body);
    assert_eq!(entries.as_array().unwrap().len(), 2);
    assert_eq!(entries[0]["id"], 2);
    assert_eq!(entries[0]["operation"], "steps_accrual");
}

#[actix_web::test]
async fn history_limit_can_be_chosen() {
    let mut ledger = MockLedgerManager::new();
    ledger.expect_history().with(eq(UserRef::Telegram(42)), eq(3)).times(1).returning(|_, _| Ok(vec![]));
    let (status, body) = get("/api/accounts/42/history?limit=3", ledger_routes(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn contribution() {
    let mut ledger = MockLedgerManager::new();
    ledger
        .expect_contribution_total()
        .with(eq(UserRef::Telegram(9)))
        .returning(|_| Ok(Points::from(125)));
    let (status, body) = get("/api/accounts/9/contribution", ledger_routes(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"telegram_id": 9, "total": 125}));
}

#[actix_web::test]
async fn stats_for_a_family_member() {
    let mut families = MockFamilyManager::new();
    families.expect_family_stats().with(eq(UserRef::Telegram(5))).returning(|_| {
        Ok(FamilyStats {
            user_id: 1,
            steps: 1200,
            balance: Points::from(4),
            family: Some(FamilySummary {
                id: 3,
                name: "Walkers".into(),
                member_count: 2,
                pool_balance: Points::from(90),
                total_steps: 5000,
                total_balance: Points::from(100),
            }),
        })
    });
    let (status, body) = get("/api/accounts/5/stats", move |cfg| {
        cfg.service(StatsRoute::<MockFamilyManager>::new()).app_data(web::Data::new(FamilyApi::new(families)));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let stats = json(&body);
    assert_eq!(stats["family"]["name"], "Walkers");
    assert_eq!(stats["family"]["total_balance"], 100);
}

#[actix_web::test]
async fn stats_for_an_unknown_user() {
    let mut families = MockFamilyManager::new();
    families.expect_family_stats().returning(|u| Err(FamilyError::UserNotFound(u.to_string())));
    let (status, _) = get("/api/accounts/404/stats", move |cfg| {
        cfg.service(StatsRoute::<MockFamilyManager>::new()).app_data(web::Data::new(FamilyApi::new(families)));
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
