use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use futures_util::future::join_all;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use steps_engine::{
    db_types::{OperationType, Owner, Points, UserRef},
    events::{EventHandlers, EventHooks, PurchasedItem},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed,
    },
    AccountManagement,
    LedgerApi,
    ShopApi,
    ShopError,
    SqliteDatabase,
};

async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await
}

async fn tear_down(db: SqliteDatabase) {
    db.close().await;
    if let Err(e) = Sqlite::drop_database(db.url()).await {
        warn!("🛒️ Could not remove test database: {e}");
    }
}

/// One single-member family per buyer, each with `pool` points. Returns the buyers' telegram ids.
async fn buyers(db: &SqliteDatabase, count: i64, pool: i64) -> Vec<i64> {
    let mut result = Vec::new();
    for i in 0..count {
        let tg = 10_000 + i * 10;
        let username = format!("buyer{i}");
        seed::family(db, &format!("Family {i}"), pool, tg, &[(username.as_str(), 0)]).await;
        result.push(tg);
    }
    result
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_code_goes_to_exactly_one_buyer() {
    let db = setup().await;
    let group = seed::promo_group(&db, "Coffee", 10, &[("LASTONE", 1)]).await;
    let ids = buyers(&db, 2, 50).await;
    let api = ShopApi::new(db.clone(), Default::default());

    let results = join_all(ids.iter().map(|&tg| api.buy_promo_code(group.id, UserRef::Telegram(tg)))).await;
    let (ok, err): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_ok());
    assert_eq!(ok.len(), 1);
    assert_eq!(err.len(), 1);

    let purchase = ok.into_iter().next().unwrap().unwrap();
    assert_eq!(purchase.code.code, "LASTONE");
    assert_eq!(purchase.code.used_count, 1);
    assert!(!purchase.code.is_active);
    assert_eq!(err.into_iter().next().unwrap().unwrap_err(), ShopError::OutOfStock("Coffee".into()));
    assert_eq!(db.available_promo_codes(group.id).await.unwrap(), 0);
    tear_down(db).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_buyers_never_oversell() {
    const BUYERS: i64 = 8;
    const UNITS: i64 = 3;
    let db = setup().await;
    let group = seed::promo_group(&db, "Cinema", 20, &[("MULTI", 2), ("SINGLE", 1)]).await;
    let ids = buyers(&db, BUYERS, 100).await;
    let api = ShopApi::new(db.clone(), Default::default());

    let results = join_all(ids.iter().map(|&tg| api.buy_promo_code(group.id, UserRef::Telegram(tg)))).await;
    let winners = results.iter().filter_map(|r| r.as_ref().ok()).collect::<Vec<_>>();
    assert_eq!(winners.len() as i64, UNITS);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == ShopError::OutOfStock("Cinema".into())));
    // The lower id code is used up first.
    assert_eq!(winners.iter().filter(|p| p.code.code == "MULTI").count(), 2);
    assert_eq!(winners.iter().filter(|p| p.code.code == "SINGLE").count(), 1);

    // Exactly the winners paid.
    let ledger = LedgerApi::new(db.clone());
    let mut charged = 0;
    for &tg in &ids {
        let user = db.fetch_user(UserRef::Telegram(tg)).await.unwrap().unwrap();
        let family = db.fetch_family(user.family_id.unwrap()).await.unwrap().unwrap();
        if family.family.balance == Points::from(80) {
            charged += 1;
        } else {
            assert_eq!(family.family.balance, Points::from(100));
        }
        assert!(ledger.audit(Owner::Family(family.family.id)).await.unwrap().is_consistent());
    }
    assert_eq!(charged, UNITS);
    tear_down(db).await;
}

#[tokio::test]
async fn failed_payment_releases_the_code() {
    let db = setup().await;
    let group = seed::promo_group(&db, "Spa", 500, &[("SPA1", 1)]).await;
    let ids = buyers(&db, 1, 100).await;
    let api = ShopApi::new(db.clone(), Default::default());

    let err = api.buy_promo_code(group.id, UserRef::Telegram(ids[0])).await.unwrap_err();
    assert_eq!(err, ShopError::InsufficientBalance { required: Points::from(500), available: Points::from(100) });
    assert_eq!(db.available_promo_codes(group.id).await.unwrap(), 1);
    tear_down(db).await;
}

#[tokio::test]
async fn promo_codes_require_a_family() {
    let db = setup().await;
    let group = seed::promo_group(&db, "Books", 0, &[("BOOK", 5)]).await;
    seed::user(&db, 42, "loner").await;
    let api = ShopApi::new(db.clone(), Default::default());

    let err = api.buy_promo_code(group.id, UserRef::Telegram(42)).await.unwrap_err();
    assert_eq!(err, ShopError::RequiresFamily);
    assert_eq!(db.available_promo_codes(group.id).await.unwrap(), 5);
    tear_down(db).await;
}

#[tokio::test]
async fn inactive_and_missing_groups() {
    let db = setup().await;
    let group = seed::promo_group(&db, "Old", 0, &[("OLD", 1)]).await;
    seed::deactivate_promo_group(&db, group.id).await;
    let ids = buyers(&db, 1, 10).await;
    let api = ShopApi::new(db.clone(), Default::default());

    let err = api.buy_promo_code(group.id, UserRef::Telegram(ids[0])).await.unwrap_err();
    assert_eq!(err, ShopError::Inactive("Old".into()));
    let err = api.buy_promo_code(group.id + 100, UserRef::Telegram(ids[0])).await.unwrap_err();
    assert!(matches!(err, ShopError::NotFound(_)));
    assert!(api.promo_groups().await.unwrap().is_empty());
    tear_down(db).await;
}

#[tokio::test]
async fn free_codes_are_issued_without_ledger_entries() {
    let db = setup().await;
    let group = seed::promo_group(&db, "Freebie", 0, &[("FREE", 2)]).await;
    let ids = buyers(&db, 1, 0).await;
    let api = ShopApi::new(db.clone(), Default::default());

    let purchase = api.buy_promo_code(group.id, UserRef::Telegram(ids[0])).await.unwrap();
    assert!(purchase.entries.is_empty());
    assert_eq!(purchase.code.used_count, 1);
    assert!(purchase.code.is_active);
    tear_down(db).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn a_product_is_sold_once() {
    let db = setup().await;
    let product = seed::product(&db, "Water bottle", 30).await;
    let ids = buyers(&db, 4, 50).await;
    let api = ShopApi::new(db.clone(), Default::default());

    let results = join_all(ids.iter().map(|&tg| api.buy_product(product.id, UserRef::Telegram(tg)))).await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == ShopError::OutOfStock("Water bottle".into())));
    tear_down(db).await;
}

#[tokio::test]
async fn individuals_pay_for_products_themselves() {
    let db = setup().await;
    let product = seed::product(&db, "Cap", 25).await;
    let user = seed::user(&db, 77, "solo").await;
    seed::credit(&db, Owner::User(user.id), 40).await;
    let api = ShopApi::new(db.clone(), Default::default());

    let purchase = api.buy_product(product.id, UserRef::Telegram(77)).await.unwrap();
    assert_eq!(purchase.payer, Owner::User(user.id));
    assert_eq!(purchase.order.total_price, Points::from(25));
    assert_eq!(purchase.entries.len(), 1);
    assert_eq!(purchase.entries[0].operation, OperationType::Purchase);
    assert_eq!(purchase.entries[0].order_id, Some(purchase.order.id));
    assert_eq!(purchase.entries[0].balance_after, Some(Points::from(15)));
    assert!(!api.product(product.id).await.unwrap().is_active);
    tear_down(db).await;
}

#[tokio::test]
async fn unaffordable_product_stays_on_sale() {
    let db = setup().await;
    let product = seed::product(&db, "Jacket", 300).await;
    seed::user(&db, 78, "poor").await;
    let api = ShopApi::new(db.clone(), Default::default());

    let err = api.buy_product(product.id, UserRef::Telegram(78)).await.unwrap_err();
    assert_eq!(err, ShopError::InsufficientBalance { required: Points::from(300), available: Points::zero() });
    assert!(api.product(product.id).await.unwrap().is_active);
    tear_down(db).await;
}

#[tokio::test]
async fn purchases_are_announced() {
    let db = setup().await;
    let group = seed::promo_group(&db, "Pizza", 5, &[("PIZZA", 1)]).await;
    let ids = buyers(&db, 1, 5).await;

    let announced = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&announced);
    let mut hooks = EventHooks::default();
    hooks.on_purchase_completed(move |ev| {
        let counter = Arc::clone(&counter);
        Box::pin(async move {
            assert!(matches!(ev.item, PurchasedItem::PromoCode { ref code, .. } if code == "PIZZA"));
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });
    let handlers = EventHandlers::new(10, hooks);
    let api = ShopApi::new(db.clone(), handlers.producers());
    let handle = tokio::spawn(handlers.start_handlers());

    api.buy_promo_code(group.id, UserRef::Telegram(ids[0])).await.unwrap();
    drop(api);
    handle.await.unwrap();
    // start_handlers spawns the handler loop. Give it a moment to drain.
    for _ in 0..50 {
        if announced.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(announced.load(Ordering::SeqCst), 1);
    tear_down(db).await;
}
