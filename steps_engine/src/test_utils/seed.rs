//! Fixtures for tests. These write directly to the store and skip the business rules, so that a test can start from
//! any state it needs. Balances are always seeded through the ledger, so audits stay consistent.
use chrono::Utc;

use crate::{
    db::sqlite::{families, ledger, users},
    db_types::{EntryMemo, FamilyAccount, NewUser, OperationType, Owner, Points, Product, PromoGroup, UserAccount, UserRef},
    traits::AccountManagement,
    SqliteDatabase,
};

pub async fn user(db: &SqliteDatabase, telegram_id: i64, username: &str) -> UserAccount {
    db.register_user(NewUser::new(telegram_id).with_username(username)).await.expect("Error registering user")
}

/// Credits `amount` to `owner` directly, without routing through a family.
pub async fn credit(db: &SqliteDatabase, owner: Owner, amount: i64) {
    let mut tx = db.pool().begin().await.expect("Error starting transaction");
    let memo = EntryMemo::new("Opening balance");
    ledger::apply_movement(owner, Points::from(amount), OperationType::PromoAccrual, &memo, &mut tx)
        .await
        .expect("Error crediting opening balance");
    tx.commit().await.expect("Error committing opening balance");
}

/// Creates a family whose members have the given usernames and personal balances, with `pool` points in the family
/// pool. Telegram ids are assigned from `first_telegram_id` upwards, so members are ordered as given.
pub async fn family(
    db: &SqliteDatabase,
    name: &str,
    pool: i64,
    first_telegram_id: i64,
    members: &[(&str, i64)],
) -> FamilyAccount {
    let mut tx = db.pool().begin().await.expect("Error starting transaction");
    let family = families::insert_family(name, &mut tx).await.expect("Error inserting family").expect("Name taken");
    tx.commit().await.expect("Error committing family");
    for (i, (username, balance)) in members.iter().enumerate() {
        member(db, family.id, first_telegram_id + i as i64, username, *balance).await;
    }
    if pool > 0 {
        credit(db, Owner::Family(family.id), pool).await;
    }
    db.fetch_family(family.id).await.expect("Error fetching family").expect("Family not found")
}

/// Registers a user straight into a family, holding `balance` points of their own.
pub async fn member(
    db: &SqliteDatabase,
    family_id: i64,
    telegram_id: i64,
    username: &str,
    balance: i64,
) -> UserAccount {
    let account = user(db, telegram_id, username).await;
    let mut tx = db.pool().begin().await.expect("Error starting transaction");
    users::set_family(account.id, Some(family_id), &mut tx).await.expect("Error joining family");
    tx.commit().await.expect("Error committing membership");
    if balance > 0 {
        credit(db, Owner::User(account.id), balance).await;
    }
    db.fetch_user(UserRef::Id(account.id)).await.expect("Error fetching user").expect("User not found")
}

/// Creates a promo group with codes of the given `(code, max_uses)`.
pub async fn promo_group(db: &SqliteDatabase, name: &str, price: i64, codes: &[(&str, i64)]) -> PromoGroup {
    let mut tx = db.pool().begin().await.expect("Error starting transaction");
    let group: PromoGroup = sqlx::query_as(
        "INSERT INTO promo_groups (name, discount_percent, price, is_active, created_at) VALUES ($1, 10, $2, 1, $3) \
         RETURNING *",
    )
    .bind(name)
    .bind(price)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .expect("Error inserting promo group");
    for (code, max_uses) in codes {
        sqlx::query("INSERT INTO promo_codes (group_id, code, max_uses, created_at) VALUES ($1, $2, $3, $4)")
            .bind(group.id)
            .bind(code)
            .bind(max_uses)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .expect("Error inserting promo code");
    }
    tx.commit().await.expect("Error committing promo group");
    group
}

pub async fn deactivate_promo_group(db: &SqliteDatabase, group_id: i64) {
    sqlx::query("UPDATE promo_groups SET is_active = 0 WHERE id = $1")
        .bind(group_id)
        .execute(db.pool())
        .await
        .expect("Error deactivating promo group");
}

pub async fn product(db: &SqliteDatabase, title: &str, price: i64) -> Product {
    let mut tx = db.pool().begin().await.expect("Error starting transaction");
    let product: Product = sqlx::query_as("INSERT INTO products (title, price) VALUES ($1, $2) RETURNING *")
        .bind(title)
        .bind(price)
        .fetch_one(&mut *tx)
        .await
        .expect("Error inserting product");
    tx.commit().await.expect("Error committing product");
    product
}
