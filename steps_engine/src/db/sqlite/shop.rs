//! Limited inventory.
//!
//! A promo group is a pool of codes; a product is a pool of exactly one unit. Claiming a unit is a single conditional
//! `UPDATE`, so two transactions can never hand out the same unit even if they were somehow interleaved.
use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Order, OrderStatus, Points, Product, PromoCode, PromoGroup},
};

/// Active promo groups, largest discount first.
pub async fn fetch_active_promo_groups(conn: &mut SqliteConnection) -> Result<Vec<PromoGroup>, SqliteDatabaseError> {
    let groups = sqlx::query_as("SELECT * FROM promo_groups WHERE is_active = 1 ORDER BY discount_percent DESC, name ASC")
        .fetch_all(conn)
        .await?;
    Ok(groups)
}

pub async fn fetch_promo_group(
    group_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<PromoGroup>, SqliteDatabaseError> {
    let group = sqlx::query_as("SELECT * FROM promo_groups WHERE id = $1").bind(group_id).fetch_optional(conn).await?;
    Ok(group)
}

/// Takes the write lock and returns the promo group row.
pub async fn lock_promo_group(
    group_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<PromoGroup>, SqliteDatabaseError> {
    let group = sqlx::query_as("UPDATE promo_groups SET is_active = is_active WHERE id = $1 RETURNING *")
        .bind(group_id)
        .fetch_optional(conn)
        .await?;
    trace!("🛒️ Locked promo group #{group_id}");
    Ok(group)
}

/// Consumes one use of the lowest-id available code in the group. A code is deactivated on its final use. Returns
/// `None` if the group has no codes left.
pub async fn claim_promo_code(
    group_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<PromoCode>, SqliteDatabaseError> {
    let code: Option<PromoCode> = sqlx::query_as(
        r#"
        UPDATE promo_codes
        SET used_count = used_count + 1, is_active = (used_count + 1 < max_uses)
        WHERE id = (
            SELECT id FROM promo_codes
            WHERE group_id = $1 AND is_active = 1 AND used_count < max_uses
            ORDER BY id ASC LIMIT 1
        )
        RETURNING *
        "#,
    )
    .bind(group_id)
    .fetch_optional(conn)
    .await?;
    match &code {
        Some(c) => debug!("🛒️ Claimed code #{} from group #{group_id} ({}/{} uses)", c.id, c.used_count, c.max_uses),
        None => debug!("🛒️ Promo group #{group_id} has no codes left"),
    }
    Ok(code)
}

pub async fn available_codes(group_id: i64, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let count = sqlx::query_scalar(
        "SELECT COALESCE(SUM(max_uses - used_count), 0) FROM promo_codes WHERE group_id = $1 AND is_active = 1",
    )
    .bind(group_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, SqliteDatabaseError> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Takes the write lock and claims the product's single unit by deactivating it. Returns `None` if the product is
/// missing or already taken.
pub async fn claim_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, SqliteDatabaseError> {
    let product: Option<Product> =
        sqlx::query_as("UPDATE products SET is_active = 0 WHERE id = $1 AND is_active = 1 RETURNING *")
            .bind(product_id)
            .fetch_optional(conn)
            .await?;
    if product.is_some() {
        debug!("🛒️ Claimed product #{product_id}");
    }
    Ok(product)
}

/// Creates a paid order for a single product.
pub async fn insert_order(
    user_id: i64,
    product_id: i64,
    total_price: Points,
    conn: &mut SqliteConnection,
) -> Result<Order, SqliteDatabaseError> {
    let order: Order = sqlx::query_as(
        "INSERT INTO orders (user_id, status, total_price, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(user_id)
    .bind(OrderStatus::Paid)
    .bind(total_price)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    sqlx::query("INSERT INTO order_items (order_id, product_id, qty) VALUES ($1, $2, 1)")
        .bind(order.id)
        .bind(product_id)
        .execute(conn)
        .await?;
    debug!("🛒️ Order #{} created for user #{user_id}: product #{product_id} at {total_price}", order.id);
    Ok(order)
}
