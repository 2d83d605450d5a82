//! Individual accounts.
//!
//! Functions prefixed with `lock_` issue a no-op `UPDATE ... RETURNING` instead of a `SELECT`. SQLite has no row
//! locks, so taking the database write lock with the first statement of a transaction is how a read-modify-write is
//! made exclusive. A transaction that only reads first and writes later could fail with a stale snapshot.
use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewUser, Points, UserAccount, UserRef},
};

fn key_column(user: UserRef) -> (&'static str, i64) {
    match user {
        UserRef::Id(id) => ("id", id),
        UserRef::Telegram(tg) => ("telegram_id", tg),
    }
}

/// Inserts a new user, or returns the existing one for the Telegram id.
pub async fn upsert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<UserAccount, SqliteDatabaseError> {
    let now = Utc::now();
    let account: UserAccount = sqlx::query_as(
        r#"
        INSERT INTO users (telegram_id, username, created_at, updated_at) VALUES ($1, $2, $3, $3)
        ON CONFLICT (telegram_id) DO UPDATE SET username = COALESCE(excluded.username, users.username)
        RETURNING *
        "#,
    )
    .bind(user.telegram_id)
    .bind(user.username)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🧑️ User #{} registered for telegram id {}", account.id, account.telegram_id);
    Ok(account)
}

pub async fn fetch_user(user: UserRef, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, SqliteDatabaseError> {
    let (column, key) = key_column(user);
    let sql = format!("SELECT * FROM users WHERE {column} = $1");
    let account = sqlx::query_as(&sql).bind(key).fetch_optional(conn).await?;
    Ok(account)
}

/// Takes the write lock and returns the user row, or `None` if the user does not exist.
pub async fn lock_user(user: UserRef, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, SqliteDatabaseError> {
    let (column, key) = key_column(user);
    let sql = format!("UPDATE users SET updated_at = updated_at WHERE {column} = $1 RETURNING *");
    let account = sqlx::query_as(&sql).bind(key).fetch_optional(conn).await?;
    trace!("🧑️ Locked {user}");
    Ok(account)
}

pub async fn fetch_user_by_username(
    username: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, SqliteDatabaseError> {
    let username = username.trim().trim_start_matches('@');
    let account = sqlx::query_as("SELECT * FROM users WHERE username = $1 COLLATE NOCASE")
        .bind(username)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

/// Family members, ordered by id. This order is relied upon by settlement and ownership.
pub async fn members_of(family_id: i64, conn: &mut SqliteConnection) -> Result<Vec<UserAccount>, SqliteDatabaseError> {
    let members = sqlx::query_as("SELECT * FROM users WHERE family_id = $1 ORDER BY id ASC")
        .bind(family_id)
        .fetch_all(conn)
        .await?;
    Ok(members)
}

/// Detaches every member from the family. Personal balances are left where they are.
pub async fn release_members(family_id: i64, conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE users SET family_id = NULL, updated_at = $1 WHERE family_id = $2")
        .bind(Utc::now())
        .bind(family_id)
        .execute(conn)
        .await?;
    trace!("🧑️ Released {} members from family #{family_id}", result.rows_affected());
    Ok(result.rows_affected())
}

/// Adds `delta` (which may be negative) to the user's balance and returns the new balance. The schema rejects
/// negative balances, so callers must check affordability first.
pub async fn adjust_balance(
    user_id: i64,
    delta: Points,
    conn: &mut SqliteConnection,
) -> Result<Points, SqliteDatabaseError> {
    let balance: Points =
        sqlx::query_scalar("UPDATE users SET balance = balance + $1, updated_at = $2 WHERE id = $3 RETURNING balance")
            .bind(delta)
            .bind(Utc::now())
            .bind(user_id)
            .fetch_optional(conn)
            .await?
            .ok_or(SqliteDatabaseError::AccountNotFound(UserRef::Id(user_id)))?;
    trace!("🧑️ User #{user_id} balance adjusted by {delta} to {balance}");
    Ok(balance)
}

pub async fn add_steps(user_id: i64, steps: i64, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("UPDATE users SET step_count = step_count + $1, updated_at = $2 WHERE id = $3")
        .bind(steps)
        .bind(Utc::now())
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn set_family(
    user_id: i64,
    family_id: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query("UPDATE users SET family_id = $1, updated_at = $2 WHERE id = $3")
        .bind(family_id)
        .bind(Utc::now())
        .bind(user_id)
        .execute(conn)
        .await?;
    debug!("🧑️ User #{user_id} family set to {family_id:?}");
    Ok(())
}
