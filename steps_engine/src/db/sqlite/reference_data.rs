use log::trace;
use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::WalkForm};

/// The configured coefficient for the walk form, if any.
pub async fn walk_form_coefficient(
    form: WalkForm,
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, SqliteDatabaseError> {
    let coefficient = sqlx::query_scalar("SELECT coefficient FROM walk_form_coefficients WHERE walk_form = $1")
        .bind(form)
        .fetch_optional(conn)
        .await?;
    Ok(coefficient)
}

/// The coefficient of the first band (lowest id) whose inclusive range contains `temp_c`.
pub async fn temperature_coefficient(
    form: WalkForm,
    temp_c: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, SqliteDatabaseError> {
    let coefficient = sqlx::query_scalar(
        r#"
        SELECT coefficient FROM temperature_coefficients
        WHERE walk_form = $1 AND min_temp_c <= $2 AND max_temp_c >= $2
        ORDER BY id ASC LIMIT 1
        "#,
    )
    .bind(form)
    .bind(temp_c)
    .fetch_optional(conn)
    .await?;
    trace!("🪛️ Temperature coefficient for {form} at {temp_c}°C: {coefficient:?}");
    Ok(coefficient)
}

pub async fn upsert_walk_form_coefficient(
    form: WalkForm,
    coefficient: i64,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        r#"INSERT INTO walk_form_coefficients (walk_form, coefficient) VALUES ($1, $2)
        ON CONFLICT (walk_form) DO UPDATE SET coefficient = excluded.coefficient"#,
    )
    .bind(form)
    .bind(coefficient)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_temperature_band(
    form: WalkForm,
    min_temp_c: i64,
    max_temp_c: i64,
    coefficient: i64,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        "INSERT INTO temperature_coefficients (walk_form, min_temp_c, max_temp_c, coefficient) VALUES ($1, $2, $3, $4)",
    )
    .bind(form)
    .bind(min_temp_c)
    .bind(max_temp_c)
    .bind(coefficient)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_setting(key: &str, conn: &mut SqliteConnection) -> Result<Option<String>, SqliteDatabaseError> {
    let value = sqlx::query_scalar("SELECT value FROM bot_settings WHERE key = $1").bind(key).fetch_optional(conn).await?;
    Ok(value)
}

pub async fn store_setting(key: &str, value: &str, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("INSERT INTO bot_settings (key, value) VALUES ($1, $2) ON CONFLICT (key) DO UPDATE SET value = excluded.value")
        .bind(key)
        .bind(value)
        .execute(conn)
        .await?;
    Ok(())
}
