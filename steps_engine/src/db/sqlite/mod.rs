pub mod db;
mod errors;

pub mod families;
pub mod ledger;
pub mod reference_data;
pub mod referrals;
pub mod shop;
pub mod users;

use std::{env, str::FromStr, time::Duration};

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const SQLITE_DB_URL: &str = "sqlite://data/steps_store.db";
/// How long a transaction waits for another writer to release the database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(15);

pub fn db_url() -> String {
    let result = env::var("STEPS_DATABASE_URL").unwrap_or_else(|_| {
        info!("STEPS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// Creates a connection pool. Connections run in WAL mode with foreign keys enforced, and wait on the busy timeout
/// rather than failing immediately when another connection holds the write lock.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
