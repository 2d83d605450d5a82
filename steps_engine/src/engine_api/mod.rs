//! # Steps engine public API
//!
//! Each API is a thin, backend-agnostic wrapper over one or more of the [`crate::traits`] backend traits. Clients
//! construct only the APIs they need:
//!
//! * [`accounts_api`] registers individuals and resolves the account that pays for their actions.
//! * [`ledger_api`] credits and debits points, exposes history and contribution totals, and audits the ledger.
//! * [`shop_api`] acquires promo codes and catalog products, and announces completed purchases.
//! * [`family_api`] manages family membership and validates family names.
//! * [`referral_api`] records referrals and summarises their rewards.
//!
//! ```rust,ignore
//! use steps_engine::{LedgerApi, SqliteDatabase, db_types::UserRef};
//! let db = SqliteDatabase::new_with_url("sqlite://data/steps.db", 5).await?;
//! let api = LedgerApi::new(db);
//! let history = api.history(UserRef::Telegram(42), 20).await?;
//! ```
pub mod accounts_api;
pub mod errors;
pub mod family_api;
pub mod ledger_api;
pub mod referral_api;
pub mod shop_api;
