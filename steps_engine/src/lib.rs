//! Steps Engine
//!
//! The steps engine is the core of the steps rewards bot. Walkers earn points for the steps they take, and spend them on
//! promo codes and catalog products. Points belong either to an individual or to the family the individual has
//! joined. This library contains the core logic and is independent of the chat platform that drives it.
//!
//! The library is divided into these main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly; use the public APIs instead. The data types stored in the database are defined in
//!    [`mod@db_types`] and are public.
//! 2. Settlement ([`mod@settlement`]). Pure arithmetic that apportions a family debit across the family pool and its
//!    members.
//! 3. The engine's public API ([`mod@engine_api`]). Accounts, the ledger, the shop, families and referrals. Backends
//!    implement the traits in [`mod@traits`] to act as a store for the engine.
//! 4. Walk tracking ([`mod@walk`]). The per-walker session state machine that turns live location updates into steps
//!    and, once the walk is finished, into points.
//!
//! The engine also emits events when walks finish and purchases complete. A simple actor framework ([`mod@events`])
//! lets you hook into these and perform custom actions, such as notifying a family chat.
mod db;

pub mod db_types;
pub mod engine_api;
pub mod events;
pub mod settlement;
pub mod walk;

pub use db::traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use engine_api::{
    accounts_api::AccountApi,
    errors::{AccountApiError, FamilyError, LedgerError, ReferralError, ShopError, WalkError},
    family_api::FamilyApi,
    ledger_api::{LedgerApi, LedgerAudit},
    referral_api::ReferralApi,
    shop_api::ShopApi,
};
pub use traits::{
    AccountManagement,
    FamilyManagement,
    LedgerManagement,
    ReferenceData,
    ReferralManagement,
    ShopManagement,
    WalkStore,
};
pub use walk::{WalkConfig, WalkTracker};
