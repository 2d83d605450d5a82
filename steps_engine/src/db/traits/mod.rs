//! #  Database management and control.
//!
//! This module provides the interfaces that define the contracts of the steps engine database *backends*.
//!
//! ## Accounts
//! Points are held by two kinds of owner: individuals and families. An individual belongs to at most one family.
//! Family members earn into, and spend from, the family pool; the family's members' personal balances are used as a
//! fallback when the pool runs short (see [`crate::settlement`]).
//!
//! ## Traits
//! * [`AccountManagement`] registers individuals and resolves who pays for an individual's actions.
//! * [`LedgerManagement`] is the sole mutation path for balances and owns the append-only ledger.
//! * [`ShopManagement`] implements the atomic acquire-and-charge protocol for promo codes and catalog products.
//! * [`FamilyManagement`] manages family membership and invitations.
//! * [`ReferralManagement`] manages referrals.
//! * [`ReferenceData`] exposes walk coefficients and the settings store.
mod account_management;
mod family_management;
mod ledger_management;
mod reference_data;
mod referral_management;
mod shop_management;

mod data_objects;

pub use account_management::AccountManagement;
pub use data_objects::{FamilyStats, FamilySummary, ProductPurchase, PromoPurchase, ReferralSummary};
pub use family_management::{FamilyManagement, MAX_FAMILY_MEMBERS, MAX_FAMILY_NAME_LENGTH};
pub use ledger_management::LedgerManagement;
pub use reference_data::ReferenceData;
pub use referral_management::{ReferralManagement, DEFAULT_REFERRAL_REWARD_PERCENT, REFERRAL_REWARD_PERCENT_KEY};
pub use shop_management::ShopManagement;

/// Everything the walk tracker needs from a backend.
pub trait WalkStore: LedgerManagement + ReferenceData {}

impl<T> WalkStore for T where T: LedgerManagement + ReferenceData {}
