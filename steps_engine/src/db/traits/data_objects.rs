use serde::{Deserialize, Serialize};

use crate::db_types::{LedgerEntry, Order, Owner, Points, Product, PromoCode, PromoGroup};

/// The result of a successful promo code acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoPurchase {
    pub group: PromoGroup,
    /// The issued code, reflecting its state after this use was counted.
    pub code: PromoCode,
    pub buyer_id: i64,
    pub payer: Owner,
    pub entries: Vec<LedgerEntry>,
}

/// The result of a successful catalog purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPurchase {
    pub product: Product,
    pub order: Order,
    pub payer: Owner,
    pub entries: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySummary {
    pub id: i64,
    pub name: String,
    pub member_count: usize,
    pub pool_balance: Points,
    /// Sum of every member's lifetime step count.
    pub total_steps: i64,
    /// Pool balance plus every member's personal balance.
    pub total_balance: Points,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyStats {
    pub user_id: i64,
    pub steps: i64,
    pub balance: Points,
    pub family: Option<FamilySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralSummary {
    pub inviter_id: i64,
    pub referred_count: i64,
    pub total_reward: Points,
}
