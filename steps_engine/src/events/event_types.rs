use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Owner, Points, WalkForm};

/// Published after a finished walk has been written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkFinishedEvent {
    /// The Telegram id of the walker.
    pub subject: i64,
    pub form: WalkForm,
    pub steps: i64,
    pub points: Points,
    pub multiplier: i64,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PurchasedItem {
    PromoCode { group: String, code: String },
    Product { title: String, order_id: i64 },
}

/// Published after a shop purchase has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseCompletedEvent {
    pub buyer_id: i64,
    pub payer: Owner,
    pub item: PurchasedItem,
    pub price: Points,
}
