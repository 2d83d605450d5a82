//! Points movements, history and auditing.
use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{EntryMemo, LedgerEntry, OperationType, Owner, Points, UserRef},
    engine_api::errors::LedgerError,
    traits::{AccountManagement, LedgerManagement},
};

/// The number of entries returned by [`LedgerApi::recent_history`].
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// The result of replaying an owner's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAudit {
    pub owner: Owner,
    /// The number of entries that moved the owner's balance.
    pub effective_entries: usize,
    /// The sum of every effective entry's amount.
    pub replayed_balance: Points,
    /// The balance currently stored on the owner's row.
    pub stored_balance: Points,
    /// Ids of entries whose `balance_after` does not match the running total at that point.
    pub broken_entries: Vec<i64>,
}

impl LedgerAudit {
    pub fn is_consistent(&self) -> bool {
        self.replayed_balance == self.stored_balance && self.broken_entries.is_empty()
    }
}

/// Replays entries in order, returning the final balance and the ids of entries that disagree with the running total.
pub fn replay(entries: &[LedgerEntry]) -> (Points, usize, Vec<i64>) {
    let mut running = Points::zero();
    let mut count = 0;
    let mut broken = Vec::new();
    for entry in entries.iter().filter(|e| e.is_effective()) {
        running += entry.amount;
        count += 1;
        if entry.balance_after != Some(running) {
            broken.push(entry.id);
        }
    }
    (running, count, broken)
}

pub struct LedgerApi<B> {
    db: B,
}

impl<B: Debug> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?})", self.db)
    }
}

impl<B> LedgerApi<B>
where B: LedgerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub async fn accrue(
        &self,
        user: UserRef,
        amount: Points,
        operation: OperationType,
        memo: EntryMemo,
    ) -> Result<LedgerEntry, LedgerError> {
        let entry = self.db.accrue(user, amount, operation, memo).await?;
        debug!("📒️ {amount} accrued for {user}. Entry #{}", entry.id);
        Ok(entry)
    }

    pub async fn debit_family(&self, family_id: i64, amount: Points, memo: EntryMemo) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.db.debit_family_proportional(family_id, amount, memo).await
    }

    pub async fn debit_user(&self, user: UserRef, amount: Points, memo: EntryMemo) -> Result<LedgerEntry, LedgerError> {
        self.db.debit_user(user, amount, memo).await
    }

    pub async fn contribution_total(&self, user: UserRef) -> Result<Points, LedgerError> {
        self.db.contribution_total(user).await
    }

    pub async fn history(&self, user: UserRef, limit: u32) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.db.history(user, limit).await
    }

    pub async fn recent_history(&self, user: UserRef) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.db.history(user, DEFAULT_HISTORY_LIMIT).await
    }

    pub async fn entries_for_owner(&self, owner: Owner) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.db.entries_for_owner(owner).await
    }
}

impl<B> LedgerApi<B>
where B: LedgerManagement + AccountManagement
{
    /// Replays every entry recorded against `owner` and compares the result with the stored balance.
    pub async fn audit(&self, owner: Owner) -> Result<LedgerAudit, LedgerError> {
        let stored_balance = match owner {
            Owner::User(id) => {
                self.db
                    .fetch_user(UserRef::Id(id))
                    .await
                    .map_err(|e| LedgerError::DatabaseError(e.to_string()))?
                    .ok_or_else(|| LedgerError::NotFound(owner.to_string()))?
                    .balance
            },
            Owner::Family(id) => {
                self.db
                    .fetch_family(id)
                    .await
                    .map_err(|e| LedgerError::DatabaseError(e.to_string()))?
                    .ok_or_else(|| LedgerError::NotFound(owner.to_string()))?
                    .family
                    .balance
            },
        };
        let entries = self.db.entries_for_owner(owner).await?;
        let (replayed_balance, effective_entries, broken_entries) = replay(&entries);
        let audit = LedgerAudit { owner, effective_entries, replayed_balance, stored_balance, broken_entries };
        if !audit.is_consistent() {
            error!(
                "📒️ Ledger audit failed for {owner}. Stored balance {stored_balance}, replayed {replayed_balance}. Broken \
                 entries: {:?}",
                audit.broken_entries
            );
        }
        Ok(audit)
    }
}
