use crate::{
    db_types::{EntryMemo, LedgerEntry, OperationType, Owner, Points, UserRef},
    engine_api::errors::LedgerError,
};

/// The `LedgerManagement` trait is the only mutation path for balances.
///
/// Every method that moves points must, in a single database transaction:
/// 1. take exclusive ownership of the affected balance rows before reading them,
/// 2. update the cached balances, and
/// 3. append a [`LedgerEntry`] for every movement.
///
/// If any step fails, the whole transaction must be rolled back so that no balance is left half-updated.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Credits `amount` to the account that receives the given individual's earnings.
    ///
    /// * If the individual is a family member, the family pool is credited, and an attribution entry (with no
    ///   `balance_after`) is recorded against the individual so that their contribution can be tracked.
    /// * Otherwise the individual is credited directly.
    ///
    /// For [`OperationType::StepsAccrual`], if the individual was referred by someone, the inviter receives their
    /// referral reward in the same transaction.
    ///
    /// Returns the entry that moved a balance.
    async fn accrue(
        &self,
        user: UserRef,
        amount: Points,
        operation: OperationType,
        memo: EntryMemo,
    ) -> Result<LedgerEntry, LedgerError>;

    /// Debits `amount` from a family using proportional settlement. See [`crate::settlement`].
    async fn debit_family_proportional(
        &self,
        family_id: i64,
        amount: Points,
        memo: EntryMemo,
    ) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Debits `amount` from an individual's personal balance. Fails with [`LedgerError::InsufficientBalance`] without
    /// writing anything if the balance is too low.
    async fn debit_user(&self, user: UserRef, amount: Points, memo: EntryMemo) -> Result<LedgerEntry, LedgerError>;

    /// Sum of all credit entries (activity accruals, promo accruals and transfers) recorded against the individual,
    /// regardless of which balance ultimately received the points.
    async fn contribution_total(&self, user: UserRef) -> Result<Points, LedgerError>;

    /// The most recent `limit` entries for the individual, merged with their family's entries if they are a member.
    /// Ordered newest first, with the entry id breaking timestamp ties.
    async fn history(&self, user: UserRef, limit: u32) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Every entry recorded against `owner`, oldest first.
    async fn entries_for_owner(&self, owner: Owner) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Records a finished walk: adds `steps` to the walker's (and their family's) lifetime step count, and accrues
    /// `points` if it is positive. Returns the accrual entry, if one was written.
    async fn record_walk(
        &self,
        user: UserRef,
        steps: i64,
        points: Points,
        memo: EntryMemo,
    ) -> Result<Option<LedgerEntry>, LedgerError>;
}
