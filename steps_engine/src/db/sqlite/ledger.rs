//! The append-only ledger.
//!
//! Entries are only ever inserted. [`apply_movement`] is the single place where a balance changes, and it always
//! writes the matching entry in the same transaction.
use chrono::Utc;
use log::{debug, error, trace};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::{families, referrals, users, SqliteDatabaseError},
    db_types::{EntryMemo, FamilyAccount, LedgerEntry, OperationType, Owner, OwnerKind, Points, UserAccount},
    settlement::settle,
};

#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub owner: Owner,
    pub operation: OperationType,
    pub amount: Points,
    pub balance_after: Option<Points>,
    pub memo: EntryMemo,
}

pub async fn insert_entry(entry: NewLedgerEntry, conn: &mut SqliteConnection) -> Result<LedgerEntry, SqliteDatabaseError> {
    let record: LedgerEntry = sqlx::query_as(
        r#"
        INSERT INTO ledger_entries
            (owner_type, user_id, family_id, operation, amount, balance_after, order_id, title, description, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(entry.owner.kind())
    .bind(entry.owner.user_id())
    .bind(entry.owner.family_id())
    .bind(entry.operation)
    .bind(entry.amount)
    .bind(entry.balance_after)
    .bind(entry.memo.order_id)
    .bind(entry.memo.title)
    .bind(entry.memo.description)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    trace!("📒️ Ledger entry #{} [{}] {} for {}", record.id, record.operation, record.amount, entry.owner);
    Ok(record)
}

/// Moves `delta` points into (positive) or out of (negative) the owner's balance and journals it. The caller must hold
/// the write lock and must have checked that a debit is affordable.
pub async fn apply_movement(
    owner: Owner,
    delta: Points,
    operation: OperationType,
    memo: &EntryMemo,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, SqliteDatabaseError> {
    let balance_after = match owner {
        Owner::User(id) => users::adjust_balance(id, delta, &mut *conn).await?,
        Owner::Family(id) => families::adjust_balance(id, delta, &mut *conn).await?,
    };
    let entry = NewLedgerEntry { owner, operation, amount: delta, balance_after: Some(balance_after), memo: memo.clone() };
    insert_entry(entry, conn).await
}

/// Records `amount` against the user without touching their balance.
pub async fn attribute(
    user_id: i64,
    amount: Points,
    operation: OperationType,
    memo: &EntryMemo,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, SqliteDatabaseError> {
    let entry = NewLedgerEntry { owner: Owner::User(user_id), operation, amount, balance_after: None, memo: memo.clone() };
    insert_entry(entry, conn).await
}

/// Moves the user's whole personal balance into the family pool. Returns the family-side entry, or `None` if the user
/// had nothing to move.
pub async fn transfer_user_to_family(
    user: &UserAccount,
    family_id: i64,
    memo: &EntryMemo,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, SqliteDatabaseError> {
    let amount = user.balance;
    if !amount.is_positive() {
        return Ok(None);
    }
    apply_movement(Owner::User(user.id), -amount, OperationType::Transfer, memo, &mut *conn).await?;
    let entry = apply_movement(Owner::Family(family_id), amount, OperationType::Transfer, memo, conn).await?;
    debug!("📒️ Moved {amount} from user #{} into family #{family_id}", user.id);
    Ok(Some(entry))
}

/// Moves the whole family pool to one of its members. Used when the last member leaves.
pub async fn transfer_family_to_user(
    family_id: i64,
    pool: Points,
    user_id: i64,
    memo: &EntryMemo,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, SqliteDatabaseError> {
    if !pool.is_positive() {
        return Ok(None);
    }
    apply_movement(Owner::Family(family_id), -pool, OperationType::Transfer, memo, &mut *conn).await?;
    let entry = apply_movement(Owner::User(user_id), pool, OperationType::Transfer, memo, conn).await?;
    debug!("📒️ Returned the family #{family_id} pool of {pool} to user #{user_id}");
    Ok(Some(entry))
}

/// Everything the user has earned, wherever it was credited. Transfers only move points whose accrual is already
/// counted, so neither direction of a transfer adds to the total.
pub async fn contribution_total(user_id: i64, conn: &mut SqliteConnection) -> Result<Points, SqliteDatabaseError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount), 0) FROM ledger_entries
        WHERE owner_type = 'user' AND user_id = $1 AND amount > 0
          AND operation IN ('steps_accrual', 'promo_accrual')
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(Points::from(total))
}

/// The user's own entries merged with those of `family_id`, newest first.
pub async fn history(
    user_id: i64,
    family_id: Option<i64>,
    limit: u32,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerEntry>, SqliteDatabaseError> {
    let entries = sqlx::query_as(
        r#"
        SELECT * FROM ledger_entries
        WHERE (owner_type = 'user' AND user_id = $1) OR (owner_type = 'family' AND family_id = $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(family_id)
    .bind(i64::from(limit))
    .fetch_all(conn)
    .await?;
    Ok(entries)
}

pub async fn entries_for_owner(owner: Owner, conn: &mut SqliteConnection) -> Result<Vec<LedgerEntry>, SqliteDatabaseError> {
    let column = match owner.kind() {
        OwnerKind::User => "user_id",
        OwnerKind::Family => "family_id",
    };
    let sql = format!("SELECT * FROM ledger_entries WHERE owner_type = $1 AND {column} = $2 ORDER BY created_at, id");
    let entries = sqlx::query_as(&sql).bind(owner.kind()).bind(owner.id()).fetch_all(conn).await?;
    Ok(entries)
}

/// Credits an individual's earnings to the right balance. Family members earn into the family pool and get an
/// attribution entry of their own; everyone else is credited directly. The caller must hold the write lock.
pub async fn accrue(
    user: &UserAccount,
    amount: Points,
    operation: OperationType,
    memo: &EntryMemo,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, SqliteDatabaseError> {
    if !amount.is_positive() {
        return Err(SqliteDatabaseError::InvalidAmount(amount));
    }
    let entry = match user.family_id {
        Some(family_id) => {
            let entry = apply_movement(Owner::Family(family_id), amount, operation, memo, &mut *conn).await?;
            attribute(user.id, amount, operation, memo, &mut *conn).await?;
            entry
        },
        None => apply_movement(Owner::User(user.id), amount, operation, memo, &mut *conn).await?,
    };
    if operation == OperationType::StepsAccrual {
        referrals::reward_inviter(user, amount, conn).await?;
    }
    debug!("📒️ {amount} [{operation}] accrued to {} on behalf of user #{}", entry_owner(&entry), user.id);
    Ok(entry)
}

/// Debits the family using proportional settlement and journals every line. `account` must have been read after the
/// write lock was taken.
pub async fn debit_family(
    account: &FamilyAccount,
    amount: Points,
    memo: &EntryMemo,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerEntry>, SqliteDatabaseError> {
    let settlement = settle(account, amount)?;
    let mut entries = Vec::with_capacity(settlement.lines.len());
    for line in &settlement.lines {
        let entry = apply_movement(line.owner, line.delta, OperationType::Purchase, memo, &mut *conn).await?;
        if entry.balance_after != Some(line.balance_after) {
            error!(
                "📒️ Settlement expected {} to end at {}, but the database reports {:?}. Rolling back.",
                line.owner, line.balance_after, entry.balance_after
            );
            return Err(SqliteDatabaseError::LedgerInvariant(format!("stale balance for {}", line.owner)));
        }
        entries.push(entry);
    }
    debug!("📒️ Family #{} settled {amount} across {} entries", account.family.id, entries.len());
    Ok(entries)
}

/// Debits an individual's personal balance. The caller must hold the write lock.
pub async fn debit_user(
    user: &UserAccount,
    amount: Points,
    memo: &EntryMemo,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, SqliteDatabaseError> {
    if !amount.is_positive() {
        return Err(SqliteDatabaseError::InvalidAmount(amount));
    }
    if user.balance < amount {
        return Err(SqliteDatabaseError::InsufficientBalance { required: amount, available: user.balance });
    }
    apply_movement(Owner::User(user.id), -amount, OperationType::Purchase, memo, conn).await
}

fn entry_owner(entry: &LedgerEntry) -> String {
    entry.owner().map(|o| o.to_string()).unwrap_or_else(|| "unknown owner".to_string())
}
