use chrono::Utc;
use log::{debug, info, warn};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::{ledger, reference_data, users, SqliteDatabaseError},
    db_types::{EntryMemo, LedgerEntry, OperationType, Owner, Points, Referral, UserAccount, UserRef},
    traits::{ReferralSummary, DEFAULT_REFERRAL_REWARD_PERCENT, REFERRAL_REWARD_PERCENT_KEY},
};

/// Inserts a referral. Returns `Ok(None)` if the user has already been referred.
pub async fn insert_referral(
    user_id: i64,
    inviter_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Referral>, SqliteDatabaseError> {
    let result = sqlx::query_as("INSERT INTO referrals (user_id, inviter_id, created_at) VALUES ($1, $2, $3) RETURNING *")
        .bind(user_id)
        .bind(inviter_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await;
    match result {
        Ok(referral) => Ok(Some(referral)),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_referral(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Referral>, SqliteDatabaseError> {
    let referral =
        sqlx::query_as("SELECT * FROM referrals WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(referral)
}

pub async fn summary(inviter_id: i64, conn: &mut SqliteConnection) -> Result<ReferralSummary, SqliteDatabaseError> {
    let (referred_count, total_reward): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(reward_points), 0) FROM referrals WHERE inviter_id = $1",
    )
    .bind(inviter_id)
    .fetch_one(conn)
    .await?;
    Ok(ReferralSummary { inviter_id, referred_count, total_reward: Points::from(total_reward) })
}

/// The configured reward percentage, clamped to `0..=100`. Falls back to the default if the setting is missing or
/// unreadable.
pub async fn reward_percent(conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let percent = match reference_data::fetch_setting(REFERRAL_REWARD_PERCENT_KEY, conn).await? {
        None => DEFAULT_REFERRAL_REWARD_PERCENT,
        Some(value) => value.trim().parse::<i64>().unwrap_or_else(|e| {
            warn!("🧑️ Setting {REFERRAL_REWARD_PERCENT_KEY}='{value}' is not a number ({e}). Using the default.");
            DEFAULT_REFERRAL_REWARD_PERCENT
        }),
    };
    Ok(percent.clamp(0, 100))
}

/// Pays the inviter of `earner` their share of `earned`, if `earner` was referred. The reward goes to the inviter's
/// family pool if they have one, otherwise to the inviter. Must run inside the accrual's transaction.
pub async fn reward_inviter(
    earner: &UserAccount,
    earned: Points,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, SqliteDatabaseError> {
    let referral = match fetch_referral(earner.id, &mut *conn).await? {
        Some(r) => r,
        None => return Ok(None),
    };
    let percent = reward_percent(&mut *conn).await?;
    let reward = earned.scale(Points::from(percent), Points::from(100));
    if !reward.is_positive() {
        return Ok(None);
    }
    let inviter = users::fetch_user(UserRef::Id(referral.inviter_id), &mut *conn)
        .await?
        .ok_or(SqliteDatabaseError::AccountNotFound(UserRef::Id(referral.inviter_id)))?;
    let owner = inviter.family_id.map(Owner::Family).unwrap_or(Owner::User(inviter.id));
    let memo = EntryMemo::new("Referral reward").with_description(format!("{percent}% of {earned} earned by a friend"));
    let entry = ledger::apply_movement(owner, reward, OperationType::PromoAccrual, &memo, &mut *conn).await?;
    sqlx::query("UPDATE referrals SET reward_points = reward_points + $1 WHERE id = $2")
        .bind(reward)
        .bind(referral.id)
        .execute(conn)
        .await?;
    info!("🧑️ Referral reward of {reward} paid to {owner} for user #{}'s walk", earner.id);
    debug!("🧑️ Referral #{} has now paid out {}", referral.id, referral.reward_points + reward);
    Ok(Some(entry))
}
