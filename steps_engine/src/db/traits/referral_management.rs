use crate::{
    db_types::{Referral, UserRef},
    engine_api::errors::ReferralError,
    traits::ReferralSummary,
};

/// Settings key holding the percentage of a referred user's earnings paid to their inviter.
pub const REFERRAL_REWARD_PERCENT_KEY: &str = "referral_reward_percent";
pub const DEFAULT_REFERRAL_REWARD_PERCENT: i64 = 10;

#[allow(async_fn_in_trait)]
pub trait ReferralManagement {
    /// Records that `referred` joined on the invitation of `inviter`. Each individual can be referred once, and never
    /// by themselves.
    async fn create_referral(&self, referred: UserRef, inviter: UserRef) -> Result<Referral, ReferralError>;

    async fn referral_summary(&self, inviter: UserRef) -> Result<ReferralSummary, ReferralError>;
}
