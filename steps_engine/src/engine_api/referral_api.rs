use std::fmt::Debug;

use crate::{
    db_types::{Referral, UserRef},
    engine_api::errors::ReferralError,
    traits::{ReferralManagement, ReferralSummary},
};

pub struct ReferralApi<B> {
    db: B,
}

impl<B: Debug> Debug for ReferralApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReferralApi ({:?})", self.db)
    }
}

impl<B> ReferralApi<B>
where B: ReferralManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Records that `referred` joined on `inviter`'s recommendation. Each individual can only be referred once.
    pub async fn refer(&self, referred: UserRef, inviter: UserRef) -> Result<Referral, ReferralError> {
        if referred == inviter {
            return Err(ReferralError::SelfReferral);
        }
        self.db.create_referral(referred, inviter).await
    }

    pub async fn summary(&self, inviter: UserRef) -> Result<ReferralSummary, ReferralError> {
        self.db.referral_summary(inviter).await
    }
}
