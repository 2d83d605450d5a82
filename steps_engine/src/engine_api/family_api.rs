use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Family, FamilyAccount, FamilyInvitation, Points, UserRef},
    engine_api::errors::FamilyError,
    traits::{FamilyManagement, FamilyStats, MAX_FAMILY_NAME_LENGTH},
};

/// Trims the name and checks that it is between 1 and [`MAX_FAMILY_NAME_LENGTH`] characters long.
pub fn validate_family_name(name: &str) -> Result<String, FamilyError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FamilyError::InvalidName("the name cannot be empty".into()));
    }
    let len = name.chars().count();
    if len > MAX_FAMILY_NAME_LENGTH {
        return Err(FamilyError::InvalidName(format!(
            "the name is {len} characters long, but at most {MAX_FAMILY_NAME_LENGTH} are allowed"
        )));
    }
    Ok(name.to_string())
}

pub struct FamilyApi<B> {
    db: B,
}

impl<B: Debug> Debug for FamilyApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FamilyApi ({:?})", self.db)
    }
}

impl<B> FamilyApi<B>
where B: FamilyManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn create_family(&self, owner: UserRef, name: &str) -> Result<FamilyAccount, FamilyError> {
        let name = validate_family_name(name)?;
        self.db.create_family(owner, &name).await
    }

    pub async fn invite(&self, inviter: UserRef, invitee_username: &str) -> Result<FamilyInvitation, FamilyError> {
        let username = invitee_username.trim().trim_start_matches('@');
        if username.is_empty() {
            return Err(FamilyError::UserNotFound("an empty username".into()));
        }
        self.db.invite_member(inviter, username).await
    }

    pub async fn respond(&self, invitee: UserRef, invitation_id: i64, accept: bool) -> Result<FamilyInvitation, FamilyError> {
        let result = self.db.respond_to_invitation(invitee, invitation_id, accept).await?;
        trace!("👪️ Invitation #{invitation_id} is now {:?}", result.status);
        Ok(result)
    }

    pub async fn pending_invitations(&self, invitee: UserRef) -> Result<Vec<FamilyInvitation>, FamilyError> {
        self.db.pending_invitations(invitee).await
    }

    pub async fn leave(&self, user: UserRef) -> Result<Option<i64>, FamilyError> {
        self.db.leave_family(user).await
    }

    pub async fn disband(&self, owner: UserRef) -> Result<Points, FamilyError> {
        self.db.disband_family(owner).await
    }

    pub async fn kick(&self, owner: UserRef, member_id: i64) -> Result<(), FamilyError> {
        self.db.kick_member(owner, member_id).await
    }

    pub async fn rename(&self, member: UserRef, name: &str) -> Result<Family, FamilyError> {
        let name = validate_family_name(name)?;
        self.db.rename_family(member, &name).await
    }

    pub async fn stats(&self, user: UserRef) -> Result<FamilyStats, FamilyError> {
        self.db.family_stats(user).await
    }
}
