use crate::{
    db_types::{Family, FamilyAccount, FamilyInvitation, Points, UserRef},
    engine_api::errors::FamilyError,
    traits::FamilyStats,
};

/// Maximum number of members a family may have.
pub const MAX_FAMILY_MEMBERS: usize = 5;
/// Maximum length of a family name, in characters.
pub const MAX_FAMILY_NAME_LENGTH: usize = 50;

/// Family membership management. Every method that changes membership also moves points: personal balances are
/// folded into the family pool when someone joins or leaves, so that no points are lost.
#[allow(async_fn_in_trait)]
pub trait FamilyManagement {
    /// Creates a family with `owner` as its first member. `name` has already been validated by the caller.
    async fn create_family(&self, owner: UserRef, name: &str) -> Result<FamilyAccount, FamilyError>;

    /// Invites the user with the given username into the inviter's family.
    async fn invite_member(&self, inviter: UserRef, invitee_username: &str) -> Result<FamilyInvitation, FamilyError>;

    /// Accepts or declines a pending invitation addressed to `invitee`.
    async fn respond_to_invitation(
        &self,
        invitee: UserRef,
        invitation_id: i64,
        accept: bool,
    ) -> Result<FamilyInvitation, FamilyError>;

    async fn pending_invitations(&self, invitee: UserRef) -> Result<Vec<FamilyInvitation>, FamilyError>;

    /// Removes the user from their family. Returns the id of the family if it still exists afterwards, or `None` if
    /// the user was the last member and the family was deleted.
    async fn leave_family(&self, user: UserRef) -> Result<Option<i64>, FamilyError>;

    /// Dissolves the family owned by `owner`. The pool is paid to the owner, every member keeps their personal balance
    /// and pending invitations are dropped. Returns the amount paid out of the pool.
    async fn disband_family(&self, owner: UserRef) -> Result<Points, FamilyError>;

    /// Removes `member_id` from the family owned by `owner`.
    async fn kick_member(&self, owner: UserRef, member_id: i64) -> Result<(), FamilyError>;

    async fn rename_family(&self, member: UserRef, name: &str) -> Result<Family, FamilyError>;

    async fn family_stats(&self, user: UserRef) -> Result<FamilyStats, FamilyError>;
}
