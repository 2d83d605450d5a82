use crate::{
    db_types::{Account, FamilyAccount, NewUser, UserAccount, UserRef},
    engine_api::errors::AccountApiError,
};

/// The `AccountManagement` trait defines behaviour for registering and querying individuals and families.
///
/// Individuals are addressed with a [`UserRef`], which may hold either the internal id or the Telegram id. Backends
/// must treat both keys as equivalent.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Registers a new individual with a zero balance. Registering an existing Telegram id is not an error: the
    /// existing account is returned, with its username refreshed if a new one was supplied.
    async fn register_user(&self, user: NewUser) -> Result<UserAccount, AccountApiError>;

    /// Fetches the individual for the given key. If no account exists, `None` is returned.
    async fn fetch_user(&self, user: UserRef) -> Result<Option<UserAccount>, AccountApiError>;

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<UserAccount>, AccountApiError>;

    /// Fetches a family and its members, ordered by user id.
    async fn fetch_family(&self, family_id: i64) -> Result<Option<FamilyAccount>, AccountApiError>;

    /// Fetches the account that pays for, and is credited by, the given individual's actions: their family if they are
    /// a member of one, otherwise their own account.
    async fn fetch_payable_account(&self, user: UserRef) -> Result<Option<Account>, AccountApiError>;
}
