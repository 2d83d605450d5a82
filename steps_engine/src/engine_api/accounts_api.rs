//! Unifies API for accessing accounts.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Account, FamilyAccount, NewUser, UserAccount, UserRef},
    engine_api::errors::AccountApiError,
    traits::{AccountManagement, ReferenceData},
};

/// The `AccountApi` provides a unified API for accessing individuals and the accounts that pay for them.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Registers the individual if they are new. Calling this for an existing Telegram id refreshes the username.
    pub async fn register(&self, user: NewUser) -> Result<UserAccount, AccountApiError> {
        let account = self.db.register_user(user).await?;
        trace!("🧑️ Registered {} with balance {}", account.display_name(), account.balance);
        Ok(account)
    }

    pub async fn user(&self, user: UserRef) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user(user).await
    }

    /// Like [`Self::user`], but a missing account is an error.
    pub async fn existing_user(&self, user: UserRef) -> Result<UserAccount, AccountApiError> {
        self.db.fetch_user(user).await?.ok_or_else(|| AccountApiError::NotFound(user.to_string()))
    }

    pub async fn family(&self, family_id: i64) -> Result<Option<FamilyAccount>, AccountApiError> {
        self.db.fetch_family(family_id).await
    }

    /// The account that pays for the individual's purchases, and the points it can spend.
    pub async fn payable_account(&self, user: UserRef) -> Result<Account, AccountApiError> {
        self.db.fetch_payable_account(user).await?.ok_or_else(|| AccountApiError::NotFound(user.to_string()))
    }
}

impl<B> AccountApi<B>
where B: ReferenceData
{
    pub async fn setting(&self, key: &str) -> Result<Option<String>, AccountApiError> {
        self.db.fetch_setting(key).await
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), AccountApiError> {
        debug!("🧑️ Setting {key} = {value}");
        self.db.store_setting(key, value).await
    }
}
