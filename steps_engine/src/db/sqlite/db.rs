use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::{db_url, families, ledger, new_pool, reference_data, referrals, shop, users, SqliteDatabaseError};
use crate::{
    db_types::{
        Account,
        EntryMemo,
        Family,
        FamilyAccount,
        FamilyInvitation,
        InviteStatus,
        LedgerEntry,
        NewUser,
        OperationType,
        Owner,
        Points,
        Product,
        PromoGroup,
        Referral,
        UserAccount,
        UserRef,
        WalkForm,
    },
    engine_api::errors::{AccountApiError, FamilyError, LedgerError, ReferralError, ShopError},
    traits::{
        AccountManagement,
        FamilyManagement,
        FamilyStats,
        FamilySummary,
        LedgerManagement,
        ProductPurchase,
        PromoPurchase,
        ReferenceData,
        ReferralManagement,
        ReferralSummary,
        ShopManagement,
        MAX_FAMILY_MEMBERS,
    },
};

const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `STEPS_DATABASE_URL`.
    pub async fn new() -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), DEFAULT_MAX_CONNECTIONS).await
    }

    /// Connects to the database at `url`, creating it if necessary, and brings the schema up to date.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./src/db/sqlite/migrations").run(&pool).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn set_walk_form_coefficient(&self, form: WalkForm, coefficient: i64) -> Result<(), SqliteDatabaseError> {
        let mut tx = self.pool.begin().await?;
        reference_data::upsert_walk_form_coefficient(form, coefficient, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn add_temperature_band(
        &self,
        form: WalkForm,
        min_temp_c: i64,
        max_temp_c: i64,
        coefficient: i64,
    ) -> Result<(), SqliteDatabaseError> {
        let mut tx = self.pool.begin().await?;
        reference_data::insert_temperature_band(form, min_temp_c, max_temp_c, coefficient, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// The number of promo code uses still available in the group.
    pub async fn available_promo_codes(&self, group_id: i64) -> Result<i64, SqliteDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        shop::available_codes(group_id, &mut conn).await
    }
}

impl AccountManagement for SqliteDatabase {
    async fn register_user(&self, user: NewUser) -> Result<UserAccount, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let account = users::upsert_user(user, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn fetch_user(&self, user: UserRef) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = users::fetch_user(user, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = users::fetch_user_by_username(username, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_family(&self, family_id: i64) -> Result<Option<FamilyAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = families::family_account(family_id, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_payable_account(&self, user: UserRef) -> Result<Option<Account>, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let account = match users::fetch_user(user, &mut tx).await? {
            None => return Ok(None),
            Some(account) => account,
        };
        let result = match account.family_id {
            None => Account::Individual(account),
            Some(family_id) => {
                let family = families::family_account(family_id, &mut tx)
                    .await?
                    .ok_or(SqliteDatabaseError::FamilyNotFound(family_id))?;
                Account::Group(family)
            },
        };
        tx.commit().await?;
        Ok(Some(result))
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn accrue(
        &self,
        user: UserRef,
        amount: Points,
        operation: OperationType,
        memo: EntryMemo,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let account = users::lock_user(user, &mut tx).await?.ok_or(SqliteDatabaseError::AccountNotFound(user))?;
        let entry = ledger::accrue(&account, amount, operation, &memo, &mut tx).await?;
        tx.commit().await?;
        Ok(entry)
    }

    async fn debit_family_proportional(
        &self,
        family_id: i64,
        amount: Points,
        memo: EntryMemo,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        families::lock_family(family_id, &mut tx).await?.ok_or(SqliteDatabaseError::FamilyNotFound(family_id))?;
        let account = families::family_account(family_id, &mut tx)
            .await?
            .ok_or(SqliteDatabaseError::FamilyNotFound(family_id))?;
        let entries = ledger::debit_family(&account, amount, &memo, &mut tx).await?;
        tx.commit().await?;
        Ok(entries)
    }

    async fn debit_user(&self, user: UserRef, amount: Points, memo: EntryMemo) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let account = users::lock_user(user, &mut tx).await?.ok_or(SqliteDatabaseError::AccountNotFound(user))?;
        let entry = ledger::debit_user(&account, amount, &memo, &mut tx).await?;
        tx.commit().await?;
        Ok(entry)
    }

    async fn contribution_total(&self, user: UserRef) -> Result<Points, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let account =
            users::fetch_user(user, &mut conn).await?.ok_or(SqliteDatabaseError::AccountNotFound(user))?;
        let total = ledger::contribution_total(account.id, &mut conn).await?;
        Ok(total)
    }

    async fn history(&self, user: UserRef, limit: u32) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let account =
            users::fetch_user(user, &mut conn).await?.ok_or(SqliteDatabaseError::AccountNotFound(user))?;
        let entries = ledger::history(account.id, account.family_id, limit, &mut conn).await?;
        Ok(entries)
    }

    async fn entries_for_owner(&self, owner: Owner) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let entries = ledger::entries_for_owner(owner, &mut conn).await?;
        Ok(entries)
    }

    async fn record_walk(
        &self,
        user: UserRef,
        steps: i64,
        points: Points,
        memo: EntryMemo,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let account = users::lock_user(user, &mut tx).await?.ok_or(SqliteDatabaseError::AccountNotFound(user))?;
        if steps > 0 {
            users::add_steps(account.id, steps, &mut tx).await?;
            if let Some(family_id) = account.family_id {
                families::add_steps(family_id, steps, &mut tx).await?;
            }
        }
        let entry = if points.is_positive() {
            Some(ledger::accrue(&account, points, OperationType::StepsAccrual, &memo, &mut tx).await?)
        } else {
            None
        };
        tx.commit().await?;
        debug!("📒️ Walk of {steps} steps recorded for user #{} ({points})", account.id);
        Ok(entry)
    }
}

impl ShopManagement for SqliteDatabase {
    async fn fetch_active_promo_groups(&self) -> Result<Vec<PromoGroup>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let groups = shop::fetch_active_promo_groups(&mut conn).await?;
        Ok(groups)
    }

    async fn fetch_promo_group(&self, group_id: i64) -> Result<Option<PromoGroup>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let group = shop::fetch_promo_group(group_id, &mut conn).await?;
        Ok(group)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let product = shop::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn acquire_promo_code(&self, group_id: i64, buyer: UserRef) -> Result<PromoPurchase, ShopError> {
        let mut tx = self.pool.begin().await?;
        let group = shop::lock_promo_group(group_id, &mut tx)
            .await?
            .ok_or_else(|| ShopError::NotFound(format!("promo group #{group_id}")))?;
        if !group.is_active {
            return Err(ShopError::Inactive(group.name));
        }
        let code = shop::claim_promo_code(group_id, &mut tx).await?.ok_or_else(|| ShopError::OutOfStock(group.name.clone()))?;
        let account =
            users::fetch_user(buyer, &mut tx).await?.ok_or_else(|| ShopError::NotFound(buyer.to_string()))?;
        let family_id = account.family_id.ok_or(ShopError::RequiresFamily)?;
        let family = families::family_account(family_id, &mut tx)
            .await?
            .ok_or_else(|| ShopError::NotFound(format!("family #{family_id}")))?;
        let entries = if group.price.is_positive() {
            let available = family.total_available();
            if available < group.price {
                debug!("🛒️ Family #{family_id} cannot afford {} ({available} available)", group.name);
                return Err(ShopError::InsufficientBalance { required: group.price, available });
            }
            let memo = EntryMemo::new(format!("Promo code: {}", group.name))
                .with_description(format!("Bought by {}", account.display_name()));
            ledger::debit_family(&family, group.price, &memo, &mut tx).await?
        } else {
            Vec::new()
        };
        tx.commit().await?;
        info!("🛒️ {} acquired a code from promo group '{}' for {}", account.display_name(), group.name, group.price);
        Ok(PromoPurchase { group, code, buyer_id: account.id, payer: Owner::Family(family_id), entries })
    }

    async fn purchase_product(&self, product_id: i64, buyer: UserRef) -> Result<ProductPurchase, ShopError> {
        let mut tx = self.pool.begin().await?;
        let product = match shop::claim_product(product_id, &mut tx).await? {
            Some(p) => p,
            None => {
                return match shop::fetch_product(product_id, &mut tx).await? {
                    Some(p) => Err(ShopError::OutOfStock(p.title)),
                    None => Err(ShopError::NotFound(format!("product #{product_id}"))),
                };
            },
        };
        let account =
            users::fetch_user(buyer, &mut tx).await?.ok_or_else(|| ShopError::NotFound(buyer.to_string()))?;
        let payer = match account.family_id {
            Some(family_id) => {
                let family = families::family_account(family_id, &mut tx)
                    .await?
                    .ok_or_else(|| ShopError::NotFound(format!("family #{family_id}")))?;
                Account::Group(family)
            },
            None => Account::Individual(account.clone()),
        };
        let available = payer.available();
        if available < product.price {
            debug!("🛒️ {} cannot afford '{}' ({available} available)", payer.owner(), product.title);
            return Err(ShopError::InsufficientBalance { required: product.price, available });
        }
        let order = shop::insert_order(account.id, product.id, product.price, &mut tx).await?;
        let memo = EntryMemo::new(format!("Purchase: {}", product.title)).with_order(order.id);
        let entries = match (&payer, product.price.is_positive()) {
            (_, false) => Vec::new(),
            (Account::Group(family), true) => ledger::debit_family(family, product.price, &memo, &mut tx).await?,
            (Account::Individual(user), true) => vec![ledger::debit_user(user, product.price, &memo, &mut tx).await?],
        };
        tx.commit().await?;
        info!("🛒️ {} bought '{}' for {}. Order #{}", account.display_name(), product.title, product.price, order.id);
        Ok(ProductPurchase { product, order, payer: payer.owner(), entries })
    }
}

impl FamilyManagement for SqliteDatabase {
    async fn create_family(&self, owner: UserRef, name: &str) -> Result<FamilyAccount, FamilyError> {
        let mut tx = self.pool.begin().await?;
        let account = users::lock_user(owner, &mut tx).await?.ok_or_else(|| FamilyError::UserNotFound(owner.to_string()))?;
        if account.is_family_member() {
            return Err(FamilyError::AlreadyMember(account.display_name()));
        }
        let family = families::insert_family(name, &mut tx).await?.ok_or_else(|| FamilyError::NameTaken(name.to_string()))?;
        users::set_family(account.id, Some(family.id), &mut tx).await?;
        let result =
            families::family_account(family.id, &mut tx).await?.ok_or(FamilyError::FamilyNotFound(family.id))?;
        tx.commit().await?;
        info!("👪️ {} created family '{}' (#{})", account.display_name(), family.name, family.id);
        Ok(result)
    }

    async fn invite_member(&self, inviter: UserRef, invitee_username: &str) -> Result<FamilyInvitation, FamilyError> {
        let mut tx = self.pool.begin().await?;
        let inviter =
            users::lock_user(inviter, &mut tx).await?.ok_or_else(|| FamilyError::UserNotFound(inviter.to_string()))?;
        let family_id = inviter.family_id.ok_or(FamilyError::NotInFamily)?;
        let invitee = users::fetch_user_by_username(invitee_username, &mut tx)
            .await?
            .ok_or_else(|| FamilyError::UserNotFound(invitee_username.to_string()))?;
        if invitee.is_family_member() {
            return Err(FamilyError::AlreadyMember(invitee.display_name()));
        }
        let members = users::members_of(family_id, &mut tx).await?;
        if members.len() >= MAX_FAMILY_MEMBERS {
            return Err(FamilyError::CapacityExceeded(MAX_FAMILY_MEMBERS));
        }
        if families::pending_invitation_exists(family_id, invitee.id, &mut tx).await? {
            return Err(FamilyError::AlreadyInvited(invitee.display_name()));
        }
        let invitation = families::insert_invitation(family_id, inviter.id, invitee.id, &mut tx).await?;
        tx.commit().await?;
        info!("👪️ {} invited {} to family #{family_id}", inviter.display_name(), invitee.display_name());
        Ok(invitation)
    }

    async fn respond_to_invitation(
        &self,
        invitee: UserRef,
        invitation_id: i64,
        accept: bool,
    ) -> Result<FamilyInvitation, FamilyError> {
        let mut tx = self.pool.begin().await?;
        let user =
            users::lock_user(invitee, &mut tx).await?.ok_or_else(|| FamilyError::UserNotFound(invitee.to_string()))?;
        let invitation = families::pending_invitation(invitation_id, user.id, &mut tx)
            .await?
            .ok_or(FamilyError::InvitationNotFound(invitation_id))?;
        if !accept {
            families::delete_invitation(invitation.id, &mut tx).await?;
            tx.commit().await?;
            debug!("👪️ {} declined invitation #{invitation_id}", user.display_name());
            return Ok(FamilyInvitation {
                status: InviteStatus::Declined,
                responded_at: Some(Utc::now()),
                ..invitation
            });
        }
        if user.is_family_member() {
            return Err(FamilyError::AlreadyMember(user.display_name()));
        }
        let family_id = invitation.family_id;
        families::fetch_family(family_id, &mut tx).await?.ok_or(FamilyError::FamilyNotFound(family_id))?;
        let members = users::members_of(family_id, &mut tx).await?;
        if members.len() >= MAX_FAMILY_MEMBERS {
            return Err(FamilyError::CapacityExceeded(MAX_FAMILY_MEMBERS));
        }
        let memo = EntryMemo::new("Transfer on joining a family");
        ledger::transfer_user_to_family(&user, family_id, &memo, &mut tx).await?;
        users::set_family(user.id, Some(family_id), &mut tx).await?;
        let accepted = families::set_invitation_status(invitation.id, InviteStatus::Accepted, &mut tx).await?;
        families::delete_invitations_involving(user.id, &mut tx).await?;
        tx.commit().await?;
        info!("👪️ {} joined family #{family_id}", user.display_name());
        Ok(accepted)
    }

    async fn pending_invitations(&self, invitee: UserRef) -> Result<Vec<FamilyInvitation>, FamilyError> {
        let mut conn = self.pool.acquire().await?;
        let user =
            users::fetch_user(invitee, &mut conn).await?.ok_or_else(|| FamilyError::UserNotFound(invitee.to_string()))?;
        let invitations = families::pending_invitations_for(user.id, &mut conn).await?;
        Ok(invitations)
    }

    async fn leave_family(&self, user: UserRef) -> Result<Option<i64>, FamilyError> {
        let mut tx = self.pool.begin().await?;
        let account = users::lock_user(user, &mut tx).await?.ok_or_else(|| FamilyError::UserNotFound(user.to_string()))?;
        let family_id = account.family_id.ok_or(FamilyError::NotInFamily)?;
        let memo = EntryMemo::new("Transfer on leaving a family");
        ledger::transfer_user_to_family(&account, family_id, &memo, &mut tx).await?;
        users::set_family(account.id, None, &mut tx).await?;
        families::delete_invitations_involving(account.id, &mut tx).await?;
        let remaining = users::members_of(family_id, &mut tx).await?;
        let result = if remaining.is_empty() {
            let family = families::fetch_family(family_id, &mut tx).await?.ok_or(FamilyError::FamilyNotFound(family_id))?;
            let memo = EntryMemo::new("Family pool returned on disbanding");
            ledger::transfer_family_to_user(family_id, family.balance, account.id, &memo, &mut tx).await?;
            families::delete_family(family_id, &mut tx).await?;
            info!("👪️ {} was the last member of family #{family_id}. The family has been disbanded.", account.display_name());
            None
        } else {
            info!("👪️ {} left family #{family_id}", account.display_name());
            Some(family_id)
        };
        tx.commit().await?;
        Ok(result)
    }

    async fn disband_family(&self, owner: UserRef) -> Result<Points, FamilyError> {
        let mut tx = self.pool.begin().await?;
        let caller = users::lock_user(owner, &mut tx).await?.ok_or_else(|| FamilyError::UserNotFound(owner.to_string()))?;
        let family_id = caller.family_id.ok_or(FamilyError::NotInFamily)?;
        let family = families::lock_family(family_id, &mut tx).await?.ok_or(FamilyError::FamilyNotFound(family_id))?;
        let members = users::members_of(family_id, &mut tx).await?;
        if members.iter().map(|m| m.id).min() != Some(caller.id) {
            return Err(FamilyError::Forbidden("only the family owner can disband the family".into()));
        }
        let memo = EntryMemo::new("Family pool returned on disbanding");
        ledger::transfer_family_to_user(family_id, family.balance, caller.id, &memo, &mut tx).await?;
        let released = users::release_members(family_id, &mut tx).await?;
        families::delete_invitations_for_family(family_id, &mut tx).await?;
        families::delete_family(family_id, &mut tx).await?;
        tx.commit().await?;
        info!(
            "👪️ {} disbanded family #{family_id}. {released} members released, {} returned to the owner.",
            caller.display_name(),
            family.balance
        );
        Ok(family.balance)
    }

    async fn kick_member(&self, owner: UserRef, member_id: i64) -> Result<(), FamilyError> {
        let mut tx = self.pool.begin().await?;
        let caller = users::lock_user(owner, &mut tx).await?.ok_or_else(|| FamilyError::UserNotFound(owner.to_string()))?;
        let family_id = caller.family_id.ok_or(FamilyError::NotInFamily)?;
        let members = users::members_of(family_id, &mut tx).await?;
        let owner_id = members.iter().map(|m| m.id).min();
        if owner_id != Some(caller.id) {
            return Err(FamilyError::Forbidden("only the family owner can remove members".into()));
        }
        if member_id == caller.id {
            return Err(FamilyError::Forbidden("the owner cannot remove themselves".into()));
        }
        let victim = members
            .iter()
            .find(|m| m.id == member_id)
            .ok_or_else(|| FamilyError::UserNotFound(format!("user #{member_id} in family #{family_id}")))?;
        let memo = EntryMemo::new("Transfer on removal from a family");
        ledger::transfer_user_to_family(victim, family_id, &memo, &mut tx).await?;
        users::set_family(victim.id, None, &mut tx).await?;
        families::delete_invitations_involving(victim.id, &mut tx).await?;
        tx.commit().await?;
        info!("👪️ {} removed {} from family #{family_id}", caller.display_name(), victim.display_name());
        Ok(())
    }

    async fn rename_family(&self, member: UserRef, name: &str) -> Result<Family, FamilyError> {
        let mut tx = self.pool.begin().await?;
        let account = users::lock_user(member, &mut tx).await?.ok_or_else(|| FamilyError::UserNotFound(member.to_string()))?;
        let family_id = account.family_id.ok_or(FamilyError::NotInFamily)?;
        let family =
            families::rename_family(family_id, name, &mut tx).await?.ok_or_else(|| FamilyError::NameTaken(name.to_string()))?;
        tx.commit().await?;
        debug!("👪️ Family #{family_id} renamed to '{name}'");
        Ok(family)
    }

    async fn family_stats(&self, user: UserRef) -> Result<FamilyStats, FamilyError> {
        let mut tx = self.pool.begin().await?;
        let account = users::fetch_user(user, &mut tx).await?.ok_or_else(|| FamilyError::UserNotFound(user.to_string()))?;
        let family = match account.family_id {
            None => None,
            Some(family_id) => {
                let family =
                    families::family_account(family_id, &mut tx).await?.ok_or(FamilyError::FamilyNotFound(family_id))?;
                Some(FamilySummary {
                    id: family.family.id,
                    name: family.family.name.clone(),
                    member_count: family.members.len(),
                    pool_balance: family.family.balance,
                    total_steps: family.members.iter().map(|m| m.step_count).sum(),
                    total_balance: family.total_available(),
                })
            },
        };
        tx.commit().await?;
        Ok(FamilyStats { user_id: account.id, steps: account.step_count, balance: account.balance, family })
    }
}

impl ReferenceData for SqliteDatabase {
    async fn walk_form_coefficient(&self, form: WalkForm) -> Result<i64, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let coefficient = reference_data::walk_form_coefficient(form, &mut conn).await?;
        Ok(coefficient.unwrap_or(1))
    }

    async fn temperature_coefficient(&self, form: WalkForm, temp_c: i64) -> Result<i64, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let coefficient = reference_data::temperature_coefficient(form, temp_c, &mut conn).await?;
        Ok(coefficient.unwrap_or(1))
    }

    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let value = reference_data::fetch_setting(key, &mut conn).await?;
        Ok(value)
    }

    async fn store_setting(&self, key: &str, value: &str) -> Result<(), AccountApiError> {
        let mut tx = self.pool.begin().await?;
        reference_data::store_setting(key, value, &mut tx).await?;
        tx.commit().await?;
        trace!("🪛️ Setting {key} updated");
        Ok(())
    }
}

impl ReferralManagement for SqliteDatabase {
    async fn create_referral(&self, referred: UserRef, inviter: UserRef) -> Result<Referral, ReferralError> {
        let mut tx = self.pool.begin().await?;
        let user =
            users::lock_user(referred, &mut tx).await?.ok_or_else(|| ReferralError::UserNotFound(referred.to_string()))?;
        let inviter =
            users::fetch_user(inviter, &mut tx).await?.ok_or_else(|| ReferralError::UserNotFound(inviter.to_string()))?;
        if user.id == inviter.id {
            return Err(ReferralError::SelfReferral);
        }
        let referral =
            referrals::insert_referral(user.id, inviter.id, &mut tx).await?.ok_or(ReferralError::AlreadyReferred(user.id))?;
        tx.commit().await?;
        info!("🧑️ {} was referred by {}", user.display_name(), inviter.display_name());
        Ok(referral)
    }

    async fn referral_summary(&self, inviter: UserRef) -> Result<ReferralSummary, ReferralError> {
        let mut conn = self.pool.acquire().await?;
        let account =
            users::fetch_user(inviter, &mut conn).await?.ok_or_else(|| ReferralError::UserNotFound(inviter.to_string()))?;
        let summary = referrals::summary(account.id, &mut conn).await?;
        Ok(summary)
    }
}
