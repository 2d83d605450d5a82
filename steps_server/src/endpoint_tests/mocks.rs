use mockall::mock;
use steps_engine::{
    db_types::{
        Account,
        EntryMemo,
        Family,
        FamilyAccount,
        FamilyInvitation,
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
    traits::{
        AccountManagement,
        FamilyManagement,
        FamilyStats,
        LedgerManagement,
        ProductPurchase,
        PromoPurchase,
        ReferenceData,
        ReferralManagement,
        ReferralSummary,
        ShopManagement,
    },
    walk::{Button, EditOutcome, MessageHandle, MessagingError, MessagingSink, TemperatureService},
    AccountApiError,
    FamilyError,
    LedgerError,
    ReferralError,
    ShopError,
};

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn register_user(&self, user: NewUser) -> Result<UserAccount, AccountApiError>;
        async fn fetch_user(&self, user: UserRef) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_user_by_username(&self, username: &str) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_family(&self, family_id: i64) -> Result<Option<FamilyAccount>, AccountApiError>;
        async fn fetch_payable_account(&self, user: UserRef) -> Result<Option<Account>, AccountApiError>;
    }
}

mock! {
    pub LedgerManager {}
    impl LedgerManagement for LedgerManager {
        async fn accrue(&self, user: UserRef, amount: Points, operation: OperationType, memo: EntryMemo) -> Result<LedgerEntry, LedgerError>;
        async fn debit_family_proportional(&self, family_id: i64, amount: Points, memo: EntryMemo) -> Result<Vec<LedgerEntry>, LedgerError>;
        async fn debit_user(&self, user: UserRef, amount: Points, memo: EntryMemo) -> Result<LedgerEntry, LedgerError>;
        async fn contribution_total(&self, user: UserRef) -> Result<Points, LedgerError>;
        async fn history(&self, user: UserRef, limit: u32) -> Result<Vec<LedgerEntry>, LedgerError>;
        async fn entries_for_owner(&self, owner: Owner) -> Result<Vec<LedgerEntry>, LedgerError>;
        async fn record_walk(&self, user: UserRef, steps: i64, points: Points, memo: EntryMemo) -> Result<Option<LedgerEntry>, LedgerError>;
    }
    impl ReferenceData for LedgerManager {
        async fn walk_form_coefficient(&self, form: WalkForm) -> Result<i64, AccountApiError>;
        async fn temperature_coefficient(&self, form: WalkForm, temp_c: i64) -> Result<i64, AccountApiError>;
        async fn fetch_setting(&self, key: &str) -> Result<Option<String>, AccountApiError>;
        async fn store_setting(&self, key: &str, value: &str) -> Result<(), AccountApiError>;
    }
}

mock! {
    pub ShopManager {}
    impl ShopManagement for ShopManager {
        async fn fetch_active_promo_groups(&self) -> Result<Vec<PromoGroup>, ShopError>;
        async fn fetch_promo_group(&self, group_id: i64) -> Result<Option<PromoGroup>, ShopError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ShopError>;
        async fn acquire_promo_code(&self, group_id: i64, buyer: UserRef) -> Result<PromoPurchase, ShopError>;
        async fn purchase_product(&self, product_id: i64, buyer: UserRef) -> Result<ProductPurchase, ShopError>;
    }
}

mock! {
    pub FamilyManager {}
    impl FamilyManagement for FamilyManager {
        async fn create_family(&self, owner: UserRef, name: &str) -> Result<FamilyAccount, FamilyError>;
        async fn invite_member(&self, inviter: UserRef, invitee_username: &str) -> Result<FamilyInvitation, FamilyError>;
        async fn respond_to_invitation(&self, invitee: UserRef, invitation_id: i64, accept: bool) -> Result<FamilyInvitation, FamilyError>;
        async fn pending_invitations(&self, invitee: UserRef) -> Result<Vec<FamilyInvitation>, FamilyError>;
        async fn leave_family(&self, user: UserRef) -> Result<Option<i64>, FamilyError>;
        async fn disband_family(&self, owner: UserRef) -> Result<Points, FamilyError>;
        async fn kick_member(&self, owner: UserRef, member_id: i64) -> Result<(), FamilyError>;
        async fn rename_family(&self, member: UserRef, name: &str) -> Result<Family, FamilyError>;
        async fn family_stats(&self, user: UserRef) -> Result<FamilyStats, FamilyError>;
    }
}

mock! {
    pub ReferralManager {}
    impl ReferralManagement for ReferralManager {
        async fn create_referral(&self, referred: UserRef, inviter: UserRef) -> Result<Referral, ReferralError>;
        async fn referral_summary(&self, inviter: UserRef) -> Result<ReferralSummary, ReferralError>;
    }
}

mock! {
    pub Weather {}
    impl TemperatureService for Weather {
        async fn current_temp_c(&self, lat: f64, lon: f64) -> Option<i64>;
    }
}

mock! {
    pub Chat {}
    impl MessagingSink for Chat {
        async fn send(&self, subject: i64, text: &str, buttons: &[Button]) -> Result<MessageHandle, MessagingError>;
        async fn edit(&self, handle: &MessageHandle, text: &str, buttons: &[Button]) -> EditOutcome;
    }
}
