use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
pub use steps_common::Points;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------        UserRef        ---------------------------------------------------------
/// Individuals can be addressed by either of two equivalent keys: the internal primary key or their Telegram id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRef {
    Id(i64),
    Telegram(i64),
}

impl Display for UserRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRef::Id(id) => write!(f, "user #{id}"),
            UserRef::Telegram(tg) => write!(f, "telegram user {tg}"),
        }
    }
}

//--------------------------------------      UserAccount      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub balance: Points,
    pub step_count: i64,
    pub family_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn is_family_member(&self) -> bool {
        self.family_id.is_some()
    }

    /// `@username` if the user has one, otherwise their id.
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) => format!("@{name}"),
            None => format!("user #{}", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub telegram_id: i64,
    pub username: Option<String>,
}

impl NewUser {
    pub fn new(telegram_id: i64) -> Self {
        Self { telegram_id, username: None }
    }

    pub fn with_username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }
}

//--------------------------------------         Family        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub balance: Points,
    pub step_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A family together with its members, ordered by user id ascending. This ordering is the enumeration order used by
/// proportional settlement, so the last member in `members` is the one that absorbs rounding remainders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyAccount {
    pub family: Family,
    pub members: Vec<UserAccount>,
}

impl FamilyAccount {
    pub fn members_total(&self) -> Points {
        self.members.iter().map(|m| m.balance).sum()
    }

    /// Pool balance plus every member's personal balance.
    pub fn total_available(&self) -> Points {
        self.family.balance + self.members_total()
    }

    /// The owner of a family is its longest-standing member, i.e. the one with the lowest user id.
    pub fn owner_id(&self) -> Option<i64> {
        self.members.iter().map(|m| m.id).min()
    }
}

//--------------------------------------    Owner / Account    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    User,
    Family,
}

impl Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerKind::User => write!(f, "user"),
            OwnerKind::Family => write!(f, "family"),
        }
    }
}

/// The identity of the account a balance or ledger entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Owner {
    User(i64),
    Family(i64),
}

impl Owner {
    pub fn kind(&self) -> OwnerKind {
        match self {
            Owner::User(_) => OwnerKind::User,
            Owner::Family(_) => OwnerKind::Family,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Owner::User(id) | Owner::Family(id) => *id,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Owner::User(id) => Some(*id),
            Owner::Family(_) => None,
        }
    }

    pub fn family_id(&self) -> Option<i64> {
        match self {
            Owner::User(_) => None,
            Owner::Family(id) => Some(*id),
        }
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.kind(), self.id())
    }
}

/// The account that pays for, or is credited by, an individual's actions. Family members always transact through
/// their family; everyone else transacts on their own balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Account {
    Individual(UserAccount),
    Group(FamilyAccount),
}

impl Account {
    pub fn owner(&self) -> Owner {
        match self {
            Account::Individual(u) => Owner::User(u.id),
            Account::Group(f) => Owner::Family(f.family.id),
        }
    }

    /// The number of points this account can spend.
    pub fn available(&self) -> Points {
        match self {
            Account::Individual(u) => u.balance,
            Account::Group(f) => f.total_available(),
        }
    }
}

//--------------------------------------     OperationType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Points earned from walking.
    StepsAccrual,
    /// Points spent in the shop.
    Purchase,
    /// Points granted by a promotion or referral reward.
    PromoAccrual,
    /// Points returned after a cancelled purchase.
    Refund,
    /// Manual correction by an administrator.
    ManualAdjust,
    /// Points moved between an individual and their family.
    Transfer,
}

impl OperationType {
    /// Whether an entry of this type counts towards an individual's contribution total.
    pub fn is_contribution(&self) -> bool {
        matches!(self, Self::StepsAccrual | Self::PromoAccrual)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StepsAccrual => "steps_accrual",
            Self::Purchase => "purchase",
            Self::PromoAccrual => "promo_accrual",
            Self::Refund => "refund",
            Self::ManualAdjust => "manual_adjust",
            Self::Transfer => "transfer",
        }
    }
}

impl Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steps_accrual" => Ok(Self::StepsAccrual),
            "purchase" => Ok(Self::Purchase),
            "promo_accrual" => Ok(Self::PromoAccrual),
            "refund" => Ok(Self::Refund),
            "manual_adjust" => Ok(Self::ManualAdjust),
            "transfer" => Ok(Self::Transfer),
            s => Err(ConversionError(format!("Invalid operation type: {s}"))),
        }
    }
}

//--------------------------------------      LedgerEntry      ---------------------------------------------------------
/// An immutable journal record. `balance_after` is the owner's balance immediately after the movement. It is `None`
/// for attribution entries, which record a contribution without moving the owner's balance (e.g. a family member's
/// share of an accrual that was credited to the family pool).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub owner_type: OwnerKind,
    pub user_id: Option<i64>,
    pub family_id: Option<i64>,
    pub operation: OperationType,
    pub amount: Points,
    pub balance_after: Option<Points>,
    pub order_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn owner(&self) -> Option<Owner> {
        match self.owner_type {
            OwnerKind::User => self.user_id.map(Owner::User),
            OwnerKind::Family => self.family_id.map(Owner::Family),
        }
    }

    /// True if this entry moved the owner's balance.
    pub fn is_effective(&self) -> bool {
        self.balance_after.is_some()
    }
}

/// Free-text metadata attached to the ledger entries written by a single operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMemo {
    pub title: String,
    pub description: Option<String>,
    pub order_id: Option<i64>,
}

impl EntryMemo {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self { title: title.into(), description: None, order_id: None }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_order(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }
}

//--------------------------------------        WalkForm       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WalkForm {
    Solo,
    Stroller,
    Dog,
    StrollerDog,
}

impl Display for WalkForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkForm::Solo => write!(f, "solo"),
            WalkForm::Stroller => write!(f, "stroller"),
            WalkForm::Dog => write!(f, "dog"),
            WalkForm::StrollerDog => write!(f, "stroller_dog"),
        }
    }
}

impl FromStr for WalkForm {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solo" => Ok(Self::Solo),
            "stroller" => Ok(Self::Stroller),
            "dog" => Ok(Self::Dog),
            "stroller_dog" => Ok(Self::StrollerDog),
            s => Err(ConversionError(format!("Invalid walk form: {s}"))),
        }
    }
}

//--------------------------------------       Promo codes     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PromoGroup {
    pub id: i64,
    pub name: String,
    pub discount_percent: i64,
    pub price: Points,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: i64,
    pub group_id: i64,
    pub code: String,
    pub max_uses: i64,
    pub used_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     Catalog / Orders  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub price: Points,
    pub is_active: bool,
    pub product_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Paid,
    Shipped,
    Delivered,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::New => write!(f, "new"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Delivered => write!(f, "delivered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_price: Points,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        Families       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct FamilyInvitation {
    pub id: i64,
    pub family_id: i64,
    pub inviter_id: i64,
    pub invitee_id: i64,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

//--------------------------------------        Referrals      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Referral {
    pub id: i64,
    pub user_id: i64,
    pub inviter_id: i64,
    pub reward_points: Points,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      Coefficients     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TemperatureCoefficient {
    pub id: i64,
    pub walk_form: WalkForm,
    pub min_temp_c: i64,
    pub max_temp_c: i64,
    pub coefficient: i64,
}
