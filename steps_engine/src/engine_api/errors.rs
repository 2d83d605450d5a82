use thiserror::Error;

use crate::{db_types::Points, settlement::SettlementError};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Account not found: {0}")]
    NotFound(String),
    #[error("The account already exists: {0}")]
    AlreadyExists(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Account not found: {0}")]
    NotFound(String),
    #[error("Amounts must be positive, but {0} was given")]
    InvalidAmount(Points),
    #[error("Insufficient points. Required: {required}, available: {available}")]
    InsufficientBalance { required: Points, available: Points },
}

impl From<SettlementError> for LedgerError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::InvalidAmount(a) => Self::InvalidAmount(a),
            SettlementError::InsufficientBalance { required, available } => {
                Self::InsufficientBalance { required, available }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0} is not available for purchase")]
    Inactive(String),
    #[error("{0} is out of stock")]
    OutOfStock(String),
    #[error("This purchase can only be paid for by a family")]
    RequiresFamily,
    #[error("Insufficient points. Required: {required}, available: {available}")]
    InsufficientBalance { required: Points, available: Points },
    #[error("Invalid purchase: {0}")]
    InvalidPurchase(String),
}

impl From<LedgerError> for ShopError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DatabaseError(s) => Self::DatabaseError(s),
            LedgerError::NotFound(s) => Self::NotFound(s),
            LedgerError::InvalidAmount(a) => Self::InvalidPurchase(format!("price of {a}")),
            LedgerError::InsufficientBalance { required, available } => {
                Self::InsufficientBalance { required, available }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FamilyError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Family #{0} does not exist")]
    FamilyNotFound(i64),
    #[error("Invitation #{0} does not exist or has already been answered")]
    InvitationNotFound(i64),
    #[error("You are not a member of a family")]
    NotInFamily,
    #[error("{0} is already a member of a family")]
    AlreadyMember(String),
    #[error("The family already has the maximum of {0} members")]
    CapacityExceeded(usize),
    #[error("{0} already has a pending invitation to this family")]
    AlreadyInvited(String),
    #[error("The family name '{0}' is already taken")]
    NameTaken(String),
    #[error("Invalid family name: {0}")]
    InvalidName(String),
    #[error("Operation not permitted: {0}")]
    Forbidden(String),
}

impl From<LedgerError> for FamilyError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound(s) => Self::UserNotFound(s),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferralError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Users cannot refer themselves")]
    SelfReferral,
    #[error("User #{0} has already been referred")]
    AlreadyReferred(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("The daily step limit has been reached")]
    DailyLimitReached,
    #[error("Walks can only be started with a live location")]
    NotLiveLocation,
    #[error("That is not possible right now: {0}")]
    InvalidState(String),
    #[error("Could not record the walk. {0}")]
    Ledger(#[from] LedgerError),
}
