use thiserror::Error;

use crate::{
    db_types::{Points, UserRef},
    engine_api::errors::{AccountApiError, FamilyError, LedgerError, ReferralError, ShopError},
    settlement::SettlementError,
};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Account not found: {0}")]
    AccountNotFound(UserRef),
    #[error("Family not found: {0}")]
    FamilyNotFound(i64),
    #[error("Amounts must be positive, but {0} was given")]
    InvalidAmount(Points),
    #[error("Insufficient points. Required: {required}, available: {available}")]
    InsufficientBalance { required: Points, available: Points },
    #[error("Ledger invariant violated: {0}")]
    LedgerInvariant(String),
}

impl From<SettlementError> for SqliteDatabaseError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::InvalidAmount(a) => Self::InvalidAmount(a),
            SettlementError::InsufficientBalance { required, available } => {
                Self::InsufficientBalance { required, available }
            },
        }
    }
}

impl From<SqliteDatabaseError> for AccountApiError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::AccountNotFound(u) => Self::NotFound(u.to_string()),
            SqliteDatabaseError::FamilyNotFound(id) => Self::NotFound(format!("family #{id}")),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<SqliteDatabaseError> for LedgerError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::AccountNotFound(u) => Self::NotFound(u.to_string()),
            SqliteDatabaseError::FamilyNotFound(id) => Self::NotFound(format!("family #{id}")),
            SqliteDatabaseError::InvalidAmount(a) => Self::InvalidAmount(a),
            SqliteDatabaseError::InsufficientBalance { required, available } => {
                Self::InsufficientBalance { required, available }
            },
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<SqliteDatabaseError> for ShopError {
    fn from(e: SqliteDatabaseError) -> Self {
        LedgerError::from(e).into()
    }
}

impl From<SqliteDatabaseError> for FamilyError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::AccountNotFound(u) => Self::UserNotFound(u.to_string()),
            SqliteDatabaseError::FamilyNotFound(id) => Self::FamilyNotFound(id),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<SqliteDatabaseError> for ReferralError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::AccountNotFound(u) => Self::UserNotFound(u.to_string()),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for ShopError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<sqlx::Error> for FamilyError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<sqlx::Error> for ReferralError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
