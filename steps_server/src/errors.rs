use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use steps_engine::{AccountApiError, FamilyError, LedgerError, ReferralError, ShopError, WalkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("A valid API key is required")]
    Unauthorized,
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    /// A business rule refused the request. The message is shown to the walker as is.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Conflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AccountApiError::NotFound(s) => Self::NoRecordFound(s),
            AccountApiError::AlreadyExists(s) => Self::Conflict(format!("{s} already exists")),
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            LedgerError::NotFound(s) => Self::NoRecordFound(s),
            LedgerError::InvalidAmount(_) => Self::InvalidRequestBody(e.to_string()),
            LedgerError::InsufficientBalance { .. } => Self::Rejected("Insufficient points".into()),
        }
    }
}

impl From<ShopError> for ServerError {
    fn from(e: ShopError) -> Self {
        match e {
            ShopError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            ShopError::NotFound(s) => Self::NoRecordFound(s),
            ShopError::Inactive(_) => Self::Rejected(e.to_string()),
            ShopError::OutOfStock(_) => Self::Conflict("Out of stock".into()),
            ShopError::RequiresFamily => Self::Rejected("A family is required".into()),
            ShopError::InsufficientBalance { .. } => Self::Rejected("Insufficient points".into()),
            ShopError::InvalidPurchase(_) => Self::Rejected(e.to_string()),
        }
    }
}

impl From<FamilyError> for ServerError {
    fn from(e: FamilyError) -> Self {
        match e {
            FamilyError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            FamilyError::UserNotFound(_) | FamilyError::FamilyNotFound(_) | FamilyError::InvitationNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            FamilyError::Forbidden(_) => Self::InsufficientPermissions(e.to_string()),
            FamilyError::NameTaken(_) | FamilyError::AlreadyInvited(_) | FamilyError::AlreadyMember(_) => {
                Self::Conflict(e.to_string())
            },
            FamilyError::NotInFamily | FamilyError::CapacityExceeded(_) | FamilyError::InvalidName(_) => {
                Self::Rejected(e.to_string())
            },
        }
    }
}

impl From<ReferralError> for ServerError {
    fn from(e: ReferralError) -> Self {
        match e {
            ReferralError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            ReferralError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            ReferralError::SelfReferral => Self::Rejected(e.to_string()),
            ReferralError::AlreadyReferred(_) => Self::Conflict(e.to_string()),
        }
    }
}

impl From<WalkError> for ServerError {
    fn from(e: WalkError) -> Self {
        match e {
            WalkError::DailyLimitReached | WalkError::NotLiveLocation => Self::Rejected(e.to_string()),
            WalkError::InvalidState(_) => Self::Conflict(e.to_string()),
            WalkError::Ledger(e) => e.into(),
        }
    }
}
