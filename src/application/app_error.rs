use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("No shop linked to payment customer {0}")]
    UnknownCustomer(String),

    #[error("Subscription blocked")]
    SubscriptionBlocked,

    #[error("Record was modified concurrently")]
    Conflict,

    #[error("Not found")]
    NotFound,

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether repeating the same operation may succeed.
    ///
    /// Webhook handlers answer 5xx for these so the provider redelivers,
    /// and 2xx/4xx for everything else.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Database(_) => true,
            AppError::Conflict => true,
            AppError::Provider(_) => true,
            AppError::Internal(_) => true,

            AppError::Unauthorized => false,
            AppError::InvalidInput(_) => false,
            AppError::InvalidDate(_) => false,
            AppError::UnknownCustomer(_) => false,
            AppError::SubscriptionBlocked => false,
            AppError::NotFound => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    Unauthorized,
    InvalidInput,
    InvalidDate,
    UnknownCustomer,
    SubscriptionBlocked,
    Conflict,
    NotFound,
    ProviderError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidDate => "INVALID_DATE",
            ErrorCode::UnknownCustomer => "UNKNOWN_CUSTOMER",
            ErrorCode::SubscriptionBlocked => "SUBSCRIPTION_BLOCKED",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ProviderError => "PROVIDER_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
