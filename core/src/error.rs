use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn trader_not_found(id: i64) -> Self {
        Self::NotFound { entity: "Trader", id }
    }

    pub fn transaction_not_found(id: i64) -> Self {
        Self::NotFound { entity: "Transaction", id }
    }

    /// An amount or balance that no longer fits in a `Decimal`.
    pub fn amount_too_large() -> Self {
        Self::Validation("Amount too large".into())
    }

    /// Stable name for the error category, used on the command boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_)      => "database",
            Self::Serialization(_) => "serialization",
            Self::NotFound { .. }  => "not_found",
            Self::Validation(_)    => "validation",
            Self::Other(_)         => "other",
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
