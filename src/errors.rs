//! Domain error types for the Rollhouse casino service.
//!
//! One flat taxonomy shared by the RNG, the outcome engine and the ledger.
//! HTTP status mapping lives in `api::errors`; nothing in here knows about
//! transport concerns.

use thiserror::Error;

/// Root error type for all casino operations.
#[derive(Debug, Error)]
pub enum CasinoError {
    /// Malformed or missing input. No state was mutated.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Player selection outside the rules of the game (keno picks, etc.).
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Balance does not cover the bet. No state was mutated.
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Unknown or inactive game slug.
    #[error("Unsupported game: {0}")]
    UnsupportedGame(String),

    /// Compare-and-swap on the account balance lost a race. Retryable,
    /// no net mutation.
    #[error("Concurrent balance modification for account {0}")]
    ConcurrentModification(String),

    /// The OS entropy source failed. Fatal to the wager; there is no
    /// fallback generator.
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// The bet was debited but settlement could not complete. The wager
    /// record is left in a non-terminal state for reconciliation.
    #[error("Partial settlement fault for wager {wager_id}: {detail}")]
    PartialSettlement { wager_id: String, detail: String },

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CasinoError {
    /// True when the operation is safe to retry verbatim.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CasinoError::ConcurrentModification(_))
    }

    /// True when the error guarantees no balance was mutated.
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            CasinoError::InvalidRequest(_)
                | CasinoError::InvalidSelection(_)
                | CasinoError::InsufficientFunds
                | CasinoError::UnsupportedGame(_)
                | CasinoError::ConcurrentModification(_)
                | CasinoError::UserNotFound(_)
        )
    }
}

impl From<rocksdb::Error> for CasinoError {
    fn from(e: rocksdb::Error) -> Self {
        CasinoError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CasinoError {
    fn from(e: serde_json::Error) -> Self {
        CasinoError::Storage(format!("row encoding: {}", e))
    }
}

/// Convenience alias used throughout the crate.
pub type CasinoResult<T> = Result<T, CasinoError>;
