use crate::domain::account::AccountNumber;
use crate::utils::IsTransient;

// ============================================================================
// Port Errors
// ============================================================================
//
// Each port separates "definitely rejected" from "outcome unknown". Only the
// latter is transient.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FundsTransferError {
    #[error("insufficient funds in account {0}")]
    InsufficientFunds(AccountNumber),

    #[error("account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("transfer rejected: {0}")]
    Rejected(String),

    #[error("funds transfer service unavailable: {0}")]
    Unavailable(String),
}

impl IsTransient for FundsTransferError {
    fn is_transient(&self) -> bool {
        matches!(self, FundsTransferError::Unavailable(_))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery address invalid: {0}")]
    AddressInvalid(String),

    #[error("delivery rejected: {0}")]
    Rejected(String),

    #[error("delivery service unavailable: {0}")]
    Unavailable(String),
}

impl IsTransient for DeliveryError {
    fn is_transient(&self) -> bool {
        matches!(self, DeliveryError::Unavailable(_))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("persistence conflict: {0}")]
    Conflict(String),

    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

impl IsTransient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
