use crate::domain::account::AccountNumber;
use crate::domain::order::{MediaId, OrderError, OrderNumber};
use crate::services::{DeliveryError, FundsTransferError, StoreError};
use crate::utils::IsTransient;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("insufficient funds in account {0}")]
    InsufficientFunds(AccountNumber),

    #[error("insufficient stock for media {media_id}: requested {requested}, available {available}")]
    InsufficientStock {
        media_id: MediaId,
        requested: u32,
        available: u32,
    },

    #[error("account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("payment was rejected: {0}")]
    FundsTransferRejected(String),

    #[error("payment service unavailable: {0}")]
    FundsTransferUnavailable(String),

    #[error("delivery was rejected: {0}")]
    DeliveryRejected(String),

    #[error("delivery service unavailable: {0}")]
    DeliveryUnavailable(String),

    #[error("order could not be saved: {0}")]
    PersistenceConflict(String),

    #[error("order storage unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

impl SubmissionError {
    /// Stable name used as a metrics label
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionError::InsufficientFunds(_) => "insufficient_funds",
            SubmissionError::InsufficientStock { .. } => "insufficient_stock",
            SubmissionError::AccountNotFound(_) => "account_not_found",
            SubmissionError::FundsTransferRejected(_) => "funds_transfer_rejected",
            SubmissionError::FundsTransferUnavailable(_) => "funds_transfer_unavailable",
            SubmissionError::DeliveryRejected(_) => "delivery_rejected",
            SubmissionError::DeliveryUnavailable(_) => "delivery_unavailable",
            SubmissionError::PersistenceConflict(_) => "persistence_conflict",
            SubmissionError::PersistenceUnavailable(_) => "persistence_unavailable",
            SubmissionError::InvalidOrder(_) => "invalid_order",
        }
    }
}

impl IsTransient for SubmissionError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            SubmissionError::FundsTransferUnavailable(_)
                | SubmissionError::DeliveryUnavailable(_)
                | SubmissionError::PersistenceUnavailable(_)
        )
    }
}

impl From<FundsTransferError> for SubmissionError {
    fn from(error: FundsTransferError) -> Self {
        match error {
            FundsTransferError::InsufficientFunds(account) => SubmissionError::InsufficientFunds(account),
            FundsTransferError::AccountNotFound(account) => SubmissionError::AccountNotFound(account),
            FundsTransferError::Rejected(reason) => SubmissionError::FundsTransferRejected(reason),
            FundsTransferError::Unavailable(reason) => SubmissionError::FundsTransferUnavailable(reason),
        }
    }
}

impl From<DeliveryError> for SubmissionError {
    fn from(error: DeliveryError) -> Self {
        match error {
            DeliveryError::AddressInvalid(reason) => {
                SubmissionError::DeliveryRejected(format!("address invalid: {}", reason))
            }
            DeliveryError::Rejected(reason) => SubmissionError::DeliveryRejected(reason),
            DeliveryError::Unavailable(reason) => SubmissionError::DeliveryUnavailable(reason),
        }
    }
}

impl From<StoreError> for SubmissionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(reason) => SubmissionError::PersistenceConflict(reason),
            StoreError::Unavailable(reason) => SubmissionError::PersistenceUnavailable(reason),
        }
    }
}

impl From<OrderError> for SubmissionError {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::InsufficientStock {
                media_id,
                requested,
                available,
            } => SubmissionError::InsufficientStock {
                media_id,
                requested,
                available,
            },
            other => SubmissionError::InvalidOrder(other.to_string()),
        }
    }
}

/// A failed submission as seen by the caller
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("order {order_number} failed: {error}")]
pub struct SubmissionFailure {
    pub order_number: OrderNumber,
    pub error: SubmissionError,
    /// The funds transfer had already committed and was not reversed
    pub funds_captured: bool,
}

impl IsTransient for SubmissionFailure {
    fn is_transient(&self) -> bool {
        self.error.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_port_errors_keep_transient_kind() {
        let unavailable: SubmissionError = DeliveryError::Unavailable("timeout".into()).into();
        assert!(unavailable.is_transient());

        let conflict: SubmissionError = StoreError::Conflict("stock changed".into()).into();
        assert!(!conflict.is_transient());

        let funds: SubmissionError = FundsTransferError::InsufficientFunds(AccountNumber(456)).into();
        assert_eq!(funds, SubmissionError::InsufficientFunds(AccountNumber(456)));
        assert!(!funds.is_transient());
    }

    #[test]
    fn test_address_invalid_is_delivery_rejection() {
        let error: SubmissionError = DeliveryError::AddressInvalid("no street".into()).into();
        assert_eq!(error.label(), "delivery_rejected");
        assert_eq!(error.to_string(), "delivery was rejected: address invalid: no street");
    }

    #[test]
    fn test_order_errors() {
        let media_id = MediaId(Uuid::new_v4());
        let stock: SubmissionError = OrderError::InsufficientStock {
            media_id,
            requested: 3,
            available: 1,
        }
        .into();
        assert_eq!(stock.label(), "insufficient_stock");

        let empty: SubmissionError = OrderError::EmptyItems.into();
        assert_eq!(empty.label(), "invalid_order");
    }
}
