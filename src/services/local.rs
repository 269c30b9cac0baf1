use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::account::LedgerError;
use crate::ledger::{AccountLedger, TransferOutcome};
use super::{FundsTransferError, FundsTransferService, TransferRequest};

// ============================================================================
// In-Process Funds Transfer
// ============================================================================
//
// Used when the bank ledger runs next to the order service instead of
// behind BANK_ENDPOINT. The order number is passed down as the ledger's
// idempotency token.
//
// ============================================================================

pub struct LocalFundsTransfer {
    ledger: Arc<AccountLedger>,
}

impl LocalFundsTransfer {
    pub fn new(ledger: Arc<AccountLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl FundsTransferService for LocalFundsTransfer {
    async fn transfer(&self, request: TransferRequest) -> Result<(), FundsTransferError> {
        let outcome = self
            .ledger
            .transfer(
                request.amount,
                request.from_account,
                request.to_account,
                Some(request.idempotency_token.as_uuid()),
            )
            .await
            .map_err(map_ledger_error)?;

        if outcome == TransferOutcome::Duplicate {
            tracing::info!(
                order_number = %request.idempotency_token,
                "Funds already transferred for this order"
            );
        }
        Ok(())
    }
}

fn map_ledger_error(error: LedgerError) -> FundsTransferError {
    match error {
        LedgerError::InsufficientFunds { account, .. } => FundsTransferError::InsufficientFunds(account),
        LedgerError::AccountNotFound(account) => FundsTransferError::AccountNotFound(account),
        LedgerError::InvalidAmount(_)
        | LedgerError::SameAccount(_)
        | LedgerError::BalanceOverflow(_) => FundsTransferError::Rejected(error.to_string()),
        LedgerError::ConcurrencyConflict(_) | LedgerError::Storage(_) => {
            FundsTransferError::Unavailable(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, AccountNumber, Money};
    use crate::domain::order::OrderNumber;
    use crate::ledger::InMemoryAccountStore;

    #[tokio::test]
    async fn test_maps_insufficient_funds() {
        let store = Arc::new(InMemoryAccountStore::with_accounts([
            Account::new(AccountNumber(123), Money::ZERO),
            Account::new(AccountNumber(456), Money::from_major(5)),
        ]));
        let service = LocalFundsTransfer::new(Arc::new(AccountLedger::new(store)));

        let result = service
            .transfer(TransferRequest {
                amount: Money::from_major(15),
                from_account: AccountNumber(456),
                to_account: AccountNumber(123),
                idempotency_token: OrderNumber::generate(),
            })
            .await;

        assert_eq!(result, Err(FundsTransferError::InsufficientFunds(AccountNumber(456))));
    }

    #[test]
    fn test_storage_errors_are_transient() {
        use crate::utils::IsTransient;

        assert!(map_ledger_error(LedgerError::Storage("timeout".into())).is_transient());
        assert!(!map_ledger_error(LedgerError::AccountNotFound(AccountNumber(1))).is_transient());
    }
}
