use std::sync::Arc;
use uuid::Uuid;

use crate::domain::account::{Account, AccountNumber, LedgerError, Money};
use super::store::{AccountStore, BalanceChange, CommitOutcome, TransferCommit};

// ============================================================================
// Account Ledger
// ============================================================================
//
// Load both accounts → withdraw/deposit on copies → compare-and-swap commit.
// A version conflict means a concurrent transfer committed in between, so
// the whole read-modify-write is redone against fresh balances.
//
// ============================================================================

/// Upper bound on read-modify-write rounds per transfer
pub const MAX_COMMIT_ATTEMPTS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred,
    /// The idempotency token was already committed; no money moved
    Duplicate,
}

pub struct AccountLedger {
    store: Arc<dyn AccountStore>,
}

impl AccountLedger {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn transfer(
        &self,
        amount: Money,
        from: AccountNumber,
        to: AccountNumber,
        idempotency_token: Option<Uuid>,
    ) -> Result<TransferOutcome, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if from == to {
            return Err(LedgerError::SameAccount(from));
        }

        if let Some(token) = idempotency_token {
            if self.store.is_transfer_applied(token).await? {
                tracing::info!(%token, from = %from, to = %to, "Duplicate transfer ignored");
                return Ok(TransferOutcome::Duplicate);
            }
        }

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let from_account = self.load(from).await?;
            let to_account = self.load(to).await?;

            let commit = Self::prepare(amount, &from_account, &to_account, idempotency_token)?;

            match self.store.commit_transfer(&commit).await? {
                CommitOutcome::Applied => {
                    tracing::info!(
                        amount = %amount,
                        from = %from,
                        to = %to,
                        attempt,
                        "Transfer committed"
                    );
                    return Ok(TransferOutcome::Transferred);
                }
                CommitOutcome::AlreadyApplied => {
                    tracing::info!(from = %from, to = %to, "Transfer committed by a concurrent duplicate");
                    return Ok(TransferOutcome::Duplicate);
                }
                CommitOutcome::VersionConflict => {
                    tracing::debug!(from = %from, to = %to, attempt, "Balance changed concurrently, retrying");
                }
            }
        }

        Err(LedgerError::ConcurrencyConflict(MAX_COMMIT_ATTEMPTS))
    }

    async fn load(&self, account_number: AccountNumber) -> Result<Account, LedgerError> {
        self.store
            .load(account_number)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_number))
    }

    fn prepare(
        amount: Money,
        from_account: &Account,
        to_account: &Account,
        token: Option<Uuid>,
    ) -> Result<TransferCommit, LedgerError> {
        let mut debited = from_account.clone();
        let mut credited = to_account.clone();
        debited.withdraw(amount)?;
        credited.deposit(amount)?;

        Ok(TransferCommit {
            debit: BalanceChange {
                account_number: debited.account_number,
                expected_version: from_account.version,
                new_balance: debited.balance,
            },
            credit: BalanceChange {
                account_number: credited.account_number,
                expected_version: to_account.version,
                new_balance: credited.balance,
            },
            amount,
            token,
        })
    }
}
