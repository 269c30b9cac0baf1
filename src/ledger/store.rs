use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::account::{Account, AccountNumber, LedgerError, Money};

// ============================================================================
// Account Store Port
// ============================================================================

/// New balance for one account, valid only if the stored version still matches
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange {
    pub account_number: AccountNumber,
    pub expected_version: i64,
    pub new_balance: Money,
}

/// Both balance changes plus the idempotency token, committed together or not at all
#[derive(Debug, Clone, PartialEq)]
pub struct TransferCommit {
    pub debit: BalanceChange,
    pub credit: BalanceChange,
    pub amount: Money,
    pub token: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    /// Another writer changed one of the accounts since it was loaded
    VersionConflict,
    /// The token was already committed by an earlier call
    AlreadyApplied,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn load(&self, account_number: AccountNumber) -> Result<Option<Account>, LedgerError>;

    async fn is_transfer_applied(&self, token: Uuid) -> Result<bool, LedgerError>;

    async fn commit_transfer(&self, commit: &TransferCommit) -> Result<CommitOutcome, LedgerError>;
}

// ============================================================================
// In-Memory Account Store
// ============================================================================

#[derive(Default)]
struct Accounts {
    by_number: HashMap<AccountNumber, Account>,
    applied_tokens: HashSet<Uuid>,
}

#[derive(Default)]
pub struct InMemoryAccountStore {
    state: Mutex<Accounts>,
}

impl InMemoryAccountStore {
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let by_number = accounts
            .into_iter()
            .map(|account| (account.account_number, account))
            .collect();

        Self {
            state: Mutex::new(Accounts {
                by_number,
                applied_tokens: HashSet::new(),
            }),
        }
    }

    pub async fn balance(&self, account_number: AccountNumber) -> Option<Money> {
        self.state
            .lock()
            .await
            .by_number
            .get(&account_number)
            .map(|account| account.balance)
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn load(&self, account_number: AccountNumber) -> Result<Option<Account>, LedgerError> {
        Ok(self.state.lock().await.by_number.get(&account_number).cloned())
    }

    async fn is_transfer_applied(&self, token: Uuid) -> Result<bool, LedgerError> {
        Ok(self.state.lock().await.applied_tokens.contains(&token))
    }

    async fn commit_transfer(&self, commit: &TransferCommit) -> Result<CommitOutcome, LedgerError> {
        let mut state = self.state.lock().await;

        if let Some(token) = commit.token {
            if state.applied_tokens.contains(&token) {
                return Ok(CommitOutcome::AlreadyApplied);
            }
        }

        for change in [&commit.debit, &commit.credit] {
            let current = state
                .by_number
                .get(&change.account_number)
                .ok_or(LedgerError::AccountNotFound(change.account_number))?;
            if current.version != change.expected_version {
                return Ok(CommitOutcome::VersionConflict);
            }
        }

        for change in [&commit.debit, &commit.credit] {
            if let Some(account) = state.by_number.get_mut(&change.account_number) {
                account.balance = change.new_balance;
                account.version += 1;
            }
        }
        if let Some(token) = commit.token {
            state.applied_tokens.insert(token);
        }

        Ok(CommitOutcome::Applied)
    }
}
