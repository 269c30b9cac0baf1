use async_trait::async_trait;
use scylla::client::session::Session;
use scylla::statement::batch::Batch;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::account::{Account, AccountNumber, LedgerError, Money};
use crate::ledger::{AccountStore, CommitOutcome, TransferCommit};
use super::lwt::was_applied;
use super::schema::{account_key, transfer_key, BANK_PARTITION};

const UPDATE_BALANCE: &str = "UPDATE bank_ledger SET balance_minor = ?, version = ? \
     WHERE bank = ? AND entry_key = ? IF version = ?";
const INSERT_TOKEN: &str = "INSERT INTO bank_ledger (bank, entry_key, balance_minor, version) \
     VALUES (?, ?, ?, 0) IF NOT EXISTS";

/// AccountStore on the `bank_ledger` table. Both balance updates and the
/// token row share one partition, so the conditional batch is atomic.
pub struct ScyllaAccountStore {
    session: Arc<Session>,
}

impl ScyllaAccountStore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

fn storage_error(error: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(error.to_string())
}

#[async_trait]
impl AccountStore for ScyllaAccountStore {
    async fn load(&self, account_number: AccountNumber) -> Result<Option<Account>, LedgerError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT balance_minor, version FROM bank_ledger WHERE bank = ? AND entry_key = ?",
                (BANK_PARTITION, account_key(account_number.0)),
            )
            .await
            .map_err(storage_error)?;

        let row = result
            .into_rows_result()
            .map_err(storage_error)?
            .maybe_first_row::<(i64, i64)>()
            .map_err(storage_error)?;

        Ok(row.map(|(balance, version)| Account {
            account_number,
            balance: Money::from_minor(balance),
            version,
        }))
    }

    async fn is_transfer_applied(&self, token: Uuid) -> Result<bool, LedgerError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT version FROM bank_ledger WHERE bank = ? AND entry_key = ?",
                (BANK_PARTITION, transfer_key(token)),
            )
            .await
            .map_err(storage_error)?;

        let row = result
            .into_rows_result()
            .map_err(storage_error)?
            .maybe_first_row::<(i64,)>()
            .map_err(storage_error)?;

        Ok(row.is_some())
    }

    async fn commit_transfer(&self, commit: &TransferCommit) -> Result<CommitOutcome, LedgerError> {
        let debit = (
            commit.debit.new_balance.minor(),
            commit.debit.expected_version + 1,
            BANK_PARTITION,
            account_key(commit.debit.account_number.0),
            commit.debit.expected_version,
        );
        let credit = (
            commit.credit.new_balance.minor(),
            commit.credit.expected_version + 1,
            BANK_PARTITION,
            account_key(commit.credit.account_number.0),
            commit.credit.expected_version,
        );

        let mut batch = Batch::default();
        batch.append_statement(UPDATE_BALANCE);
        batch.append_statement(UPDATE_BALANCE);

        let result = match commit.token {
            Some(token) => {
                batch.append_statement(INSERT_TOKEN);
                let token_row = (BANK_PARTITION, transfer_key(token), commit.amount.minor());
                self.session.batch(&batch, (debit, credit, token_row)).await
            }
            None => self.session.batch(&batch, (debit, credit)).await,
        }
        .map_err(storage_error)?;

        if was_applied(result).map_err(storage_error)? {
            return Ok(CommitOutcome::Applied);
        }

        match commit.token {
            Some(token) if self.is_transfer_applied(token).await? => Ok(CommitOutcome::AlreadyApplied),
            _ => Ok(CommitOutcome::VersionConflict),
        }
    }
}
