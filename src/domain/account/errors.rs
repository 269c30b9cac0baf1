use super::value_objects::{AccountNumber, Money};

// ============================================================================
// Ledger Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Transfer amount must be positive, got {0}")]
    InvalidAmount(Money),

    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(AccountNumber),

    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountNumber,
        balance: Money,
        requested: Money,
    },

    #[error("Balance of account {0} would overflow")]
    BalanceOverflow(AccountNumber),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("Transfer gave up after {0} concurrent modification conflicts")]
    ConcurrencyConflict(u32),

    #[error("Account storage error: {0}")]
    Storage(String),
}
