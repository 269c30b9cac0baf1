// ============================================================================
// Account Ledger - Atomic two-account transfers
// ============================================================================
//
// account_ledger - withdraw/deposit with optimistic concurrency retry
// store          - AccountStore port and the in-memory implementation
//
// The ScyllaDB-backed store lives in crate::storage::scylla.
//
// ============================================================================

mod account_ledger;
mod store;

pub use account_ledger::{AccountLedger, TransferOutcome, MAX_COMMIT_ATTEMPTS};
pub use store::{AccountStore, BalanceChange, CommitOutcome, InMemoryAccountStore, TransferCommit};
