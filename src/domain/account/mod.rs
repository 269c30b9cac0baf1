// ============================================================================
// Account Domain - Bank accounts and the withdraw/deposit invariant
// ============================================================================
//
// - Value objects (AccountNumber, Money)
// - Errors (LedgerError)
// - Aggregate (Account with withdraw/deposit)
//
// Persistence and locking live in crate::ledger.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;

pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
