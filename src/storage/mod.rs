// ============================================================================
// Storage Adapters
// ============================================================================
//
// in_memory - OrderStore kept in process, one lock per commit
// scylla    - ScyllaDB-backed OrderStore and AccountStore, schema bootstrap
//
// ============================================================================

mod in_memory;
pub mod scylla;

pub use in_memory::InMemoryOrderStore;
pub use self::scylla::{ScyllaAccountStore, ScyllaOrderStore};
