// ============================================================================
// ScyllaDB Adapters
// ============================================================================
//
// Tables (see schema.rs):
//   stocks       - one row per media, quantity_on_hand
//   orders       - one row per order, `pending` until its stock updates
//                  land, then `committed`; items, delivery and the
//                  pending stock updates stored as JSON
//   bank_ledger  - accounts and applied transfer tokens in a single
//                  partition, so a transfer is one conditional batch
//
// Stock rows and account balances change through lightweight transactions
// (IF ...) so concurrent writers cannot overwrite each other.
//
// ============================================================================

mod account_store;
mod lwt;
mod order_store;
pub mod schema;

pub use account_store::ScyllaAccountStore;
pub use order_store::ScyllaOrderStore;
