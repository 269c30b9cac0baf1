// ============================================================================
// Order Domain - The Order aggregate and what gets persisted from it
// ============================================================================
//
// - Value objects (OrderNumber, Media, Stock, OrderItem, Delivery)
// - Errors (OrderError)
// - Aggregate (Order: totals, stock decrements, delivery attachment)
// - Commit (OrderCommit: new rows vs. existing references)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;
pub mod commit;

pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
pub use commit::*;
