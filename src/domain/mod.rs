// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with value objects, errors and
// the aggregate implementation. No I/O happens in this layer.
//
// ============================================================================

pub mod account;
pub mod customer;
pub mod order;
