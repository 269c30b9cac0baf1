// ============================================================================
// Customer Domain - Read-mostly reference data consumed by order submission
// ============================================================================

pub mod value_objects;

pub use value_objects::*;
