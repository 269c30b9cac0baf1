// ============================================================================
// Actors Module
// ============================================================================
//
// In-process entry point for order submission. The actor owns the
// coordinator; each SubmitOrder message runs one saga.
//
// ============================================================================

mod order_submission_actor;

pub use order_submission_actor::{OrderSubmissionActor, SubmitOrder};
