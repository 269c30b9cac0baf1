// ============================================================================
// Order Submission Saga
// ============================================================================
//
// coordinator - OrderSubmissionCoordinator, one sequential unit of work per order
// errors      - SubmissionError taxonomy and SubmissionFailure
// messages    - customer-facing notification text
//
// ============================================================================

pub mod coordinator;
pub mod errors;
pub mod messages;

pub use coordinator::{OrderSubmissionCoordinator, SagaSettings};
pub use errors::{SubmissionError, SubmissionFailure};
