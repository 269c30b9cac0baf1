// ============================================================================
// Notification Channels
// ============================================================================
//
// redpanda    - publishes customer emails to a topic consumed by the mailer
// log_channel - writes the message to the log only (local runs, tests)
//
// ============================================================================

mod log_channel;
mod redpanda;

pub use log_channel::LogNotificationChannel;
pub use redpanda::RedpandaNotificationChannel;
