use super::value_objects::MediaId;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid quantity for media {0}: must be at least 1")]
    InvalidQuantity(MediaId),

    #[error("Invalid price for media {0}: must be positive")]
    InvalidPrice(MediaId),

    #[error("Order total overflows")]
    TotalOverflow,

    #[error("No stock snapshot loaded for media {0}")]
    MissingStockSnapshot(MediaId),

    #[error("Insufficient stock for media {media_id}: requested {requested}, on hand {available}")]
    InsufficientStock {
        media_id: MediaId,
        requested: u32,
        available: u32,
    },

    #[error("Order is not ready to commit: {0} not set")]
    Incomplete(&'static str),
}
