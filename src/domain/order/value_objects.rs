use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::account::Money;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Order identity, also the idempotency token of every downstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber(pub Uuid);

impl OrderNumber {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MediaId(pub Uuid);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub title: String,
    pub price: Money,
}

/// Inventory level of one media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub media_id: MediaId,
    pub quantity_on_hand: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub media: Media,
    pub quantity: u32,
    /// Loaded at submission time, before any decrement
    pub stock_snapshot: Option<Stock>,
}

impl OrderItem {
    pub fn new(media: Media, quantity: u32) -> Self {
        Self {
            media,
            quantity,
            stock_snapshot: None,
        }
    }
}

/// Identifier assigned by the delivery service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(pub Uuid);

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The order service only ever records a delivery as submitted; later
/// transitions belong to the delivery service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Submitted,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Submitted => "Submitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub external_id: DeliveryId,
    pub status: DeliveryStatus,
    pub source_address: String,
    pub destination_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_status_matches_stored_json() {
        let stored = serde_json::to_string(&DeliveryStatus::Submitted).unwrap();
        assert_eq!(stored, format!("\"{}\"", DeliveryStatus::Submitted.as_str()));
    }
}
