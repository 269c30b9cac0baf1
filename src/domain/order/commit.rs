use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::Money;
use super::aggregate::{Order, StockUpdate};
use super::errors::OrderError;
use super::value_objects::{DeliveryId, DeliveryStatus, MediaId, OrderNumber};

// ============================================================================
// Order Commit - what a submission hands to the OrderStore
// ============================================================================
//
// Rows in `order`, `items`, `delivery` and `stock_updates` are written by
// the commit. Everything in `references` already exists and must not be
// inserted or modified.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCommit {
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
    pub delivery: DeliveryRow,
    pub stock_updates: Vec<StockUpdate>,
    pub references: ExistingReferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub order_number: OrderNumber,
    pub customer_id: Uuid,
    pub total: Money,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemRow {
    pub media_id: MediaId,
    pub quantity: u32,
    pub unit_price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRow {
    pub external_id: DeliveryId,
    pub status: DeliveryStatus,
    pub source_address: String,
    pub destination_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingReferences {
    pub customer_id: Uuid,
    pub login_credential_id: Uuid,
    pub media_ids: Vec<MediaId>,
}

impl OrderCommit {
    pub fn order_number(&self) -> OrderNumber {
        self.order.order_number
    }
}

impl Order {
    /// Split the submitted order into new rows and existing references
    pub fn to_commit(&self, stock_updates: Vec<StockUpdate>) -> Result<OrderCommit, OrderError> {
        let order_number = self.order_number.ok_or(OrderError::Incomplete("order number"))?;
        let total = self.total.ok_or(OrderError::Incomplete("total"))?;
        let delivery = self.delivery.as_ref().ok_or(OrderError::Incomplete("delivery"))?;

        Ok(OrderCommit {
            order: OrderRow {
                order_number,
                customer_id: self.customer.id,
                total,
                placed_at: Utc::now(),
            },
            items: self
                .items
                .iter()
                .map(|item| OrderItemRow {
                    media_id: item.media.id,
                    quantity: item.quantity,
                    unit_price: item.media.price,
                })
                .collect(),
            delivery: DeliveryRow {
                external_id: delivery.external_id,
                status: delivery.status,
                source_address: delivery.source_address.clone(),
                destination_address: delivery.destination_address.clone(),
            },
            stock_updates,
            references: ExistingReferences {
                customer_id: self.customer.id,
                login_credential_id: self.customer.login_credential.id,
                media_ids: self.media_ids(),
            },
        })
    }
}
