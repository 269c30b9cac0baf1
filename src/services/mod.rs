// ============================================================================
// Service Ports - Collaborators of the order submission saga
// ============================================================================
//
// Traits the coordinator depends on. Implementations are injected by the
// process entry point:
//
// - FundsTransferService  - grpc::GrpcFundsTransferClient, local::LocalFundsTransfer
// - DeliveryService       - grpc::GrpcDeliveryClient
// - OrderStore            - storage::{InMemoryOrderStore, ScyllaOrderStore}
// - NotificationChannel   - messaging::{RedpandaNotificationChannel, LogNotificationChannel}
//
// ============================================================================

pub mod errors;
pub mod grpc;
pub mod local;

pub use errors::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::account::{AccountNumber, Money};
use crate::domain::order::{DeliveryId, MediaId, OrderCommit, OrderNumber, Stock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub amount: Money,
    pub from_account: AccountNumber,
    pub to_account: AccountNumber,
    pub idempotency_token: OrderNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub order_number: OrderNumber,
    pub source_address: String,
    pub destination_address: String,
    pub notification_address: String,
    pub idempotency_token: OrderNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to_address: String,
    pub message: String,
}

#[async_trait]
pub trait FundsTransferService: Send + Sync {
    /// Move `amount` between two accounts. A repeated token must not move money twice.
    async fn transfer(&self, request: TransferRequest) -> Result<(), FundsTransferError>;
}

#[async_trait]
pub trait DeliveryService: Send + Sync {
    async fn submit_delivery(&self, request: DeliveryRequest) -> Result<DeliveryId, DeliveryError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Committed stock for a media item, `None` when the media has no stock row
    async fn load_stock(&self, media_id: MediaId) -> Result<Option<Stock>, StoreError>;

    /// Persist the order aggregate all or nothing
    async fn commit(&self, commit: OrderCommit) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()>;
}
