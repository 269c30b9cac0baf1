// Wire messages for bank.v1.TransferService and delivery.v1.DeliveryService.

pub const TRANSFER_PATH: &str = "/bank.v1.TransferService/Transfer";
pub const SUBMIT_DELIVERY_PATH: &str = "/delivery.v1.DeliveryService/SubmitDelivery";

#[derive(Clone, PartialEq, prost::Message)]
pub struct TransferRequest {
    /// Amount in minor units
    #[prost(int64, tag = "1")]
    pub amount_minor: i64,
    #[prost(int32, tag = "2")]
    pub from_account_number: i32,
    #[prost(int32, tag = "3")]
    pub to_account_number: i32,
    #[prost(string, tag = "4")]
    pub idempotency_token: String,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct TransferReply {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SubmitDeliveryRequest {
    #[prost(string, tag = "1")]
    pub order_number: String,
    #[prost(string, tag = "2")]
    pub source_address: String,
    #[prost(string, tag = "3")]
    pub destination_address: String,
    #[prost(string, tag = "4")]
    pub delivery_notification_address: String,
    #[prost(string, tag = "5")]
    pub idempotency_token: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SubmitDeliveryReply {
    #[prost(string, tag = "1")]
    pub delivery_identifier: String,
}
