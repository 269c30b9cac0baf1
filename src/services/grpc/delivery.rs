use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::{Code, Status};
use uuid::Uuid;

use crate::config::RpcSettings;
use crate::domain::order::DeliveryId;
use crate::services::{DeliveryError, DeliveryRequest, DeliveryService};
use crate::utils::{retry_on_transient, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, RetryPolicy};
use super::proto;
use super::{is_unknown_outcome, lazy_channel, unary};

pub struct GrpcDeliveryClient {
    channel: Channel,
    timeout: Duration,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl GrpcDeliveryClient {
    pub fn connect_lazy(endpoint: &str, rpc: &RpcSettings) -> anyhow::Result<Self> {
        tracing::info!(endpoint, "DeliveryService client configured");

        Ok(Self {
            channel: lazy_channel(endpoint, rpc.timeout)?,
            timeout: rpc.timeout,
            retry: RetryPolicy::with_attempts(rpc.retry_attempts),
            breaker: CircuitBreaker::new("delivery", CircuitBreakerConfig::default()),
        })
    }

    async fn call_once(&self, message: proto::SubmitDeliveryRequest) -> Result<DeliveryId, DeliveryError> {
        let call = unary::<_, proto::SubmitDeliveryReply>(
            self.channel.clone(),
            proto::SUBMIT_DELIVERY_PATH,
            message,
        );

        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => Err(DeliveryError::Unavailable(format!(
                "no reply within {}ms",
                self.timeout.as_millis()
            ))),
            Ok(Err(status)) => Err(map_status(&status)),
            Ok(Ok(reply)) => parse_delivery_id(&reply),
        }
    }
}

#[async_trait]
impl DeliveryService for GrpcDeliveryClient {
    async fn submit_delivery(&self, request: DeliveryRequest) -> Result<DeliveryId, DeliveryError> {
        let message = proto::SubmitDeliveryRequest {
            order_number: request.order_number.to_string(),
            source_address: request.source_address,
            destination_address: request.destination_address,
            delivery_notification_address: request.notification_address,
            idempotency_token: request.idempotency_token.to_string(),
        };
        let order_number = request.order_number;

        retry_on_transient(&self.retry, "submit_delivery", |attempt| {
            let message = message.clone();
            async move {
                tracing::debug!(%order_number, attempt, "Calling DeliveryService");
                self.breaker
                    .call(self.call_once(message))
                    .await
                    .map_err(|e| match e {
                        CircuitBreakerError::Open(name) => {
                            DeliveryError::Unavailable(format!("circuit '{}' is open", name))
                        }
                        CircuitBreakerError::Inner(inner) => inner,
                    })
            }
        })
        .await
    }
}

fn map_status(status: &Status) -> DeliveryError {
    let code = status.code();
    if is_unknown_outcome(code) {
        return DeliveryError::Unavailable(format!("{:?}: {}", code, status.message()));
    }

    match code {
        Code::InvalidArgument => DeliveryError::AddressInvalid(status.message().to_string()),
        _ => DeliveryError::Rejected(format!("{:?}: {}", code, status.message())),
    }
}

fn parse_delivery_id(reply: &proto::SubmitDeliveryReply) -> Result<DeliveryId, DeliveryError> {
    Uuid::parse_str(&reply.delivery_identifier)
        .map(DeliveryId)
        .map_err(|_| {
            DeliveryError::Rejected(format!(
                "malformed delivery identifier '{}'",
                reply.delivery_identifier
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::IsTransient;

    #[test]
    fn test_invalid_argument_is_address_invalid() {
        let err = map_status(&Status::invalid_argument("no such street"));
        assert_eq!(err, DeliveryError::AddressInvalid("no such street".to_string()));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_unavailable_is_transient() {
        assert!(map_status(&Status::unavailable("down")).is_transient());
    }

    #[test]
    fn test_parse_delivery_id() {
        let id = Uuid::new_v4();
        let reply = proto::SubmitDeliveryReply {
            delivery_identifier: id.to_string(),
        };
        assert_eq!(parse_delivery_id(&reply), Ok(DeliveryId(id)));

        let garbage = proto::SubmitDeliveryReply {
            delivery_identifier: "not-a-uuid".to_string(),
        };
        assert!(matches!(parse_delivery_id(&garbage), Err(DeliveryError::Rejected(_))));
    }
}
