use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};
use std::time::Duration;

use crate::services::{EmailMessage, NotificationChannel};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, IsTransient};

/// Publish failures are always worth another try later
#[derive(Debug, thiserror::Error)]
#[error("Kafka send error: {0}")]
struct PublishError(String);

impl IsTransient for PublishError {
    fn is_transient(&self) -> bool {
        true
    }
}

/// Sends customer emails as JSON records keyed by recipient address
pub struct RedpandaNotificationChannel {
    producer: FutureProducer,
    topic: String,
    circuit_breaker: CircuitBreaker,
}

impl RedpandaNotificationChannel {
    pub fn new(brokers: &str, topic: &str) -> anyhow::Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        let cb_config = CircuitBreakerConfig {
            open_after: 5,
            open_for: Duration::from_secs(30),
            close_after: 3,
        };

        Ok(Self {
            producer,
            topic: topic.to_string(),
            circuit_breaker: CircuitBreaker::new("redpanda", cb_config),
        })
    }
}

#[async_trait]
impl NotificationChannel for RedpandaNotificationChannel {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&message)?;
        let key = message.to_address.as_str();

        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(&self.topic).key(key).payload(&payload);
                self.producer
                    .send(record, Timeout::After(Duration::from_secs(5)))
                    .await
                    .map_err(|(e, _)| PublishError(e.to_string()))?;
                Ok::<(), PublishError>(())
            })
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(topic = %self.topic, to = %message.to_address, "Notification published");
                Ok(())
            }
            Err(CircuitBreakerError::Open(_)) => {
                Err(anyhow::anyhow!("Circuit breaker open for Redpanda, notification dropped"))
            }
            Err(CircuitBreakerError::Inner(e)) => Err(e.into()),
        }
    }
}
