use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::{Code, Status};

use crate::config::RpcSettings;
use crate::domain::account::AccountNumber;
use crate::services::{FundsTransferError, FundsTransferService, TransferRequest};
use crate::utils::{retry_on_transient, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, RetryPolicy};
use super::proto;
use super::{is_unknown_outcome, lazy_channel, unary};

pub struct GrpcFundsTransferClient {
    channel: Channel,
    timeout: Duration,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl GrpcFundsTransferClient {
    pub fn connect_lazy(endpoint: &str, rpc: &RpcSettings) -> anyhow::Result<Self> {
        tracing::info!(endpoint, "Bank TransferService client configured");

        Ok(Self {
            channel: lazy_channel(endpoint, rpc.timeout)?,
            timeout: rpc.timeout,
            retry: RetryPolicy::with_attempts(rpc.retry_attempts),
            breaker: CircuitBreaker::new("bank", CircuitBreakerConfig::default()),
        })
    }

    async fn call_once(&self, message: proto::TransferRequest, from: AccountNumber) -> Result<(), FundsTransferError> {
        let call = unary::<_, proto::TransferReply>(self.channel.clone(), proto::TRANSFER_PATH, message);

        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => Err(FundsTransferError::Unavailable(format!(
                "no reply within {}ms",
                self.timeout.as_millis()
            ))),
            Ok(Err(status)) => Err(map_status(&status, from)),
            Ok(Ok(_)) => Ok(()),
        }
    }
}

#[async_trait]
impl FundsTransferService for GrpcFundsTransferClient {
    async fn transfer(&self, request: TransferRequest) -> Result<(), FundsTransferError> {
        let message = proto::TransferRequest {
            amount_minor: request.amount.minor(),
            from_account_number: request.from_account.0,
            to_account_number: request.to_account.0,
            idempotency_token: request.idempotency_token.to_string(),
        };
        let token = request.idempotency_token;
        let from = request.from_account;

        retry_on_transient(&self.retry, "funds_transfer", |attempt| {
            let message = message.clone();
            async move {
                tracing::debug!(order_number = %token, attempt, "Calling bank TransferService");
                self.breaker
                    .call(self.call_once(message, from))
                    .await
                    .map_err(|e| match e {
                        CircuitBreakerError::Open(name) => {
                            FundsTransferError::Unavailable(format!("circuit '{}' is open", name))
                        }
                        CircuitBreakerError::Inner(inner) => inner,
                    })
            }
        })
        .await
    }
}

fn map_status(status: &Status, from: AccountNumber) -> FundsTransferError {
    let code = status.code();
    if is_unknown_outcome(code) {
        return FundsTransferError::Unavailable(format!("{:?}: {}", code, status.message()));
    }

    match code {
        Code::FailedPrecondition => FundsTransferError::InsufficientFunds(from),
        Code::NotFound => FundsTransferError::Rejected(format!("account not found: {}", status.message())),
        _ => FundsTransferError::Rejected(format!("{:?}: {}", code, status.message())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::IsTransient;

    #[test]
    fn test_deadline_is_unknown_outcome() {
        let err = map_status(&Status::deadline_exceeded("slow bank"), AccountNumber(456));
        assert!(err.is_transient());
    }

    #[test]
    fn test_failed_precondition_is_insufficient_funds() {
        let err = map_status(&Status::failed_precondition("balance too low"), AccountNumber(456));
        assert_eq!(err, FundsTransferError::InsufficientFunds(AccountNumber(456)));
    }

    #[test]
    fn test_not_found_is_permanent() {
        let err = map_status(&Status::not_found("account 999"), AccountNumber(456));
        assert!(matches!(err, FundsTransferError::Rejected(ref msg) if msg.contains("account 999")));
        assert!(!err.is_transient());
    }
}
