use actix::prelude::*;
use std::sync::Arc;

use crate::domain::order::{Order, OrderNumber};
use crate::saga::{OrderSubmissionCoordinator, SubmissionFailure};

// ============================================================================
// Order Submission Actor
// ============================================================================

pub struct OrderSubmissionActor {
    coordinator: Arc<OrderSubmissionCoordinator>,
}

impl OrderSubmissionActor {
    pub fn new(coordinator: Arc<OrderSubmissionCoordinator>) -> Self {
        Self { coordinator }
    }
}

impl Actor for OrderSubmissionActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("OrderSubmissionActor started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("OrderSubmissionActor stopped");
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<OrderNumber, SubmissionFailure>")]
pub struct SubmitOrder {
    pub order: Order,
}

// ============================================================================
// Handlers
// ============================================================================

impl Handler<SubmitOrder> for OrderSubmissionActor {
    type Result = ResponseFuture<Result<OrderNumber, SubmissionFailure>>;

    fn handle(&mut self, msg: SubmitOrder, _: &mut Self::Context) -> Self::Result {
        let coordinator = self.coordinator.clone();

        Box::pin(async move { coordinator.submit_order(msg.order).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::domain::account::{Account, AccountNumber, Money};
    use crate::domain::customer::{Customer, Email, LoginCredential};
    use crate::domain::order::{Media, MediaId, OrderItem, Stock};
    use crate::ledger::{AccountLedger, InMemoryAccountStore};
    use crate::messaging::LogNotificationChannel;
    use crate::metrics::Metrics;
    use crate::saga::{SagaSettings, SubmissionError};
    use crate::services::local::LocalFundsTransfer;
    use crate::services::{DeliveryError, DeliveryRequest, DeliveryService};
    use crate::domain::order::DeliveryId;
    use crate::storage::InMemoryOrderStore;

    struct InstantDelivery;

    #[async_trait::async_trait]
    impl DeliveryService for InstantDelivery {
        async fn submit_delivery(&self, _request: DeliveryRequest) -> Result<DeliveryId, DeliveryError> {
            Ok(DeliveryId(Uuid::new_v4()))
        }
    }

    fn setup(customer_balance: Money, media: &Media) -> Addr<OrderSubmissionActor> {
        let accounts = Arc::new(InMemoryAccountStore::with_accounts([
            Account::new(AccountNumber(123), Money::ZERO),
            Account::new(AccountNumber(456), customer_balance),
        ]));
        let coordinator = OrderSubmissionCoordinator::new(
            Arc::new(LocalFundsTransfer::new(Arc::new(AccountLedger::new(accounts)))),
            Arc::new(InstantDelivery),
            Arc::new(InMemoryOrderStore::with_stock([Stock {
                media_id: media.id,
                quantity_on_hand: 3,
            }])),
            Arc::new(LogNotificationChannel),
            Arc::new(Metrics::new().unwrap()),
            SagaSettings {
                store_account_number: AccountNumber(123),
                store_address: "Video Store Address".to_string(),
                delivery_notification_address: "net.tcp://localhost:9010/DeliveryNotificationService"
                    .to_string(),
            },
        );

        OrderSubmissionActor::new(Arc::new(coordinator)).start()
    }

    fn order(media: &Media) -> Order {
        let customer = Customer {
            id: Uuid::new_v4(),
            email: Email::new("customer@example.com"),
            address: "1 Customer Street".to_string(),
            bank_account_number: AccountNumber(456),
            login_credential: LoginCredential {
                id: Uuid::new_v4(),
                user_name: "customer".to_string(),
            },
        };
        Order::new(customer, vec![OrderItem::new(media.clone(), 3)])
    }

    fn media() -> Media {
        Media {
            id: MediaId(Uuid::new_v4()),
            title: "Blade Runner".to_string(),
            price: Money::from_major(5),
        }
    }

    #[actix::test]
    async fn test_submit_order_message() {
        let media = media();
        let actor = setup(Money::from_major(20), &media);

        let result = actor.send(SubmitOrder { order: order(&media) }).await.unwrap();

        assert!(result.is_ok());
    }

    #[actix::test]
    async fn test_submit_order_message_reports_failure() {
        let media = media();
        let actor = setup(Money::from_major(5), &media);

        let failure = actor
            .send(SubmitOrder { order: order(&media) })
            .await
            .unwrap()
            .unwrap_err();

        assert_eq!(failure.error, SubmissionError::InsufficientFunds(AccountNumber(456)));
    }
}
