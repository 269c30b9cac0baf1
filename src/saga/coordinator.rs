use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::Settings;
use crate::domain::account::{AccountNumber, Money};
use crate::domain::order::{Delivery, DeliveryStatus, Order, OrderNumber};
use crate::metrics::Metrics;
use crate::services::{
    DeliveryRequest, DeliveryService, EmailMessage, FundsTransferService, NotificationChannel,
    OrderStore, TransferRequest,
};
use super::errors::{SubmissionError, SubmissionFailure};
use super::messages;

// ============================================================================
// Order Submission Coordinator
// ============================================================================
//
// One submission runs these steps in order, with no internal parallelism:
//
// 1. Assign the order number (kept if the caller resubmits with one)
// 2. Load a stock snapshot per media item
// 3. Compute the total
// 4. Transfer funds from the customer to the store account
// 5. Reload committed stock and decrement it
// 6. Schedule the delivery
// 7. Commit the order to the OrderStore
// 8. Notify the customer
//
// A failure after step 4 does NOT reverse the funds transfer. The customer
// is told they may have been charged and the failure carries
// `funds_captured = true`. Every remote call carries the order number as
// its idempotency token, so resubmitting the same order does not charge
// twice.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct SagaSettings {
    pub store_account_number: AccountNumber,
    pub store_address: String,
    pub delivery_notification_address: String,
}

impl From<&Settings> for SagaSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            store_account_number: settings.store_account_number,
            store_address: settings.store_address.clone(),
            delivery_notification_address: settings.delivery_notification_address.clone(),
        }
    }
}

pub struct OrderSubmissionCoordinator {
    funds_transfer: Arc<dyn FundsTransferService>,
    delivery: Arc<dyn DeliveryService>,
    store: Arc<dyn OrderStore>,
    notifications: Arc<dyn NotificationChannel>,
    metrics: Arc<Metrics>,
    settings: SagaSettings,
}

impl OrderSubmissionCoordinator {
    pub fn new(
        funds_transfer: Arc<dyn FundsTransferService>,
        delivery: Arc<dyn DeliveryService>,
        store: Arc<dyn OrderStore>,
        notifications: Arc<dyn NotificationChannel>,
        metrics: Arc<Metrics>,
        settings: SagaSettings,
    ) -> Self {
        Self {
            funds_transfer,
            delivery,
            store,
            notifications,
            metrics,
            settings,
        }
    }

    pub async fn submit_order(&self, mut order: Order) -> Result<OrderNumber, SubmissionFailure> {
        let order_number = *order.order_number.get_or_insert_with(OrderNumber::generate);
        let span = tracing::info_span!("submit_order", %order_number);

        self.submit(order, order_number).instrument(span).await
    }

    async fn submit(
        &self,
        mut order: Order,
        order_number: OrderNumber,
    ) -> Result<OrderNumber, SubmissionFailure> {
        let started = Instant::now();
        let mut funds_captured = false;

        tracing::info!(customer_id = %order.customer.id, items = order.items.len(), "Submitting order");

        let result = self.run_steps(&mut order, order_number, &mut funds_captured).await;
        let elapsed = started.elapsed().as_secs_f64();
        let recipient = order.customer.email.as_str().to_string();

        match result {
            Ok(()) => {
                tracing::info!("✅ Order placed");
                self.metrics.record_submitted(elapsed);
                self.notify(recipient, messages::order_placed(order_number)).await;
                Ok(order_number)
            }
            Err(error) => {
                if funds_captured {
                    tracing::error!(
                        error = %error,
                        funds_captured,
                        "❌ Order failed after funds were transferred; transfer is not reversed"
                    );
                } else {
                    tracing::warn!(error = %error, "❌ Order failed");
                }
                self.metrics.record_failed(error.label(), funds_captured, elapsed);
                self.notify(
                    recipient,
                    messages::order_failed(order_number, &error, funds_captured),
                )
                .await;

                Err(SubmissionFailure {
                    order_number,
                    error,
                    funds_captured,
                })
            }
        }
    }

    async fn run_steps(
        &self,
        order: &mut Order,
        order_number: OrderNumber,
        funds_captured: &mut bool,
    ) -> Result<(), SubmissionError> {
        order.validate_items()?;

        self.load_stock_snapshots(order, "load_stock").await?;

        let total = order.compute_total()?;
        tracing::debug!(step = "compute_total", total = %total);

        self.transfer_funds(order, order_number, total).await?;
        *funds_captured = true;

        // Decrement against what is committed now, not the step-2 snapshot
        self.load_stock_snapshots(order, "recheck_stock").await?;
        let stock_updates = order.update_stock_levels()?;
        tracing::debug!(step = "update_stock", updates = stock_updates.len());

        let delivery = self.schedule_delivery(order, order_number).await?;
        tracing::debug!(
            step = "delivery",
            delivery_id = %delivery.external_id,
            status = delivery.status.as_str()
        );
        order.attach_delivery(delivery);

        let commit = order.to_commit(stock_updates)?;
        self.store.commit(commit).await?;
        tracing::debug!(step = "commit", "Order persisted");

        Ok(())
    }

    /// A media with no stock row counts as zero on hand
    async fn load_stock_snapshots(
        &self,
        order: &mut Order,
        step: &'static str,
    ) -> Result<(), SubmissionError> {
        for media_id in order.media_ids() {
            match self.store.load_stock(media_id).await? {
                Some(stock) => order.attach_stock(stock),
                None => {
                    let requested = order
                        .items
                        .iter()
                        .filter(|item| item.media.id == media_id)
                        .fold(0u32, |sum, item| sum.saturating_add(item.quantity));

                    return Err(SubmissionError::InsufficientStock {
                        media_id,
                        requested,
                        available: 0,
                    });
                }
            }
        }

        tracing::debug!(step, media = order.items.len());
        Ok(())
    }

    async fn transfer_funds(
        &self,
        order: &Order,
        order_number: OrderNumber,
        total: Money,
    ) -> Result<(), SubmissionError> {
        let request = TransferRequest {
            amount: total,
            from_account: order.customer.bank_account_number,
            to_account: self.settings.store_account_number,
            idempotency_token: order_number,
        };

        match self.funds_transfer.transfer(request).await {
            Ok(()) => {
                self.metrics.record_funds_transfer("transferred");
                tracing::info!(
                    step = "transfer_funds",
                    amount = %total,
                    from = %order.customer.bank_account_number,
                    to = %self.settings.store_account_number,
                    "Funds transferred"
                );
                Ok(())
            }
            Err(e) => {
                let error = SubmissionError::from(e);
                self.metrics.record_funds_transfer(error.label());
                Err(error)
            }
        }
    }

    async fn schedule_delivery(
        &self,
        order: &Order,
        order_number: OrderNumber,
    ) -> Result<Delivery, SubmissionError> {
        let request = DeliveryRequest {
            order_number,
            source_address: self.settings.store_address.clone(),
            destination_address: order.customer.address.clone(),
            notification_address: self.settings.delivery_notification_address.clone(),
            idempotency_token: order_number,
        };

        let external_id = self.delivery.submit_delivery(request).await?;

        Ok(Delivery {
            external_id,
            status: DeliveryStatus::Submitted,
            source_address: self.settings.store_address.clone(),
            destination_address: order.customer.address.clone(),
        })
    }

    /// Fire-and-forget: a failed notification is logged and counted only
    async fn notify(&self, to_address: String, message: String) {
        let email = EmailMessage {
            to_address,
            message,
        };

        if let Err(e) = self.notifications.send(email).await {
            self.metrics.notifications_failed.inc();
            tracing::warn!(error = %e, "Failed to notify customer");
        }
    }
}
