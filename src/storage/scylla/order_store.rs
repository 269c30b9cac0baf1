use async_trait::async_trait;
use scylla::client::session::Session;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::order::{MediaId, OrderCommit, OrderNumber, Stock, StockUpdate};
use crate::services::{OrderStore, StoreError};
use super::lwt::was_applied;

// ============================================================================
// ScyllaDB Order Store
// ============================================================================
//
// The order row is the commit point:
//
// 1. INSERT the order row as `pending` IF NOT EXISTS, carrying the stock
//    updates it is about to apply
// 2. compare-and-set every stock row from its snapshot value
// 3. flip the row to `committed` IF it is still `pending`
//
// A rejected stock update restores the rows already changed, narrows the
// pending record to whatever could not be restored and deletes the row once
// nothing is outstanding. A driver error leaves the pending row in place as
// the reconciliation record; `release_pending` rolls it back, either when the
// same order number is committed again or from `release_abandoned` at startup.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderRowStatus {
    Pending,
    Committed,
}

impl OrderRowStatus {
    fn as_str(&self) -> &'static str {
        match self {
            OrderRowStatus::Pending => "pending",
            OrderRowStatus::Committed => "committed",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(OrderRowStatus::Pending),
            "committed" => Some(OrderRowStatus::Committed),
            _ => None,
        }
    }
}

/// A stock row is back at its snapshot value, either because the restoring
/// compare-and-set applied or because the update never landed.
fn is_released(restored: bool, current: Option<u32>, update: &StockUpdate) -> bool {
    restored || current == Some(update.expected_on_hand)
}

fn describe_media(updates: &[StockUpdate]) -> String {
    updates
        .iter()
        .map(|u| u.media_id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn unavailable(error: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

pub struct ScyllaOrderStore {
    session: Arc<Session>,
}

impl ScyllaOrderStore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Roll back every order left `pending` by an earlier process.
    /// Run before the store accepts commits.
    pub async fn release_abandoned(&self) -> Result<usize, StoreError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT order_number FROM orders WHERE status = ? ALLOW FILTERING",
                (OrderRowStatus::Pending.as_str(),),
            )
            .await
            .map_err(unavailable)?;

        let rows = result.into_rows_result().map_err(unavailable)?;
        let mut pending = Vec::new();
        for row in rows.rows::<(Uuid,)>().map_err(unavailable)? {
            let (order_number,) = row.map_err(unavailable)?;
            pending.push(OrderNumber(order_number));
        }

        let mut released = 0;
        for order_number in pending {
            match self.release_pending(order_number).await {
                Ok(()) => released += 1,
                Err(e) => tracing::warn!(%order_number, error = %e, "Pending order left unreleased"),
            }
        }

        if released > 0 {
            tracing::info!(released, "Released abandoned pending orders");
        }
        Ok(released)
    }

    async fn compare_and_set_stock(&self, media_id: MediaId, from: u32, to: u32) -> anyhow::Result<bool> {
        let result = self
            .session
            .query_unpaged(
                "UPDATE stocks SET quantity_on_hand = ? WHERE media_id = ? IF quantity_on_hand = ?",
                (i64::from(to), media_id.0, i64::from(from)),
            )
            .await?;
        was_applied(result)
    }

    /// Stock updates that could not be put back
    async fn restore_stock(&self, applied: &[StockUpdate]) -> Vec<StockUpdate> {
        let mut unrestored = Vec::new();
        for update in applied {
            let restored = self
                .compare_and_set_stock(update.media_id, update.new_on_hand, update.expected_on_hand)
                .await;
            if !matches!(restored, Ok(true)) {
                tracing::error!(
                    media_id = %update.media_id,
                    expected_on_hand = update.expected_on_hand,
                    "Failed to restore stock after rejected commit"
                );
                unrestored.push(*update);
            }
        }
        unrestored
    }

    async fn insert_pending(&self, commit: &OrderCommit) -> anyhow::Result<bool> {
        let items = serde_json::to_string(&commit.items)?;
        let delivery = serde_json::to_string(&commit.delivery)?;
        let stock_updates = serde_json::to_string(&commit.stock_updates)?;

        let result = self
            .session
            .query_unpaged(
                "INSERT INTO orders (order_number, status, customer_id, total_minor, items, delivery, stock_updates, placed_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?) IF NOT EXISTS",
                (
                    commit.order.order_number.as_uuid(),
                    OrderRowStatus::Pending.as_str(),
                    commit.references.customer_id,
                    commit.order.total.minor(),
                    items,
                    delivery,
                    stock_updates,
                    commit.order.placed_at,
                ),
            )
            .await?;
        was_applied(result)
    }

    async fn mark_committed(&self, order_number: OrderNumber) -> anyhow::Result<bool> {
        let result = self
            .session
            .query_unpaged(
                "UPDATE orders SET status = ? WHERE order_number = ? IF status = ?",
                (
                    OrderRowStatus::Committed.as_str(),
                    order_number.as_uuid(),
                    OrderRowStatus::Pending.as_str(),
                ),
            )
            .await?;
        was_applied(result)
    }

    /// Narrow the pending record to the stock updates still outstanding
    async fn record_unreleased(&self, order_number: OrderNumber, outstanding: &[StockUpdate]) -> anyhow::Result<()> {
        let stock_updates = serde_json::to_string(outstanding)?;
        self.session
            .query_unpaged(
                "UPDATE orders SET stock_updates = ? WHERE order_number = ? IF status = ?",
                (stock_updates, order_number.as_uuid(), OrderRowStatus::Pending.as_str()),
            )
            .await?;
        Ok(())
    }

    async fn delete_pending(&self, order_number: OrderNumber) -> anyhow::Result<()> {
        self.session
            .query_unpaged(
                "DELETE FROM orders WHERE order_number = ? IF status = ?",
                (order_number.as_uuid(), OrderRowStatus::Pending.as_str()),
            )
            .await?;
        Ok(())
    }

    async fn row_status(&self, order_number: OrderNumber) -> anyhow::Result<Option<(OrderRowStatus, Vec<StockUpdate>)>> {
        let result = self
            .session
            .query_unpaged(
                "SELECT status, stock_updates FROM orders WHERE order_number = ?",
                (order_number.as_uuid(),),
            )
            .await?;

        let row = result
            .into_rows_result()?
            .maybe_first_row::<(Option<String>, Option<String>)>()?;

        let Some((status, stock_updates)) = row else {
            return Ok(None);
        };
        let status = status
            .as_deref()
            .and_then(OrderRowStatus::parse)
            .ok_or_else(|| anyhow::anyhow!("order {} has an unknown status {:?}", order_number, status))?;
        let stock_updates = match stock_updates {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        Ok(Some((status, stock_updates)))
    }

    /// Rejected stock update: restore what was applied and drop the claim
    async fn abandon(&self, order_number: OrderNumber, applied: &[StockUpdate], reason: String) -> StoreError {
        let unrestored = self.restore_stock(applied).await;

        let cleanup = match self.record_unreleased(order_number, &unrestored).await {
            Ok(()) if unrestored.is_empty() => self.delete_pending(order_number).await,
            other => other,
        };
        if let Err(e) = cleanup {
            tracing::warn!(%order_number, error = %e, "Pending order row not cleaned up");
        }

        if unrestored.is_empty() {
            StoreError::Conflict(reason)
        } else {
            StoreError::Conflict(format!(
                "{}; stock could not be restored for media {}",
                reason,
                describe_media(&unrestored)
            ))
        }
    }

    /// Roll back a pending order whose outcome was never settled
    async fn release_pending(&self, order_number: OrderNumber) -> Result<(), StoreError> {
        let updates = match self.row_status(order_number).await.map_err(unavailable)? {
            Some((OrderRowStatus::Pending, updates)) => updates,
            _ => return Ok(()),
        };

        let mut outstanding = Vec::new();
        for update in &updates {
            let restored = self
                .compare_and_set_stock(update.media_id, update.new_on_hand, update.expected_on_hand)
                .await
                .map_err(unavailable)?;
            let current = if restored {
                None
            } else {
                self.load_stock(update.media_id).await?.map(|s| s.quantity_on_hand)
            };
            if !is_released(restored, current, update) {
                outstanding.push(*update);
            }
        }

        self.record_unreleased(order_number, &outstanding)
            .await
            .map_err(unavailable)?;
        if !outstanding.is_empty() {
            return Err(StoreError::Conflict(format!(
                "pending order {} still holds stock for media {}",
                order_number,
                describe_media(&outstanding)
            )));
        }

        self.delete_pending(order_number).await.map_err(unavailable)?;
        tracing::info!(%order_number, "Pending order released");
        Ok(())
    }
}

#[async_trait]
impl OrderStore for ScyllaOrderStore {
    async fn load_stock(&self, media_id: MediaId) -> Result<Option<Stock>, StoreError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT quantity_on_hand FROM stocks WHERE media_id = ?",
                (media_id.0,),
            )
            .await
            .map_err(unavailable)?;

        let rows = result.into_rows_result().map_err(unavailable)?;
        let row = rows.maybe_first_row::<(i64,)>().map_err(unavailable)?;

        row.map(|(quantity,)| {
            u32::try_from(quantity)
                .map(|quantity_on_hand| Stock { media_id, quantity_on_hand })
                .map_err(|_| StoreError::Unavailable(format!("corrupt stock row for media {}", media_id)))
        })
        .transpose()
    }

    async fn commit(&self, commit: OrderCommit) -> Result<(), StoreError> {
        let order_number = commit.order_number();

        if !self.insert_pending(&commit).await.map_err(unavailable)? {
            match self.row_status(order_number).await.map_err(unavailable)? {
                Some((OrderRowStatus::Committed, _)) => {
                    return Err(StoreError::Conflict(format!("order {} already exists", order_number)));
                }
                // Left behind by an attempt with an unknown outcome
                _ => {
                    self.release_pending(order_number).await?;
                    if !self.insert_pending(&commit).await.map_err(unavailable)? {
                        return Err(StoreError::Conflict(format!(
                            "order {} is being committed concurrently",
                            order_number
                        )));
                    }
                }
            }
        }

        let mut applied = Vec::with_capacity(commit.stock_updates.len());
        for update in &commit.stock_updates {
            match self
                .compare_and_set_stock(update.media_id, update.expected_on_hand, update.new_on_hand)
                .await
            {
                Ok(true) => applied.push(*update),
                Ok(false) => {
                    let reason = format!("stock for media {} changed since it was loaded", update.media_id);
                    return Err(self.abandon(order_number, &applied, reason).await);
                }
                // The pending row keeps the record for release_pending
                Err(e) => return Err(unavailable(e)),
            }
        }

        match self.mark_committed(order_number).await {
            Ok(true) => {
                tracing::info!(
                    %order_number,
                    items = commit.items.len(),
                    "✅ Order persisted to ScyllaDB"
                );
                Ok(())
            }
            Ok(false) => Err(StoreError::Conflict(format!(
                "pending order {} was released before it committed",
                order_number
            ))),
            Err(e) => Err(unavailable(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(expected_on_hand: u32, new_on_hand: u32) -> StockUpdate {
        StockUpdate {
            media_id: MediaId(Uuid::new_v4()),
            expected_on_hand,
            new_on_hand,
        }
    }

    #[test]
    fn test_row_status_strings() {
        for status in [OrderRowStatus::Pending, OrderRowStatus::Committed] {
            assert_eq!(OrderRowStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderRowStatus::parse("shipped"), None);
    }

    #[test]
    fn test_restored_update_is_released() {
        assert!(is_released(true, None, &update(4, 2)));
    }

    #[test]
    fn test_update_that_never_landed_is_released() {
        assert!(is_released(false, Some(4), &update(4, 2)));
    }

    #[test]
    fn test_stock_moved_by_another_order_is_outstanding() {
        assert!(!is_released(false, Some(1), &update(4, 2)));
        assert!(!is_released(false, None, &update(4, 2)));
    }

    #[test]
    fn test_describe_media_lists_every_row() {
        let updates = [update(4, 2), update(3, 1)];
        let described = describe_media(&updates);

        assert!(described.contains(&updates[0].media_id.to_string()));
        assert!(described.contains(&updates[1].media_id.to_string()));
    }
}
