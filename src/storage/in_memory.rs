use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::order::{MediaId, OrderCommit, OrderNumber, Stock};
use crate::services::{OrderStore, StoreError};

#[derive(Default)]
struct Tables {
    stocks: HashMap<MediaId, u32>,
    orders: HashMap<OrderNumber, OrderCommit>,
}

/// OrderStore held in memory. Stock checks and the order insert happen
/// under one lock, so a commit is all or nothing.
#[derive(Default)]
pub struct InMemoryOrderStore {
    tables: Mutex<Tables>,
}

impl InMemoryOrderStore {
    pub fn with_stock(stocks: impl IntoIterator<Item = Stock>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                stocks: stocks
                    .into_iter()
                    .map(|s| (s.media_id, s.quantity_on_hand))
                    .collect(),
                orders: HashMap::new(),
            }),
        }
    }

    pub async fn set_stock(&self, stock: Stock) {
        self.tables
            .lock()
            .await
            .stocks
            .insert(stock.media_id, stock.quantity_on_hand);
    }

    pub async fn quantity_on_hand(&self, media_id: MediaId) -> Option<u32> {
        self.tables.lock().await.stocks.get(&media_id).copied()
    }

    pub async fn order(&self, order_number: OrderNumber) -> Option<OrderCommit> {
        self.tables.lock().await.orders.get(&order_number).cloned()
    }

    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn load_stock(&self, media_id: MediaId) -> Result<Option<Stock>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.stocks.get(&media_id).map(|&quantity_on_hand| Stock {
            media_id,
            quantity_on_hand,
        }))
    }

    async fn commit(&self, commit: OrderCommit) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let order_number = commit.order_number();

        if tables.orders.contains_key(&order_number) {
            return Err(StoreError::Conflict(format!("order {} already exists", order_number)));
        }

        for update in &commit.stock_updates {
            let current = tables.stocks.get(&update.media_id).copied();
            if current != Some(update.expected_on_hand) {
                return Err(StoreError::Conflict(format!(
                    "stock for media {} changed: expected {}, found {:?}",
                    update.media_id, update.expected_on_hand, current
                )));
            }
        }

        for update in &commit.stock_updates {
            tables.stocks.insert(update.media_id, update.new_on_hand);
        }
        tables.orders.insert(order_number, commit);

        tracing::debug!(%order_number, "Order committed to in-memory store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Money;
    use crate::domain::order::{
        DeliveryId, DeliveryRow, DeliveryStatus, ExistingReferences, OrderItemRow, OrderRow,
        StockUpdate,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn commit_for(order_number: OrderNumber, media_id: MediaId, expected: u32, new: u32) -> OrderCommit {
        let customer_id = Uuid::new_v4();
        OrderCommit {
            order: OrderRow {
                order_number,
                customer_id,
                total: Money::from_major(5),
                placed_at: Utc::now(),
            },
            items: vec![OrderItemRow {
                media_id,
                quantity: expected - new,
                unit_price: Money::from_major(5),
            }],
            delivery: DeliveryRow {
                external_id: DeliveryId(Uuid::new_v4()),
                status: DeliveryStatus::Submitted,
                source_address: "Video Store Address".to_string(),
                destination_address: "1 Customer Street".to_string(),
            },
            stock_updates: vec![StockUpdate {
                media_id,
                expected_on_hand: expected,
                new_on_hand: new,
            }],
            references: ExistingReferences {
                customer_id,
                login_credential_id: Uuid::new_v4(),
                media_ids: vec![media_id],
            },
        }
    }

    fn media_id() -> MediaId {
        MediaId(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_commit_applies_stock_and_stores_order() {
        let media = media_id();
        let store = InMemoryOrderStore::with_stock([Stock { media_id: media, quantity_on_hand: 4 }]);
        let order_number = OrderNumber::generate();

        store.commit(commit_for(order_number, media, 4, 3)).await.unwrap();

        assert_eq!(store.quantity_on_hand(media).await, Some(3));
        assert!(store.order(order_number).await.is_some());
    }

    #[tokio::test]
    async fn test_commit_rejects_changed_stock() {
        let media = media_id();
        let store = InMemoryOrderStore::with_stock([Stock { media_id: media, quantity_on_hand: 4 }]);
        let first = commit_for(OrderNumber::generate(), media, 4, 3);
        let stale = commit_for(OrderNumber::generate(), media, 4, 2);

        store.commit(first).await.unwrap();
        let result = store.commit(stale).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.quantity_on_hand(media).await, Some(3));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_commit_rejects_duplicate_order() {
        let media = media_id();
        let store = InMemoryOrderStore::with_stock([Stock { media_id: media, quantity_on_hand: 4 }]);
        let order_number = OrderNumber::generate();

        store.commit(commit_for(order_number, media, 4, 3)).await.unwrap();
        let result = store.commit(commit_for(order_number, media, 3, 2)).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.quantity_on_hand(media).await, Some(3));
    }

    #[tokio::test]
    async fn test_load_stock_missing_row() {
        let store = InMemoryOrderStore::default();
        assert_eq!(store.load_stock(media_id()).await, Ok(None));
    }
}
