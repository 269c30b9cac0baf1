use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::account::Money;
use crate::domain::customer::Customer;
use super::errors::OrderError;
use super::value_objects::{Delivery, MediaId, OrderItem, OrderNumber, Stock};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// Built by the caller with customer and items. A submission numbers it,
// computes the total, decrements stock on the item snapshots and attaches
// the delivery before turning it into an OrderCommit.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: Option<OrderNumber>,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub total: Option<Money>,
    pub delivery: Option<Delivery>,
}

/// Compare-and-set of one stock row, from the snapshot value to the new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub media_id: MediaId,
    pub expected_on_hand: u32,
    pub new_on_hand: u32,
}

impl Order {
    pub fn new(customer: Customer, items: Vec<OrderItem>) -> Self {
        Self {
            order_number: None,
            customer,
            items,
            total: None,
            delivery: None,
        }
    }

    /// Resubmit under a known order number (e.g. after a transient failure)
    pub fn with_order_number(mut self, order_number: OrderNumber) -> Self {
        self.order_number = Some(order_number);
        self
    }

    pub fn validate_items(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for item in &self.items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity(item.media.id));
            }
            if !item.media.price.is_positive() {
                return Err(OrderError::InvalidPrice(item.media.id));
            }
        }

        Ok(())
    }

    /// Sum of price × quantity over all items
    pub fn compute_total(&mut self) -> Result<Money, OrderError> {
        let total = self.items.iter().try_fold(Money::ZERO, |acc, item| {
            item.media
                .price
                .checked_times(item.quantity)
                .and_then(|line| acc.checked_add(line))
                .ok_or(OrderError::TotalOverflow)
        })?;

        self.total = Some(total);
        Ok(total)
    }

    pub fn attach_stock(&mut self, stock: Stock) {
        for item in self.items.iter_mut().filter(|i| i.media.id == stock.media_id) {
            item.stock_snapshot = Some(stock);
        }
    }

    /// Decrement every snapshot by the ordered quantity.
    ///
    /// Quantities of items sharing a media are summed. Nothing is mutated
    /// unless every media has enough stock.
    pub fn update_stock_levels(&mut self) -> Result<Vec<StockUpdate>, OrderError> {
        let mut demand: BTreeMap<MediaId, (u32, u32)> = BTreeMap::new();

        for item in &self.items {
            let snapshot = item
                .stock_snapshot
                .ok_or(OrderError::MissingStockSnapshot(item.media.id))?;
            let entry = demand
                .entry(item.media.id)
                .or_insert((snapshot.quantity_on_hand, 0));
            entry.1 = entry.1.saturating_add(item.quantity);
        }

        let mut updates = Vec::with_capacity(demand.len());
        for (media_id, (on_hand, requested)) in demand {
            let new_on_hand = on_hand
                .checked_sub(requested)
                .ok_or(OrderError::InsufficientStock {
                    media_id,
                    requested,
                    available: on_hand,
                })?;
            updates.push(StockUpdate {
                media_id,
                expected_on_hand: on_hand,
                new_on_hand,
            });
        }

        for update in &updates {
            for item in self.items.iter_mut().filter(|i| i.media.id == update.media_id) {
                if let Some(snapshot) = item.stock_snapshot.as_mut() {
                    snapshot.quantity_on_hand = update.new_on_hand;
                }
            }
        }

        Ok(updates)
    }

    pub fn attach_delivery(&mut self, delivery: Delivery) {
        self.delivery = Some(delivery);
    }

    pub fn media_ids(&self) -> Vec<MediaId> {
        let mut ids: Vec<MediaId> = self.items.iter().map(|i| i.media.id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountNumber;
    use crate::domain::customer::{Email, LoginCredential};
    use crate::domain::order::Media;
    use uuid::Uuid;

    fn customer() -> Customer {
        Customer {
            id: Uuid::new_v4(),
            email: Email::new("customer@example.com"),
            address: "1 Customer Street".to_string(),
            bank_account_number: AccountNumber(456),
            login_credential: LoginCredential {
                id: Uuid::new_v4(),
                user_name: "customer".to_string(),
            },
        }
    }

    fn media(price_minor: i64) -> Media {
        Media {
            id: MediaId(Uuid::new_v4()),
            title: "Some Film".to_string(),
            price: Money::from_minor(price_minor),
        }
    }

    #[test]
    fn test_validate_rejects_empty_items() {
        let order = Order::new(customer(), vec![]);
        assert_eq!(order.validate_items(), Err(OrderError::EmptyItems));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let film = media(500);
        let id = film.id;
        let order = Order::new(customer(), vec![OrderItem::new(film, 0)]);
        assert_eq!(order.validate_items(), Err(OrderError::InvalidQuantity(id)));
    }

    #[test]
    fn test_validate_rejects_non_positive_price() {
        let free = media(0);
        let id = free.id;
        let order = Order::new(customer(), vec![OrderItem::new(free, 1)]);
        assert_eq!(order.validate_items(), Err(OrderError::InvalidPrice(id)));

        let negative = media(-100);
        let id = negative.id;
        let order = Order::new(customer(), vec![OrderItem::new(negative, 1)]);
        assert_eq!(order.validate_items(), Err(OrderError::InvalidPrice(id)));
    }

    #[test]
    fn test_compute_total() {
        let mut order = Order::new(
            customer(),
            vec![OrderItem::new(media(500), 2), OrderItem::new(media(250), 2)],
        );

        assert_eq!(order.compute_total().unwrap(), Money::from_major(15));
        assert_eq!(order.total, Some(Money::from_major(15)));
    }

    #[test]
    fn test_update_stock_levels_sums_duplicate_media() {
        let film = media(500);
        let stock = Stock {
            media_id: film.id,
            quantity_on_hand: 5,
        };
        let mut order = Order::new(
            customer(),
            vec![OrderItem::new(film.clone(), 2), OrderItem::new(film.clone(), 3)],
        );
        order.attach_stock(stock);

        let updates = order.update_stock_levels().unwrap();

        assert_eq!(
            updates,
            vec![StockUpdate {
                media_id: film.id,
                expected_on_hand: 5,
                new_on_hand: 0,
            }]
        );
        assert!(order
            .items
            .iter()
            .all(|i| i.stock_snapshot.unwrap().quantity_on_hand == 0));
    }

    #[test]
    fn test_update_stock_levels_insufficient_mutates_nothing() {
        let plenty = media(500);
        let scarce = media(500);
        let mut order = Order::new(
            customer(),
            vec![OrderItem::new(plenty.clone(), 1), OrderItem::new(scarce.clone(), 3)],
        );
        order.attach_stock(Stock { media_id: plenty.id, quantity_on_hand: 10 });
        order.attach_stock(Stock { media_id: scarce.id, quantity_on_hand: 2 });

        let err = order.update_stock_levels().unwrap_err();

        assert_eq!(
            err,
            OrderError::InsufficientStock {
                media_id: scarce.id,
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(order.items[0].stock_snapshot.unwrap().quantity_on_hand, 10);
        assert_eq!(order.items[1].stock_snapshot.unwrap().quantity_on_hand, 2);
    }

    #[test]
    fn test_update_stock_levels_requires_snapshot() {
        let film = media(500);
        let id = film.id;
        let mut order = Order::new(customer(), vec![OrderItem::new(film, 1)]);

        assert_eq!(
            order.update_stock_levels(),
            Err(OrderError::MissingStockSnapshot(id))
        );
    }
}
