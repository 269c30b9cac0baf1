// ============================================================================
// Order Fulfillment
// ============================================================================
//
// Order submission saga: charge the customer, decrement stock, schedule a
// delivery, persist the order and notify the customer.
//
// - domain     - accounts, customers, orders
// - ledger     - local atomic transfer with optimistic concurrency
// - services   - ports of the saga and their gRPC / in-process clients
// - storage    - OrderStore and AccountStore adapters (memory, ScyllaDB)
// - messaging  - customer notification channels (Redpanda, log)
// - saga       - OrderSubmissionCoordinator
// - actors     - actix surface for SubmitOrder
// - metrics    - Prometheus registry and HTTP endpoint
// - utils      - retry and circuit breaker
//
// ============================================================================

pub mod actors;
pub mod config;
pub mod domain;
pub mod ledger;
pub mod messaging;
pub mod metrics;
pub mod saga;
pub mod services;
pub mod storage;
pub mod telemetry;
pub mod utils;
