use actix::prelude::*;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::sync::Arc;
use uuid::Uuid;

use order_fulfillment::actors::{OrderSubmissionActor, SubmitOrder};
use order_fulfillment::config::Settings;
use order_fulfillment::domain::account::{Account, AccountNumber, Money};
use order_fulfillment::domain::customer::{Customer, Email, LoginCredential};
use order_fulfillment::domain::order::{Media, MediaId, Order, OrderItem, Stock};
use order_fulfillment::ledger::AccountLedger;
use order_fulfillment::messaging::{LogNotificationChannel, RedpandaNotificationChannel};
use order_fulfillment::metrics::{self, Metrics};
use order_fulfillment::saga::{OrderSubmissionCoordinator, SagaSettings};
use order_fulfillment::services::grpc::{GrpcDeliveryClient, GrpcFundsTransferClient};
use order_fulfillment::services::local::LocalFundsTransfer;
use order_fulfillment::services::{FundsTransferService, NotificationChannel};
use order_fulfillment::storage::scylla::schema;
use order_fulfillment::storage::{ScyllaAccountStore, ScyllaOrderStore};
use order_fulfillment::telemetry;

const DEMO_CUSTOMER_ACCOUNT: AccountNumber = AccountNumber(456);

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    telemetry::init(&settings)?;

    tracing::info!("🚀 Starting order fulfillment service");

    // === 1. ScyllaDB session and schema ===
    tracing::info!(nodes = ?settings.scylla_nodes, "Connecting to ScyllaDB...");
    let session: Session = SessionBuilder::new()
        .known_nodes(&settings.scylla_nodes)
        .build()
        .await?;
    schema::ensure_schema(&session, &settings.scylla_keyspace).await?;
    let session = Arc::new(session);

    // === 2. Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // Metrics server runs on its own runtime, off the actor system
    let metrics_registry = metrics.registry().clone();
    let metrics_port = settings.metrics_port;
    std::thread::spawn(move || match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!(error = %e, "Metrics server error");
            }
        }),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics runtime"),
    });

    // === 3. Saga collaborators ===
    let funds_transfer: Arc<dyn FundsTransferService> = match &settings.bank_endpoint {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "Using remote funds transfer service");
            Arc::new(GrpcFundsTransferClient::connect_lazy(endpoint, &settings.rpc)?)
        }
        None => {
            tracing::info!("BANK_ENDPOINT not set, running the account ledger in-process");
            schema::seed_accounts(
                &session,
                &[
                    Account::new(settings.store_account_number, Money::ZERO),
                    Account::new(DEMO_CUSTOMER_ACCOUNT, Money::from_major(20)),
                ],
            )
            .await?;
            let ledger = AccountLedger::new(Arc::new(ScyllaAccountStore::new(session.clone())));
            Arc::new(LocalFundsTransfer::new(Arc::new(ledger)))
        }
    };

    let delivery = Arc::new(GrpcDeliveryClient::connect_lazy(
        &settings.delivery_endpoint,
        &settings.rpc,
    )?);

    let notifications: Arc<dyn NotificationChannel> = match RedpandaNotificationChannel::new(
        &settings.redpanda_brokers,
        &settings.notification_topic,
    ) {
        Ok(channel) => Arc::new(channel),
        Err(e) => {
            tracing::warn!(error = %e, "Redpanda unavailable, customer notifications go to the log");
            Arc::new(LogNotificationChannel)
        }
    };

    let (media, stocks) = demo_catalog();
    schema::seed_stock(&session, &stocks).await?;

    let order_store = ScyllaOrderStore::new(session.clone());
    order_store.release_abandoned().await?;

    let coordinator = OrderSubmissionCoordinator::new(
        funds_transfer,
        delivery,
        Arc::new(order_store),
        notifications,
        metrics.clone(),
        SagaSettings::from(&settings),
    );

    // === 4. Order submission actor ===
    let submissions = OrderSubmissionActor::new(Arc::new(coordinator)).start();

    // === 5. Demo order: 2 × 5.00 + 2 × 2.50 = 15.00 ===
    tracing::info!("📝 Submitting demo order");
    let order = Order::new(
        demo_customer(),
        media.into_iter().map(|m| OrderItem::new(m, 2)).collect(),
    );

    match submissions.send(SubmitOrder { order }).await? {
        Ok(order_number) => tracing::info!(%order_number, "✅ Demo order placed"),
        Err(failure) => tracing::warn!(
            order_number = %failure.order_number,
            error = %failure.error,
            funds_captured = failure.funds_captured,
            "Demo order failed"
        ),
    }

    tracing::info!("⏳ Running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down");
    System::current().stop();

    Ok(())
}

fn demo_catalog() -> (Vec<Media>, Vec<Stock>) {
    let media = vec![
        Media {
            id: MediaId(Uuid::from_u128(0x5a1e_0000_0000_4000_8000_0000_0000_0001)),
            title: "The Matrix".to_string(),
            price: Money::from_minor(500),
        },
        Media {
            id: MediaId(Uuid::from_u128(0x5a1e_0000_0000_4000_8000_0000_0000_0002)),
            title: "Alien".to_string(),
            price: Money::from_minor(250),
        },
    ];
    let stocks = media
        .iter()
        .map(|m| Stock {
            media_id: m.id,
            quantity_on_hand: 10,
        })
        .collect();

    (media, stocks)
}

fn demo_customer() -> Customer {
    Customer {
        id: Uuid::from_u128(0xc0ffee_0000_4000_8000_0000_0000_0456),
        email: Email::new("customer@videostore.example"),
        address: "1 Customer Street".to_string(),
        bank_account_number: DEMO_CUSTOMER_ACCOUNT,
        login_credential: LoginCredential {
            id: Uuid::from_u128(0xc0ffee_0000_4000_8000_0000_0000_1456),
            user_name: "customer".to_string(),
        },
    }
}
