use scylla::client::session::Session;

use crate::domain::account::Account;
use crate::domain::order::Stock;

pub(super) const BANK_PARTITION: &str = "bank";

/// Create the keyspace and tables if missing, then switch the session to the keyspace
pub async fn ensure_schema(session: &Session, keyspace: &str) -> anyhow::Result<()> {
    session
        .query_unpaged(
            format!(
                "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                 {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                keyspace
            ),
            &[],
        )
        .await?;

    session.use_keyspace(keyspace, false).await?;

    session
        .query_unpaged(
            "CREATE TABLE IF NOT EXISTS stocks (
                media_id uuid PRIMARY KEY,
                quantity_on_hand bigint
            )",
            &[],
        )
        .await?;

    session
        .query_unpaged(
            "CREATE TABLE IF NOT EXISTS orders (
                order_number uuid PRIMARY KEY,
                status text,
                customer_id uuid,
                total_minor bigint,
                items text,
                delivery text,
                stock_updates text,
                placed_at timestamp
            )",
            &[],
        )
        .await?;

    session
        .query_unpaged(
            "CREATE TABLE IF NOT EXISTS bank_ledger (
                bank text,
                entry_key text,
                balance_minor bigint,
                version bigint,
                PRIMARY KEY (bank, entry_key)
            )",
            &[],
        )
        .await?;

    tracing::info!(keyspace, "ScyllaDB schema ready");
    Ok(())
}

/// Insert accounts that do not exist yet; existing balances are left alone
pub async fn seed_accounts(session: &Session, accounts: &[Account]) -> anyhow::Result<()> {
    for account in accounts {
        session
            .query_unpaged(
                "INSERT INTO bank_ledger (bank, entry_key, balance_minor, version)
                 VALUES (?, ?, ?, 0) IF NOT EXISTS",
                (
                    BANK_PARTITION,
                    account_key(account.account_number.0),
                    account.balance.minor(),
                ),
            )
            .await?;
    }
    Ok(())
}

/// Insert stock rows that do not exist yet
pub async fn seed_stock(session: &Session, stocks: &[Stock]) -> anyhow::Result<()> {
    for stock in stocks {
        session
            .query_unpaged(
                "INSERT INTO stocks (media_id, quantity_on_hand) VALUES (?, ?) IF NOT EXISTS",
                (stock.media_id.0, i64::from(stock.quantity_on_hand)),
            )
            .await?;
    }
    Ok(())
}

pub(super) fn account_key(account_number: i32) -> String {
    format!("account:{}", account_number)
}

pub(super) fn transfer_key(token: uuid::Uuid) -> String {
    format!("transfer:{}", token)
}
