//! Service settings, loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::account::AccountNumber;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Timeout and retry budget shared by the remote clients
#[derive(Debug, Clone)]
pub struct RpcSettings {
    pub timeout: Duration,
    pub retry_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub scylla_nodes: Vec<String>,
    pub scylla_keyspace: String,
    /// `None` runs the bank ledger in-process on ScyllaDB
    pub bank_endpoint: Option<String>,
    pub delivery_endpoint: String,
    pub delivery_notification_address: String,
    pub store_account_number: AccountNumber,
    pub store_address: String,
    pub redpanda_brokers: String,
    pub notification_topic: String,
    pub rpc: RpcSettings,
    pub metrics_port: u16,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scylla_nodes: vec!["127.0.0.1:9042".to_string()],
            scylla_keyspace: "video_store".to_string(),
            bank_endpoint: None,
            delivery_endpoint: "http://127.0.0.1:50052".to_string(),
            delivery_notification_address: "net.tcp://localhost:9010/DeliveryNotificationService"
                .to_string(),
            store_account_number: AccountNumber(123),
            store_address: "Video Store Address".to_string(),
            redpanda_brokers: "127.0.0.1:9092".to_string(),
            notification_topic: "customer-notifications".to_string(),
            rpc: RpcSettings {
                timeout: Duration::from_millis(5000),
                retry_attempts: 3,
            },
            metrics_port: 9090,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any variable source; unset variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(nodes) = var("SCYLLA_NODES") {
            settings.scylla_nodes = nodes.split(',').map(|n| n.trim().to_string()).collect();
        }
        if let Some(keyspace) = var("SCYLLA_KEYSPACE") {
            settings.scylla_keyspace = keyspace;
        }
        settings.bank_endpoint = var("BANK_ENDPOINT");
        if let Some(endpoint) = var("DELIVERY_ENDPOINT") {
            settings.delivery_endpoint = endpoint;
        }
        if let Some(address) = var("DELIVERY_NOTIFICATION_ADDRESS") {
            settings.delivery_notification_address = address;
        }
        if let Some(raw) = var("STORE_ACCOUNT_NUMBER") {
            settings.store_account_number = AccountNumber(parse("STORE_ACCOUNT_NUMBER", &raw)?);
        }
        if let Some(address) = var("STORE_ADDRESS") {
            settings.store_address = address;
        }
        if let Some(brokers) = var("REDPANDA_BROKERS") {
            settings.redpanda_brokers = brokers;
        }
        if let Some(topic) = var("NOTIFICATION_TOPIC") {
            settings.notification_topic = topic;
        }
        if let Some(raw) = var("RPC_TIMEOUT_MS") {
            settings.rpc.timeout = Duration::from_millis(parse("RPC_TIMEOUT_MS", &raw)?);
        }
        if let Some(raw) = var("RPC_RETRY_ATTEMPTS") {
            settings.rpc.retry_attempts = parse("RPC_RETRY_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = var("METRICS_PORT") {
            settings.metrics_port = parse("METRICS_PORT", &raw)?;
        }
        settings.log_file = var("LOG_FILE").map(PathBuf::from);

        Ok(settings)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.store_account_number, AccountNumber(123));
        assert_eq!(settings.store_address, "Video Store Address");
        assert!(settings.bank_endpoint.is_none());
        assert_eq!(settings.rpc.retry_attempts, 3);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("SCYLLA_NODES", "10.0.0.1:9042, 10.0.0.2:9042"),
            ("BANK_ENDPOINT", "http://bank:50051"),
            ("RPC_TIMEOUT_MS", "250"),
            ("STORE_ACCOUNT_NUMBER", "777"),
        ]))
        .unwrap();

        assert_eq!(settings.scylla_nodes, vec!["10.0.0.1:9042", "10.0.0.2:9042"]);
        assert_eq!(settings.bank_endpoint.as_deref(), Some("http://bank:50051"));
        assert_eq!(settings.rpc.timeout, Duration::from_millis(250));
        assert_eq!(settings.store_account_number, AccountNumber(777));
    }

    #[test]
    fn test_unparseable_value_is_an_error() {
        let err = Settings::from_lookup(lookup(&[("METRICS_PORT", "ninety")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "METRICS_PORT", .. }));
    }
}
