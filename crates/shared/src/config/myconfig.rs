use crate::repository::TableNames;
use anyhow::{Context, Result, anyhow};
use tracing::warn;

const DEMO_JWT_SECRET: &str = "super-secret-jwt-key-change-in-production";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventBusBackend {
    Memory,
    Kafka,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_min_conn: u32,
    pub db_max_conn: u32,
    pub run_migrations: bool,
    pub tables: TableNames,
    pub jwt_secret: String,
    pub event_bus: EventBusBackend,
    pub kafka_broker: Option<String>,
    pub reconciler_batch_size: usize,
    pub is_dev: bool,
    pub enable_file_log: bool,
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let store_backend = match lookup("STORE_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres,
            other => {
                return Err(anyhow!(
                    "STORE_BACKEND must be 'memory' or 'postgres', got '{}'",
                    other
                ));
            }
        };

        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("Missing environment variable: DATABASE_URL"));
        }

        let db_min_conn = lookup("DB_MIN_CONN")
            .unwrap_or_else(|| "1".into())
            .parse::<u32>()
            .context("DB_MIN_CONN must be a valid u32 integer")?;

        let db_max_conn = lookup("DB_MAX_CONN")
            .unwrap_or_else(|| "5".into())
            .parse::<u32>()
            .context("DB_MAX_CONN must be a valid u32 integer")?;

        let run_migrations = parse_bool("RUN_MIGRATIONS", lookup("RUN_MIGRATIONS"))?;

        let tables = TableNames::new(
            lookup("PRODUCTS_TABLE").as_deref().unwrap_or("products"),
            lookup("ORDERS_TABLE").as_deref().unwrap_or("orders"),
        )
        .context("invalid PRODUCTS_TABLE/ORDERS_TABLE")?;

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("⚠️ JWT_SECRET not set, using the demo secret");
                DEMO_JWT_SECRET.to_string()
            }
        };

        let event_bus = match lookup("EVENT_BUS").as_deref().unwrap_or("memory") {
            "memory" => EventBusBackend::Memory,
            "kafka" => EventBusBackend::Kafka,
            other => {
                return Err(anyhow!(
                    "EVENT_BUS must be 'memory' or 'kafka', got '{}'",
                    other
                ));
            }
        };

        let kafka_broker = lookup("KAFKA");
        if event_bus == EventBusBackend::Kafka && kafka_broker.is_none() {
            return Err(anyhow!("Missing environment variable: KAFKA"));
        }

        let reconciler_batch_size = lookup("RECONCILER_BATCH_SIZE")
            .unwrap_or_else(|| "10".into())
            .parse::<usize>()
            .context("RECONCILER_BATCH_SIZE must be a positive integer")?
            .max(1);

        let is_dev = parse_bool("DEV_MODE", lookup("DEV_MODE"))?;
        let enable_file_log = parse_bool("ENABLE_FILE_LOG", lookup("ENABLE_FILE_LOG"))?;

        Ok(Self {
            port,
            store_backend,
            database_url,
            db_min_conn,
            db_max_conn,
            run_migrations,
            tables,
            jwt_secret,
            event_bus,
            kafka_broker,
            reconciler_batch_size,
            is_dev,
            enable_file_log,
        })
    }
}

fn parse_bool(name: &str, value: Option<String>) -> Result<bool> {
    match value.as_deref() {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(anyhow!("{name} must be 'true' or 'false', got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_run_fully_in_memory() {
        let config = config(&[]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.event_bus, EventBusBackend::Memory);
        assert_eq!(config.tables, TableNames::default());
        assert_eq!(config.reconciler_batch_size, 10);
        assert_eq!(config.jwt_secret, DEMO_JWT_SECRET);
        assert!(!config.run_migrations);
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(config(&[("STORE_BACKEND", "postgres")]).is_err());

        let config = config(&[
            ("STORE_BACKEND", "postgres"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("PRODUCTS_TABLE", "shop_products"),
            ("RUN_MIGRATIONS", "true"),
        ])
        .unwrap();
        assert_eq!(config.tables.products, "shop_products");
        assert!(config.run_migrations);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("PORT", "http")]).is_err());
        assert!(config(&[("RUN_MIGRATIONS", "yes")]).is_err());
        assert!(config(&[("EVENT_BUS", "kafka")]).is_err());
        assert!(config(&[("ORDERS_TABLE", "orders;--")]).is_err());
    }
}
