/*!
 * Configuration Module
 *
 * Loads environment variables and validates configuration.
 * Similar to Spring's @ConfigurationProperties in Java.
 */

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;

/// Main configuration for the Event Ingestor service
#[derive(Debug, Clone)]
pub struct IngestorConfig {
    /// List of chains to ingest from
    pub chains: Vec<ChainConfig>,

    /// Redis connection settings
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_password: Option<String>,

    /// Metrics server port (for Prometheus)
    pub metrics_port: u16,

    /// Deduplication TTL in seconds (default: 24 hours)
    pub dedup_ttl_seconds: u64,

    /// Stream MAXLEN for XTRIM (default: ~1,000,000)
    pub stream_maxlen: usize,
}

/// Configuration for a single blockchain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Human-readable name (e.g., "Ethereum Mainnet")
    pub name: String,

    /// Chain ID (e.g., 1 for Ethereum, 42161 for Arbitrum)
    pub chain_id: u64,

    /// WebSocket RPC endpoint (e.g., "wss://eth-mainnet.g.alchemy.com/v2/YOUR_KEY")
    pub ws_url: String,

    /// HTTP RPC endpoint. Not used by the current ingestion path (subscribe,
    /// getBlockByNumber, and getTransactionReceipt all go over the same
    /// WebSocket), kept for parity with the Chain record and future use.
    pub http_url: Option<String>,

    /// Maximum reconnection attempts before giving up
    pub max_reconnect_attempts: u32,

    /// Initial reconnection delay in seconds
    pub reconnect_delay_secs: u64,
}

impl IngestorConfig {
    /// Load configuration from environment variables
    ///
    /// Chains are config-driven, not hardcoded: set `CHAIN_1_NAME`,
    /// `CHAIN_1_ID`, `CHAIN_1_WS_URL` (and optionally `CHAIN_1_HTTP_URL`) for
    /// the first chain, `CHAIN_2_*` for the second, and so on. Loading stops
    /// at the first missing `CHAIN_<N>_NAME`. At least one chain is required.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        // Redis configuration
        let redis_host = env::var("REDIS_HOST").context("REDIS_HOST not set")?;
        let redis_port = env::var("REDIS_PORT")
            .context("REDIS_PORT not set")?
            .parse::<u16>()
            .context("REDIS_PORT must be a valid port number")?;
        let redis_password = env::var("REDIS_PASSWORD").ok();

        // Metrics configuration
        let metrics_port = env::var("METRICS_PORT")
            .unwrap_or_else(|_| "9090".to_string())
            .parse::<u16>()
            .context("METRICS_PORT must be a valid port number")?;

        // Deduplication TTL (default: 24 hours)
        let dedup_ttl_seconds = env::var("DEDUP_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse::<u64>()
            .context("DEDUP_TTL_SECONDS must be a valid number")?;

        let stream_maxlen = env::var("STREAM_MAXLEN")
            .unwrap_or_else(|_| "1000000".to_string())
            .parse::<usize>()
            .context("STREAM_MAXLEN must be a valid number")?;

        let chains = Self::load_chains()?;

        Ok(IngestorConfig {
            chains,
            redis_host,
            redis_port,
            redis_password,
            metrics_port,
            dedup_ttl_seconds,
            stream_maxlen,
        })
    }

    /// Load `CHAIN_1_*`, `CHAIN_2_*`, ... until `CHAIN_<N>_NAME` is unset.
    fn load_chains() -> Result<Vec<ChainConfig>> {
        let mut chains = Vec::new();
        let mut n = 1;

        loop {
            let name_var = format!("CHAIN_{n}_NAME");
            let Ok(name) = env::var(&name_var) else {
                break;
            };

            let chain_id = env::var(format!("CHAIN_{n}_ID"))
                .with_context(|| format!("CHAIN_{n}_ID not set (required alongside {name_var})"))?
                .parse::<u64>()
                .with_context(|| format!("CHAIN_{n}_ID must be a valid chain id"))?;

            let ws_url = env::var(format!("CHAIN_{n}_WS_URL"))
                .with_context(|| format!("CHAIN_{n}_WS_URL not set"))?;

            let http_url = env::var(format!("CHAIN_{n}_HTTP_URL")).ok();

            let max_reconnect_attempts = env::var(format!("CHAIN_{n}_MAX_RECONNECT_ATTEMPTS"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10);

            let reconnect_delay_secs = env::var(format!("CHAIN_{n}_RECONNECT_DELAY_SECS"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1);

            chains.push(ChainConfig {
                name,
                chain_id,
                ws_url,
                http_url,
                max_reconnect_attempts,
                reconnect_delay_secs,
            });

            n += 1;
        }

        if chains.is_empty() {
            bail!(
                "No chains configured. Set CHAIN_1_NAME, CHAIN_1_ID, CHAIN_1_WS_URL (and so on for CHAIN_2_*, ...)."
            );
        }

        Ok(chains)
    }

    /// Get Redis connection URL
    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!(
                "redis://:{}@{}:{}/",
                password, self.redis_host, self.redis_port
            ),
            None => format!("redis://{}:{}/", self.redis_host, self.redis_port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_url_without_password() {
        let config = IngestorConfig {
            chains: vec![],
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_password: None,
            metrics_port: 9090,
            dedup_ttl_seconds: 86400,
            stream_maxlen: 1_000_000,
        };

        assert_eq!(config.redis_url(), "redis://localhost:6379/");
    }

    #[test]
    fn test_redis_url_with_password() {
        let config = IngestorConfig {
            chains: vec![],
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_password: Some("secret123".to_string()),
            metrics_port: 9090,
            dedup_ttl_seconds: 86400,
            stream_maxlen: 1_000_000,
        };

        assert_eq!(config.redis_url(), "redis://:secret123@localhost:6379/");
    }

    #[test]
    fn test_load_chains_stops_at_first_gap() {
        // SAFETY: test runs single-threaded within this process's env;
        // no other test in this module touches CHAIN_* variables.
        unsafe {
            env::set_var("CHAIN_1_NAME", "Test Chain");
            env::set_var("CHAIN_1_ID", "1");
            env::set_var("CHAIN_1_WS_URL", "wss://example.test");
            env::remove_var("CHAIN_2_NAME");
        }

        let chains = IngestorConfig::load_chains().expect("should load one chain");
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].chain_id, 1);
        assert_eq!(chains[0].max_reconnect_attempts, 10);

        unsafe {
            env::remove_var("CHAIN_1_NAME");
            env::remove_var("CHAIN_1_ID");
            env::remove_var("CHAIN_1_WS_URL");
        }
    }
}
