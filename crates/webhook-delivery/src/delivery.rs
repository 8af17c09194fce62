/*!
 * Webhook Delivery Module
 *
 * Sends HTTP POST requests to customer webhooks with HMAC signatures.
 */

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::consumer::{DeliveryJob, EventData};

/// Upper bound on outstanding HTTP requests across all workers, so raising
/// `worker_count` can never open more file descriptors than this.
const MAX_INFLIGHT: usize = 1000;

/// Webhook delivery result
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub response_body: Option<String>,
    pub error_message: Option<String>,
    pub duration_ms: u64,
    pub should_retry: bool,
}

/// Webhook delivery service
pub struct WebhookDelivery {
    /// HTTP client with timeout
    client: Client,

    /// Bounds the number of outgoing requests in flight at once, regardless
    /// of how many workers are calling `deliver` concurrently.
    inflight: Arc<Semaphore>,
}

impl WebhookDelivery {
    /// Create new webhook delivery service
    ///
    /// # Arguments
    ///
    /// * `http_timeout` - Timeout per HTTP request
    pub fn new(http_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(http_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            inflight: Arc::new(Semaphore::new(MAX_INFLIGHT)),
        })
    }

    /// Deliver webhook to endpoint
    ///
    /// # Arguments
    ///
    /// * `job` - Delivery job with endpoint URL and event data
    ///
    /// # Returns
    ///
    /// DeliveryResult with success status and details
    pub async fn deliver(&self, job: &DeliveryJob) -> Result<DeliveryResult> {
        let start = Instant::now();

        // Build webhook payload
        let payload = self.build_payload(&job.event);
        let payload_json =
            serde_json::to_string(&payload).context("Failed to serialize payload")?;

        // Calculate HMAC signature over the exact bytes we're about to send
        let signature = format!(
            "sha256={}",
            ethhook_common::sign_hmac(&payload_json, &job.hmac_secret)
        );

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        debug!(
            "Sending webhook to {} (endpoint: {}, attempt: {})",
            &job.url[..30.min(job.url.len())],
            job.endpoint_id,
            job.attempt
        );

        // Bound total outgoing requests regardless of worker count.
        let _permit = self
            .inflight
            .acquire()
            .await
            .context("Delivery semaphore closed")?;

        // Send POST request
        let response_result = self
            .client
            .post(&job.url)
            .header("Content-Type", "application/json")
            .header("X-Webhook-Signature", signature)
            .header("X-Webhook-Event-Id", job.event.event_id())
            .header("X-Webhook-Delivery-Attempt", job.attempt.to_string())
            .header("X-Webhook-Timestamp", timestamp.to_string())
            .header("X-Chain-Id", job.event.chain_id.to_string())
            .body(payload_json)
            .send()
            .await;

        let duration_ms = start.elapsed().as_millis() as u64;

        // Process response
        match response_result {
            Ok(response) => {
                let status = response.status();
                let status_code = status.as_u16();

                // Read response body (limit to 10KB)
                let body_result = response.text().await;
                let response_body = body_result
                    .ok()
                    .map(|b| b.chars().take(10000).collect::<String>());

                let success = status.is_success();
                let should_retry = !success && crate::retry::is_retryable_error(Some(status_code));

                if success {
                    info!(
                        "✅ Webhook delivered successfully: endpoint={} status={} duration={}ms",
                        job.endpoint_id, status_code, duration_ms
                    );
                } else {
                    warn!(
                        "⚠️  Webhook delivery failed: endpoint={} status={} duration={}ms retry={}",
                        job.endpoint_id, status_code, duration_ms, should_retry
                    );
                }

                Ok(DeliveryResult {
                    success,
                    status_code: Some(status_code),
                    response_body,
                    error_message: None,
                    duration_ms,
                    should_retry,
                })
            }
            Err(e) => {
                let error_message = e.to_string();

                // Determine if error is retryable
                let should_retry = if e.is_timeout() || e.is_connect() {
                    true // Network errors - retry
                } else if e.is_status() {
                    // Status code error - check if retryable
                    e.status()
                        .map(|s| crate::retry::is_retryable_error(Some(s.as_u16())))
                        .unwrap_or(true)
                } else {
                    true // Unknown error - retry to be safe
                };

                error!(
                    "❌ Webhook delivery error: endpoint={} error={} duration={}ms retry={}",
                    job.endpoint_id, error_message, duration_ms, should_retry
                );

                Ok(DeliveryResult {
                    success: false,
                    status_code: None,
                    response_body: None,
                    error_message: Some(error_message),
                    duration_ms,
                    should_retry,
                })
            }
        }
    }

    /// Build webhook payload from event data
    fn build_payload(&self, event: &EventData) -> serde_json::Value {
        json!({
            "event_id": event.event_id(),
            "chain_id": event.chain_id,
            "chain_name": event.chain_name,
            "block_number": event.block_number,
            "block_hash": event.block_hash,
            "transaction_hash": event.transaction_hash,
            "log_index": event.log_index,
            "contract_address": event.contract_address,
            "topics": event.topics,
            "data": event.data,
            "timestamp": event.timestamp,
        })
    }
}

/// Maximum stored length (bytes) for `error_message` in the analytics log.
const MAX_ERROR_MESSAGE_BYTES: usize = 1024;

/// Truncate a string to at most `max_bytes` bytes, respecting UTF-8
/// character boundaries.
fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Log a delivery attempt to the analytics log
pub async fn log_delivery_attempt(
    pool: &sqlx::PgPool,
    job: &DeliveryJob,
    result: &DeliveryResult,
) -> Result<()> {
    let error_message = result
        .error_message
        .as_deref()
        .map(|m| truncate_to_bytes(m, MAX_ERROR_MESSAGE_BYTES));

    sqlx::query(
        r#"
        INSERT INTO delivery_attempts (
            event_id,
            endpoint_id,
            attempt_number,
            http_status_code,
            response_body,
            error_message,
            duration_ms,
            success,
            should_retry
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(job.event.event_id())
    .bind(job.endpoint_id)
    .bind(job.attempt as i32)
    .bind(result.status_code.map(|c| c as i32))
    .bind(&result.response_body)
    .bind(error_message)
    .bind(result.duration_ms as i32)
    .bind(result.success)
    .bind(result.should_retry)
    .execute(pool)
    .await
    .context("Failed to log delivery attempt")?;

    debug!(
        "Logged delivery attempt: endpoint={} attempt={} success={}",
        job.endpoint_id, job.attempt, result.success
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_webhook_delivery_creation() {
        // Verify the delivery instance can be created successfully
        let result = WebhookDelivery::new(Duration::from_secs(30));
        assert!(result.is_ok());
    }

    #[test]
    fn test_build_payload() {
        let delivery = WebhookDelivery::new(Duration::from_secs(30)).unwrap();

        let event = EventData {
            chain_id: 1,
            chain_name: "Ethereum Mainnet".to_string(),
            block_number: 18000000,
            block_hash: "0xabc123".to_string(),
            transaction_hash: "0xdef456".to_string(),
            log_index: 5,
            contract_address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
            topics: vec![
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef".to_string(),
            ],
            data: "0x".to_string(),
            timestamp: 1696800000,
        };

        let payload = delivery.build_payload(&event);

        assert_eq!(payload["event_id"], "event:1:0xdef456:5");
        assert_eq!(payload["chain_id"], 1);
        assert_eq!(payload["chain_name"], "Ethereum Mainnet");
        assert_eq!(payload["block_number"], 18000000);
        assert_eq!(payload["transaction_hash"], "0xdef456");
    }

    #[test]
    fn test_truncate_to_bytes() {
        let short = "connection reset by peer";
        assert_eq!(truncate_to_bytes(short, MAX_ERROR_MESSAGE_BYTES), short);

        let long = "e".repeat(2000);
        let truncated = truncate_to_bytes(&long, MAX_ERROR_MESSAGE_BYTES);
        assert_eq!(truncated.len(), MAX_ERROR_MESSAGE_BYTES);

        // Truncation never splits a multi-byte character.
        let multibyte = "€".repeat(500); // 3 bytes each, 1500 bytes total
        let truncated = truncate_to_bytes(&multibyte, MAX_ERROR_MESSAGE_BYTES);
        assert!(truncated.len() <= MAX_ERROR_MESSAGE_BYTES);
        assert!(truncated.is_char_boundary(truncated.len()));
    }
}
