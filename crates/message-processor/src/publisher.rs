#![allow(dead_code)]
/*!
 * Delivery Job Publisher
 *
 * Publishes webhook delivery jobs to Redis Queue for Webhook Delivery service.
 *
 * ## Architecture
 *
 * ```text
 * Message Processor          Redis Queue          Webhook Delivery
 * ─────────────────         ───────────          ────────────────
 *         │                       │                       │
 *         ├─ LPUSH delivery_queue │                       │
 *         │  {                    │                       │
 *         │    endpoint_id,       │                       │
 *         │    event_data,        │                       │
 *         │    attempt: 1         │                       │
 *         │  }                    │                       │
 *         │                       │                       │
 *         │                       │<──────────────────────┤
 *         │                       │  BRPOP delivery_queue │
 *         │                       │  timeout=5            │
 *         │                       │                       │
 *         │                       ├───────────────────────>
 *         │                       │  Return job           │
 * ```
 *
 * ## Job Format
 *
 * ```json
 * {
 *   "endpoint_id": "550e8400-e29b-41d4-a716-446655440000",
 *   "url": "https://example.com/webhook",
 *   "hmac_secret": "secret123",
 *   "event": {
 *     "chain_id": 1,
 *     "block_number": 18000000,
 *     "transaction_hash": "0xabc...",
 *     "contract_address": "0xA0b...",
 *     "topics": ["0xddf..."],
 *     "data": "0x...",
 *     "timestamp": 1696800000
 *   },
 *   "attempt": 1,
 *   "max_retries": 5,
 *   "timeout_seconds": 30
 * }
 * ```
 *
 * ## Why Redis Queue vs Stream?
 *
 * - **Queue (LIST)**: FIFO, blocking pop, simpler for worker pattern
 * - **Stream**: Ordered log, consumer groups, replay capability
 *
 * We use Queue here because:
 * 1. Simple worker pool pattern (Webhook Delivery workers)
 * 2. Don't need replay (failed jobs handled via retries)
 * 3. BRPOP is simpler than XREADGROUP
 */

use anyhow::{Context, Result};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::consumer::StreamEvent;
use crate::matcher::MatchedEndpoint;

/// Sorted-set holding jobs deferred past their original due time: either
/// rate-limited by this publisher's admission control, or (from the
/// Delivery service) held back for a failed-attempt backoff. Scored by
/// due-time in unix milliseconds.
const RETRY_ZSET: &str = "delivery_retry";

/// Delivery job for webhook delivery service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryJob {
    /// Job UUID, generated once when the job is first created
    pub job_id: Uuid,

    /// Endpoint UUID
    pub endpoint_id: Uuid,

    /// Application UUID
    pub application_id: Uuid,

    /// Webhook URL
    pub url: String,

    /// HMAC secret for signature
    pub hmac_secret: String,

    /// Blockchain event data
    pub event: StreamEvent,

    /// Current attempt number
    pub attempt: u32,

    /// Maximum retry attempts
    pub max_retries: i32,

    /// HTTP timeout in seconds
    pub timeout_seconds: i32,

    /// Rate limit (requests per second)
    pub rate_limit_per_second: i32,

    /// Unix ms when this job was first created (not re-stamped on requeue)
    pub enqueued_at: i64,
}

/// Redis Queue publisher for delivery jobs
pub struct DeliveryPublisher {
    /// Redis connection manager
    client: redis::aio::ConnectionManager,

    /// Queue name
    queue_name: String,

    /// Per-endpoint admission window: (unix second, jobs admitted in that
    /// second). Rate limiting lives here rather than in the Delivery
    /// service: admission is checked once, at the moment a job would enter
    /// `delivery_queue`, not re-checked on every retry.
    admission_windows: HashMap<Uuid, (u64, u32)>,
}

impl DeliveryPublisher {
    /// Create new delivery publisher
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL
    /// * `queue_name` - Queue name (default: "delivery_queue")
    pub async fn new(redis_url: &str, queue_name: &str) -> Result<Self> {
        info!(
            "Connecting to Redis for delivery publishing at {}",
            redis_url
        );

        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        info!("✅ Connected to Redis Queue successfully");

        Ok(Self {
            client: conn,
            queue_name: queue_name.to_string(),
            admission_windows: HashMap::new(),
        })
    }

    /// Check whether one more job may be admitted for `endpoint_id` in the
    /// current second, under `rate_limit_per_second`. Resets the window
    /// whenever the wall-clock second advances.
    fn admit(&mut self, endpoint_id: Uuid, rate_limit_per_second: i32) -> bool {
        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self::check_admission(
            &mut self.admission_windows,
            endpoint_id,
            rate_limit_per_second,
            now_secs,
        )
    }

    /// Pure admission check, factored out of `admit` so the windowing logic
    /// can be tested without a Redis connection.
    fn check_admission(
        windows: &mut HashMap<Uuid, (u64, u32)>,
        endpoint_id: Uuid,
        rate_limit_per_second: i32,
        now_secs: u64,
    ) -> bool {
        let limit = rate_limit_per_second.max(0) as u32;
        let entry = windows.entry(endpoint_id).or_insert((now_secs, 0));

        if entry.0 != now_secs {
            *entry = (now_secs, 0);
        }

        if entry.1 >= limit {
            return false;
        }

        entry.1 += 1;
        true
    }

    /// Publish delivery job to queue
    ///
    /// Uses LPUSH to add job to the left side of the queue.
    /// Webhook Delivery service uses BRPOP to read from right side (FIFO).
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Matched endpoint configuration
    /// * `event` - Blockchain event to deliver
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Job published successfully
    /// * `Err(_)` - Redis connection or serialization error
    pub async fn publish(&mut self, endpoint: &MatchedEndpoint, event: &StreamEvent) -> Result<()> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let job = DeliveryJob {
            job_id: Uuid::new_v4(),
            endpoint_id: endpoint.endpoint_id,
            application_id: endpoint.application_id,
            url: endpoint.url.clone(),
            hmac_secret: endpoint.hmac_secret.clone(),
            event: event.clone(),
            attempt: 1,
            max_retries: endpoint.max_retries,
            timeout_seconds: endpoint.timeout_seconds,
            rate_limit_per_second: endpoint.rate_limit_per_second,
            enqueued_at: now_ms,
        };

        if !self.admit(endpoint.endpoint_id, endpoint.rate_limit_per_second) {
            warn!(
                "Endpoint {} exceeded {}/s admission limit, deferring event {}",
                endpoint.endpoint_id, endpoint.rate_limit_per_second, event.transaction_hash
            );
            crate::metrics::JOBS_RATE_LIMITED_TOTAL
                .with_label_values(&[&endpoint.endpoint_id.to_string()])
                .inc();
            return self.defer(&job, 1_000).await;
        }

        self.enqueue(&job).await?;

        debug!(
            "Published delivery job: endpoint={} event={}",
            endpoint.endpoint_id, event.transaction_hash
        );

        Ok(())
    }

    /// Push a job directly onto `delivery_queue`.
    async fn enqueue(&mut self, job: &DeliveryJob) -> Result<()> {
        let job_json = serde_json::to_string(job).context("Failed to serialize delivery job")?;

        let _: () = self
            .client
            .lpush(&self.queue_name, &job_json)
            .await
            .context("Failed to push job to queue")?;

        Ok(())
    }

    /// Push a job onto the `delivery_retry` sorted-set, due `delay_ms`
    /// from now. The Delivery service's scheduler moves it to
    /// `delivery_queue` once its due-time elapses.
    async fn defer(&mut self, job: &DeliveryJob, delay_ms: i64) -> Result<()> {
        let job_json = serde_json::to_string(job).context("Failed to serialize delivery job")?;

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let due_at = (now_ms + delay_ms) as f64;

        let _: () = self
            .client
            .zadd(RETRY_ZSET, &job_json, due_at)
            .await
            .context("Failed to defer job onto retry sorted-set")?;

        Ok(())
    }

    /// Publish multiple jobs in a pipeline (batch operation)
    ///
    /// More efficient than calling publish() in a loop.
    /// Uses Redis pipelining to send all LPUSH commands at once.
    ///
    /// # Arguments
    ///
    /// * `jobs` - Vector of (endpoint, event) tuples
    ///
    /// # Returns
    ///
    /// Number of jobs published
    #[allow(dead_code)]
    pub async fn publish_batch(
        &mut self,
        jobs: Vec<(&MatchedEndpoint, &StreamEvent)>,
    ) -> Result<usize> {
        if jobs.is_empty() {
            return Ok(0);
        }

        let mut pipe = redis::pipe();

        for (endpoint, event) in &jobs {
            let now_ms = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);

            let job = DeliveryJob {
                job_id: Uuid::new_v4(),
                endpoint_id: endpoint.endpoint_id,
                application_id: endpoint.application_id,
                url: endpoint.url.clone(),
                hmac_secret: endpoint.hmac_secret.clone(),
                event: (*event).clone(),
                attempt: 1,
                max_retries: endpoint.max_retries,
                timeout_seconds: endpoint.timeout_seconds,
                rate_limit_per_second: endpoint.rate_limit_per_second,
                enqueued_at: now_ms,
            };

            let job_json =
                serde_json::to_string(&job).context("Failed to serialize delivery job")?;

            pipe.lpush(&self.queue_name, &job_json);
        }

        // Execute pipeline
        let _: () = pipe
            .query_async(&mut self.client)
            .await
            .context("Failed to execute pipeline")?;

        let count = jobs.len();
        debug!("Published {} delivery jobs in batch", count);

        Ok(count)
    }

    /// Get queue statistics
    ///
    /// Returns number of jobs waiting in queue.
    pub async fn queue_length(&mut self) -> Result<usize> {
        let length: usize = self
            .client
            .llen(&self.queue_name)
            .await
            .context("Failed to get queue length")?;

        Ok(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_admission_enforces_rate_limit_per_second() {
        let mut windows = HashMap::new();
        let endpoint_id = Uuid::new_v4();

        for _ in 0..5 {
            assert!(DeliveryPublisher::check_admission(
                &mut windows,
                endpoint_id,
                5,
                1_000,
            ));
        }

        // Sixth job in the same second is over the limit.
        assert!(!DeliveryPublisher::check_admission(
            &mut windows,
            endpoint_id,
            5,
            1_000,
        ));

        // A new second resets the window.
        assert!(DeliveryPublisher::check_admission(
            &mut windows,
            endpoint_id,
            5,
            1_001,
        ));
    }

    #[test]
    fn test_check_admission_is_independent_per_endpoint() {
        let mut windows = HashMap::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        for _ in 0..3 {
            assert!(DeliveryPublisher::check_admission(&mut windows, a, 3, 1_000));
        }
        assert!(!DeliveryPublisher::check_admission(&mut windows, a, 3, 1_000));

        // Endpoint b has its own budget.
        assert!(DeliveryPublisher::check_admission(&mut windows, b, 3, 1_000));
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_publisher_creation() {
        let publisher = DeliveryPublisher::new("redis://localhost:6379", "test_delivery_queue")
            .await
            .unwrap();

        assert_eq!(publisher.queue_name, "test_delivery_queue");
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_publish_job() {
        let mut publisher = DeliveryPublisher::new("redis://localhost:6379", "test_delivery_queue")
            .await
            .unwrap();

        let endpoint = MatchedEndpoint {
            endpoint_id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            url: "https://example.com/webhook".to_string(),
            hmac_secret: "secret123".to_string(),
            rate_limit_per_second: 10,
            max_retries: 5,
            timeout_seconds: 30,
        };

        let event = StreamEvent {
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

        publisher.publish(&endpoint, &event).await.unwrap();

        let length = publisher.queue_length().await.unwrap();
        assert!(length > 0);
    }
}
