/*!
 * Redis Stream Consumer
 *
 * Consumes events from Redis Streams using consumer groups for horizontal scaling.
 *
 * ## Consumer Groups Architecture
 *
 * ```text
 * Stream: events:1
 *    │
 *    ├──> Consumer Group "message_processors"
 *         │
 *         ├──> processor-1 (this instance)
 *         ├──> processor-2 (another pod/instance)
 *         └──> processor-3 (another pod/instance)
 * ```
 *
 * Each consumer gets a different subset of messages automatically!
 *
 * ## Commands Used
 *
 * - **XGROUP CREATE**: Create consumer group (idempotent)
 * - **XREADGROUP**: Read messages for this consumer
 * - **XACK**: Acknowledge processed messages
 * - **XPENDING**: Check for unprocessed messages
 */

use anyhow::{Context, Result};
use redis::RedisError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Processed event from Redis Stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    pub chain_id: u64,
    pub chain_name: String,
    pub block_number: u64,
    pub block_hash: String,
    pub transaction_hash: String,
    pub log_index: u32,
    pub contract_address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub timestamp: i64,
}

/// Stream entry with ID and data
#[derive(Debug, Clone)]
pub struct StreamEntry {
    pub id: String,
    pub event: StreamEvent,
}

/// Redis Stream consumer with consumer group support
pub struct StreamConsumer {
    /// Redis connection manager
    client: redis::aio::ConnectionManager,

    /// Consumer group name
    group_name: String,

    /// Consumer name (unique per instance)
    consumer_name: String,
}

impl StreamConsumer {
    /// Create new stream consumer
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL
    /// * `group_name` - Consumer group name (e.g., "message_processors")
    /// * `consumer_name` - Unique consumer name (e.g., "processor-1")
    pub async fn new(redis_url: &str, group_name: &str, consumer_name: &str) -> Result<Self> {
        info!(
            "Connecting to Redis at {} (consumer: {})",
            redis_url, consumer_name
        );

        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        info!("✅ Connected to Redis successfully");

        Ok(Self {
            client: conn,
            group_name: group_name.to_string(),
            consumer_name: consumer_name.to_string(),
        })
    }

    /// Ensure consumer group exists for a stream
    ///
    /// Creates the consumer group if it doesn't exist.
    /// Idempotent - safe to call multiple times.
    ///
    /// # Arguments
    ///
    /// * `stream_name` - Stream name (e.g., "events:1")
    pub async fn ensure_consumer_group(&mut self, stream_name: &str) -> Result<()> {
        // XGROUP CREATE stream_name group_name $ MKSTREAM
        // $ = start reading from new messages only
        // MKSTREAM = create stream if it doesn't exist
        let result: Result<String, RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(stream_name)
            .arg(&self.group_name)
            .arg("$") // Start from latest message
            .arg("MKSTREAM") // Create stream if doesn't exist
            .query_async(&mut self.client)
            .await;

        match result {
            Ok(_) => {
                info!(
                    "✅ Created consumer group '{}' for stream '{}'",
                    self.group_name, stream_name
                );
                Ok(())
            }
            Err(e) => {
                // BUSYGROUP error means group already exists - this is OK!
                if e.to_string().contains("BUSYGROUP") {
                    debug!(
                        "Consumer group '{}' already exists for stream '{}'",
                        self.group_name, stream_name
                    );
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("Failed to create consumer group: {e}"))
                }
            }
        }
    }

    /// Read events from stream using consumer group
    ///
    /// Uses XREADGROUP to read messages assigned to this consumer.
    /// Messages are automatically distributed across consumers.
    ///
    /// # Arguments
    ///
    /// * `stream_name` - Stream to read from (e.g., "events:1")
    /// * `count` - Maximum number of messages to read
    /// * `block_ms` - How long to block waiting (0 = wait forever)
    ///
    /// # Returns
    ///
    /// Vector of stream entries with IDs and parsed events
    pub async fn read_events(
        &mut self,
        stream_name: &str,
        count: usize,
        block_ms: usize,
    ) -> Result<Vec<StreamEntry>> {
        // XREADGROUP GROUP group_name consumer_name BLOCK block_ms COUNT count STREAMS stream_name >
        // > = read only new messages not yet delivered to any consumer

        debug!(
            "[{}] Starting XREADGROUP: group={}, consumer={}, block={}ms, count={}",
            stream_name, self.group_name, self.consumer_name, block_ms, count
        );

        // Use redis::Value for flexible parsing (matches integration test approach)
        let response: redis::Value = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.group_name)
            .arg(&self.consumer_name)
            .arg("BLOCK")
            .arg(block_ms)
            .arg("COUNT")
            .arg(count)
            .arg("STREAMS")
            .arg(stream_name)
            .arg(">") // Read new messages only
            .query_async(&mut self.client)
            .await
            .map_err(|e| {
                error!(
                    "XREADGROUP failed for stream '{}': {} (group: {}, consumer: {}, block: {}ms, count: {})",
                    stream_name, e, self.group_name, self.consumer_name, block_ms, count
                );
                anyhow::anyhow!("Failed to read from stream '{stream_name}': {e}")
            })?;

        let mut entries = Vec::new();

        // Parse response: XREADGROUP returns Bulk([Bulk([Data(stream_name), Bulk([entries...])])])
        if let redis::Value::Bulk(streams) = response {
            debug!(
                "[{}] XREADGROUP returned {} streams",
                stream_name,
                streams.len()
            );

            for stream_data in &streams {
                if let redis::Value::Bulk(stream_parts) = stream_data {
                    // stream_parts[0] = stream name (Data)
                    // stream_parts[1] = entries (Bulk)
                    if stream_parts.len() < 2 {
                        continue;
                    }

                    if let redis::Value::Bulk(messages) = &stream_parts[1] {
                        entries.extend(Self::parse_messages(messages));
                    }
                }
            }
        }

        debug!("Read {} events from {}", entries.len(), stream_name);

        Ok(entries)
    }

    /// Pull the entry ID and raw field list out of a
    /// `Bulk([Data(id), Bulk([key, val, ...])])` wire entry.
    fn extract_fields(message: &redis::Value) -> Option<(String, Vec<(String, String)>)> {
        let redis::Value::Bulk(entry_parts) = message else {
            return None;
        };
        if entry_parts.len() < 2 {
            return None;
        }

        let id = if let redis::Value::Data(id_bytes) = &entry_parts[0] {
            String::from_utf8_lossy(id_bytes).to_string()
        } else {
            return None;
        };

        let mut fields = Vec::new();
        if let redis::Value::Bulk(field_data) = &entry_parts[1] {
            for chunk in field_data.chunks(2) {
                if chunk.len() == 2 {
                    let key = if let redis::Value::Data(k) = &chunk[0] {
                        String::from_utf8_lossy(k).to_string()
                    } else {
                        continue;
                    };

                    let val = if let redis::Value::Data(v) = &chunk[1] {
                        String::from_utf8_lossy(v).to_string()
                    } else {
                        continue;
                    };

                    fields.push((key, val));
                }
            }
        }

        Some((id, fields))
    }

    /// Parse a Bulk([Data(id), Bulk([key, val, ...])]) list into `StreamEntry`s.
    ///
    /// Used by `read_events` (XREADGROUP). A single malformed entry is
    /// logged and dropped rather than failing the whole batch; it stays
    /// unacknowledged and is picked up again by `reclaim_idle_messages`,
    /// which tracks delivery counts and eventually dead-letters it.
    fn parse_messages(messages: &[redis::Value]) -> Vec<StreamEntry> {
        let mut entries = Vec::new();

        for message in messages {
            let Some((id, fields)) = Self::extract_fields(message) else {
                continue;
            };

            match Self::parse_stream_event(&fields) {
                Ok(event) => entries.push(StreamEntry { id, event }),
                Err(e) => warn!("Skipping malformed stream entry {}: {:?}", id, e),
            }
        }

        entries
    }

    /// Parse Redis Stream fields into StreamEvent
    fn parse_stream_event(fields: &[(String, String)]) -> Result<StreamEvent> {
        let mut chain_id = None;
        let mut chain_name = None;
        let mut block_number = None;
        let mut block_hash = None;
        let mut transaction_hash = None;
        let mut log_index = None;
        let mut contract_address = None;
        let mut topics = None;
        let mut data = None;
        let mut timestamp = None;

        for (key, value) in fields {
            match key.as_str() {
                "chain_id" => chain_id = Some(value.parse::<u64>().context("Invalid chain_id")?),
                "chain_name" => chain_name = Some(value.clone()),
                "block_number" => {
                    block_number = Some(value.parse::<u64>().context("Invalid block_number")?)
                }
                "block_hash" => block_hash = Some(value.clone()),
                "tx_hash" => transaction_hash = Some(value.clone()),
                "log_index" => log_index = Some(value.parse::<u32>().context("Invalid log_index")?),
                "contract" => contract_address = Some(value.clone()),
                "topics" => {
                    // Parse JSON array of topics
                    topics =
                        Some(serde_json::from_str(value).context("Failed to parse topics JSON")?);
                }
                "data" => data = Some(value.clone()),
                "timestamp" => timestamp = Some(value.parse::<i64>().context("Invalid timestamp")?),
                _ => {
                    warn!("Unknown field in stream: {}", key);
                }
            }
        }

        Ok(StreamEvent {
            chain_id: chain_id.context("Missing chain_id")?,
            chain_name: chain_name.context("Missing chain_name")?,
            block_number: block_number.context("Missing block_number")?,
            block_hash: block_hash.context("Missing block_hash")?,
            transaction_hash: transaction_hash.context("Missing transaction_hash")?,
            log_index: log_index.context("Missing log_index")?,
            contract_address: contract_address.context("Missing contract_address")?,
            topics: topics.context("Missing topics")?,
            data: data.context("Missing data")?,
            timestamp: timestamp.context("Missing timestamp")?,
        })
    }

    /// Acknowledge processed messages
    ///
    /// Removes messages from pending entry list (PEL).
    /// Should be called after successfully processing messages.
    ///
    /// # Arguments
    ///
    /// * `stream_name` - Stream name
    /// * `message_ids` - IDs of messages to acknowledge
    pub async fn ack_messages(&mut self, stream_name: &str, message_ids: &[String]) -> Result<()> {
        if message_ids.is_empty() {
            debug!("[{}] No messages to acknowledge (empty list)", stream_name);
            return Ok(());
        }

        info!(
            "[{}] Acknowledging {} messages...",
            stream_name,
            message_ids.len()
        );

        // XACK stream_name group_name id1 id2 id3...
        let mut cmd = redis::cmd("XACK");
        cmd.arg(stream_name).arg(&self.group_name);

        for id in message_ids {
            cmd.arg(id);
        }

        let acked: usize = cmd
            .query_async(&mut self.client)
            .await
            .context("Failed to acknowledge messages")?;

        info!(
            "[{}] ✅ Acknowledged {} messages (expected {})",
            stream_name,
            acked,
            message_ids.len()
        );

        Ok(())
    }

    /// Get pending messages count
    ///
    /// Returns number of messages that were delivered but not acknowledged.
    /// Useful for monitoring stuck consumers.
    pub async fn pending_count(&mut self, stream_name: &str) -> Result<usize> {
        // XPENDING stream_name group_name

        // Type alias for complex Redis XPENDING response
        type XPendingResult = (usize, Option<String>, Option<String>, Vec<(String, usize)>);

        let result: XPendingResult = redis::cmd("XPENDING")
            .arg(stream_name)
            .arg(&self.group_name)
            .query_async(&mut self.client)
            .await
            .context("Failed to get pending count")?;

        Ok(result.0)
    }

    /// Reclaim messages that have been pending longer than `min_idle_ms`
    /// without being acknowledged, attributing them to this consumer.
    ///
    /// A consumer can crash (or stall) after XREADGROUP hands it a message
    /// but before it XACKs it; the message then sits in the group's PEL
    /// forever unless another consumer claims it. Called on a timer by the
    /// caller (every `min_idle_ms` or so) for every stream it reads from.
    ///
    /// # Arguments
    ///
    /// * `stream_name` - Stream to scan for idle pending entries
    /// * `min_idle_ms` - Minimum time a message must have been idle (30_000 = 30s)
    /// * `count` - Maximum number of entries to reclaim in one call
    pub async fn reclaim_idle_messages(
        &mut self,
        stream_name: &str,
        min_idle_ms: usize,
        count: usize,
    ) -> Result<Vec<StreamEntry>> {
        // XPENDING stream group IDLE min_idle_ms - + count
        // Extended form: returns (id, consumer, idle_ms, delivery_count) tuples.
        type PendingEntry = (String, String, i64, i64);

        let pending: Vec<PendingEntry> = redis::cmd("XPENDING")
            .arg(stream_name)
            .arg(&self.group_name)
            .arg("IDLE")
            .arg(min_idle_ms)
            .arg("-")
            .arg("+")
            .arg(count)
            .query_async(&mut self.client)
            .await
            .context("Failed to list idle pending entries")?;

        if pending.is_empty() {
            return Ok(Vec::new());
        }

        let delivery_counts: std::collections::HashMap<String, i64> = pending
            .iter()
            .map(|(id, _consumer, _idle_ms, delivery_count)| (id.clone(), *delivery_count))
            .collect();
        let ids: Vec<String> = pending.into_iter().map(|(id, ..)| id).collect();
        info!(
            "[{}] Reclaiming {} idle pending message(s) (idle >= {}ms)",
            stream_name,
            ids.len(),
            min_idle_ms
        );

        // XCLAIM stream group consumer min-idle-time id [id ...]
        let mut cmd = redis::cmd("XCLAIM");
        cmd.arg(stream_name)
            .arg(&self.group_name)
            .arg(&self.consumer_name)
            .arg(min_idle_ms);
        for id in &ids {
            cmd.arg(id);
        }

        let response: redis::Value = cmd
            .query_async(&mut self.client)
            .await
            .context("Failed to XCLAIM idle entries")?;

        let raw_entries = match response {
            redis::Value::Bulk(messages) => messages,
            _ => Vec::new(),
        };

        let mut entries = Vec::new();

        for raw in &raw_entries {
            let Some((id, fields)) = Self::extract_fields(raw) else {
                continue;
            };

            match Self::parse_stream_event(&fields) {
                Ok(event) => entries.push(StreamEntry { id, event }),
                Err(e) => {
                    let delivery_count = delivery_counts.get(&id).copied().unwrap_or(1);

                    if delivery_count >= MAX_DELIVERY_ATTEMPTS {
                        warn!(
                            "[{}] Dead-lettering malformed message {} after {} delivery attempts: {:?}",
                            stream_name, id, delivery_count, e
                        );

                        if let Err(dlq_err) = self.dead_letter(stream_name, &id, &fields).await {
                            error!(
                                "[{}] Failed to write dead-letter record for {}: {:?}",
                                stream_name, id, dlq_err
                            );
                            continue;
                        }

                        if let Err(ack_err) =
                            self.ack_messages(stream_name, &[id.clone()]).await
                        {
                            error!(
                                "[{}] Failed to acknowledge dead-lettered message {}: {:?}",
                                stream_name, id, ack_err
                            );
                        }

                        crate::metrics::EVENTS_DEAD_LETTERED_TOTAL
                            .with_label_values(&[stream_name])
                            .inc();
                    } else {
                        debug!(
                            "[{}] Message {} still malformed (delivery #{}), will retry: {:?}",
                            stream_name, id, delivery_count, e
                        );
                    }
                }
            }
        }

        Ok(entries)
    }

    /// Write a malformed entry's raw fields to `events:dlq:{chain_id}` so
    /// it can be inspected later instead of blocking the stream forever.
    async fn dead_letter(
        &mut self,
        stream_name: &str,
        original_id: &str,
        fields: &[(String, String)],
    ) -> Result<()> {
        let dlq_key = format!(
            "events:dlq:{}",
            stream_name.strip_prefix("events:").unwrap_or(stream_name)
        );

        let mut cmd = redis::cmd("XADD");
        cmd.arg(&dlq_key).arg("*").arg("original_id").arg(original_id);
        for (key, value) in fields {
            cmd.arg(key).arg(value);
        }

        let _: String = cmd
            .query_async(&mut self.client)
            .await
            .context("Failed to write dead-letter entry")?;

        Ok(())
    }
}

/// A malformed event gets this many delivery attempts (initial XREADGROUP
/// delivery plus PEL reclaims) before it's moved to the dead-letter list.
const MAX_DELIVERY_ATTEMPTS: i64 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_entry(id: &str, fields: &[(&str, &str)]) -> redis::Value {
        let field_values = fields
            .iter()
            .flat_map(|(k, v)| {
                [
                    redis::Value::Data(k.as_bytes().to_vec()),
                    redis::Value::Data(v.as_bytes().to_vec()),
                ]
            })
            .collect();

        redis::Value::Bulk(vec![
            redis::Value::Data(id.as_bytes().to_vec()),
            redis::Value::Bulk(field_values),
        ])
    }

    fn valid_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("chain_id", "1"),
            ("chain_name", "Ethereum Mainnet"),
            ("block_number", "100"),
            ("block_hash", "0xblock"),
            ("tx_hash", "0xtx"),
            ("log_index", "0"),
            ("contract", "0xcontract"),
            ("topics", "[\"0xtopic\"]"),
            ("data", "0x"),
            ("timestamp", "1700000000"),
        ]
    }

    #[test]
    fn test_parse_messages_skips_malformed_entries() {
        let good = wire_entry("1-0", &valid_fields());
        let bad = wire_entry("2-0", &[("chain_id", "not-a-number")]);

        let entries = StreamConsumer::parse_messages(&[good, bad]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1-0");
        assert_eq!(entries[0].event.chain_id, 1);
    }

    #[test]
    fn test_extract_fields_roundtrips_key_value_pairs() {
        let raw = wire_entry("5-0", &[("chain_id", "1"), ("data", "0xdead")]);

        let (id, fields) = StreamConsumer::extract_fields(&raw).expect("should extract");

        assert_eq!(id, "5-0");
        assert_eq!(
            fields,
            vec![
                ("chain_id".to_string(), "1".to_string()),
                ("data".to_string(), "0xdead".to_string()),
            ]
        );
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_consumer_creation() {
        let consumer = StreamConsumer::new("redis://localhost:6379", "test_group", "test_consumer")
            .await
            .unwrap();

        assert_eq!(consumer.group_name, "test_group");
        assert_eq!(consumer.consumer_name, "test_consumer");
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_ensure_consumer_group() {
        let mut consumer = StreamConsumer::new(
            "redis://localhost:6379",
            "test_group_create",
            "test_consumer",
        )
        .await
        .unwrap();

        // Should succeed on first call
        consumer.ensure_consumer_group("test_stream").await.unwrap();

        // Should succeed on second call (idempotent)
        consumer.ensure_consumer_group("test_stream").await.unwrap();
    }
}
