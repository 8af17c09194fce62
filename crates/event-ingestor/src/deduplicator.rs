/*!
 * Deduplication Module
 *
 * Prevents duplicate webhook deliveries during chain reorganizations.
 *
 * ## How It Works
 *
 * Blockchains can experience "reorganizations" (reorgs) where blocks are replaced:
 *
 * ```text
 * Original chain:
 *   Block 100 → Block 101a → Block 102a
 *
 * After reorg:
 *   Block 100 → Block 101b → Block 102b
 *                    ↑
 *              Block 101a is "uncle" (orphaned)
 * ```
 *
 * Without deduplication:
 * 1. We process Block 101a, send webhook
 * 2. Reorg happens, Block 101b becomes canonical
 * 3. We process Block 101b, send DUPLICATE webhook
 * 4. Customer gets confused: "Why same event twice?"
 *
 * With deduplication:
 * 1. Process Block 101a → `SET NX EX` the event's own key
 * 2. Reorg happens, Block 101b received
 * 3. Try to set the same key → already exists (NX fails) → skip
 * 4. Customer gets exactly one webhook
 *
 * ## Implementation
 *
 * Each event gets its own key, not a shared set:
 * - **Key**: `event:{chain_id}:{tx_hash}:{log_index}`
 * - **Value**: irrelevant, we only care whether the key exists
 * - **TTL**: 24 hours per key (reorgs can't go back further than this)
 *
 * This is a single atomic command per event (`SET key 1 NX EX 86400`) — never
 * a read-then-write pair, and never a shared key whose TTL would otherwise
 * get reset by every unrelated insert.
 */

use anyhow::{Context, Result};
use redis::AsyncCommands;
use tracing::debug;

/// Deduplicator using one Redis key per event, `SET NX EX`.
pub struct Deduplicator {
    /// Redis connection manager (automatically handles reconnections)
    client: redis::aio::ConnectionManager,

    /// TTL for each event key in seconds (default: 86400 = 24 hours)
    ttl_seconds: u64,
}

impl Deduplicator {
    /// Create new deduplicator with Redis connection
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `ttl_seconds` - How long to remember an event (default: 86400 = 24 hours)
    pub async fn new(redis_url: &str, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self {
            client: conn,
            ttl_seconds,
        })
    }

    /// Check if an event has already been processed, marking it seen if not.
    ///
    /// # Arguments
    ///
    /// * `event_id` - Unique event identifier (format: "event:{chain}:{tx}:{log}")
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Event is a duplicate (already processed)
    /// * `Ok(false)` - Event is new (should be processed); the key is now set
    /// * `Err(_)` - Redis connection error
    pub async fn is_duplicate(&mut self, event_id: &str) -> Result<bool> {
        // SET key value NX EX ttl: succeeds (Some) only if the key didn't
        // already exist. One atomic command, no read-then-write race.
        let set: Option<String> = redis::cmd("SET")
            .arg(event_id)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut self.client)
            .await
            .context("Failed to SET NX EX dedup key")?;

        if set.is_some() {
            debug!("new event: {}", event_id);
            Ok(false)
        } else {
            debug!("duplicate event detected: {}", event_id);
            Ok(true)
        }
    }

    /// Remove a specific event's dedup key (for testing).
    #[cfg(test)]
    pub async fn clear(&mut self, event_id: &str) -> Result<()> {
        let _: () = self
            .client
            .del(event_id)
            .await
            .context("Failed to clear dedup key")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Run with: cargo test --package ethhook-event-ingestor -- --ignored
    async fn test_deduplication_flow() {
        // This test requires Redis running on localhost:6379
        let mut dedup = Deduplicator::new("redis://localhost:6379", 60)
            .await
            .expect("Failed to connect to Redis");

        let event_id = "event:1:0xtest123:0";
        dedup.clear(event_id).await.expect("Failed to clear");

        let is_dup1 = dedup.is_duplicate(event_id).await.expect("Failed");
        assert!(!is_dup1, "First event should not be duplicate");

        let is_dup2 = dedup.is_duplicate(event_id).await.expect("Failed");
        assert!(is_dup2, "Second event should be duplicate");

        dedup.clear(event_id).await.expect("Failed to clear");
    }

    #[tokio::test]
    #[ignore]
    async fn test_different_events_not_duplicates() {
        let mut dedup = Deduplicator::new("redis://localhost:6379", 60)
            .await
            .expect("Failed to connect to Redis");

        let events = [
            "event:1:0xaaa:0",
            "event:1:0xaaa:1",     // different log_index
            "event:1:0xbbb:0",     // different tx_hash
            "event:42161:0xaaa:0", // different chain_id
        ];

        for event_id in events {
            dedup.clear(event_id).await.expect("Failed to clear");
            assert!(!dedup.is_duplicate(event_id).await.unwrap());
        }

        for event_id in events {
            dedup.clear(event_id).await.expect("Failed to clear");
        }
    }
}
