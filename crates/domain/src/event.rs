use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A RawEvent as stored in the analytics log (`events` table).
///
/// Unique identity is `(chain_id, transaction_hash, log_index)`; inserts
/// are idempotent upserts on that tuple (see `ON CONFLICT DO NOTHING` in
/// the message processor).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlockchainEvent {
    pub id: Uuid,
    pub chain_id: i64,
    pub block_number: i64,
    pub block_hash: String,
    pub transaction_hash: String,
    pub log_index: i32,
    pub contract_address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub ingested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// The standard envelope body sent on the wire to a customer endpoint.
///
/// Field names and shapes are part of the wire contract: changing them is
/// a breaking change for every subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event_id: String,
    pub chain_id: i64,
    pub chain_name: String,
    pub block_number: i64,
    pub block_hash: String,
    pub transaction_hash: String,
    pub log_index: i32,
    pub contract_address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub timestamp: i64,
}

impl BlockchainEvent {
    /// Deterministic event id used as the dedup key suffix and as the
    /// `event_id` field of the outgoing webhook envelope.
    pub fn event_id(&self) -> String {
        format!(
            "event:{}:{}:{}",
            self.chain_id, self.transaction_hash, self.log_index
        )
    }

    pub fn to_webhook_payload(&self, chain_name: &str) -> WebhookPayload {
        WebhookPayload {
            event_id: self.event_id(),
            chain_id: self.chain_id,
            chain_name: chain_name.to_string(),
            block_number: self.block_number,
            block_hash: self.block_hash.clone(),
            transaction_hash: self.transaction_hash.clone(),
            log_index: self.log_index,
            contract_address: self.contract_address.clone(),
            topics: self.topics.clone(),
            data: self.data.clone(),
            timestamp: self.ingested_at.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlockchainEvent {
        BlockchainEvent {
            id: Uuid::new_v4(),
            chain_id: 1,
            block_number: 18_000_000,
            block_hash: "0xabc".into(),
            transaction_hash: "0xdef456".into(),
            log_index: 5,
            contract_address: "0x123".into(),
            topics: vec!["0xddf2".into()],
            data: "0x".into(),
            ingested_at: Utc::now(),
            processed_at: None,
        }
    }

    #[test]
    fn event_id_includes_chain_tx_and_log_index() {
        let event = sample();
        assert_eq!(event.event_id(), "event:1:0xdef456:5");
    }

    #[test]
    fn webhook_payload_carries_chain_name() {
        let event = sample();
        let payload = event.to_webhook_payload("ethereum");
        assert_eq!(payload.chain_name, "ethereum");
        assert_eq!(payload.event_id, event.event_id());
    }
}
