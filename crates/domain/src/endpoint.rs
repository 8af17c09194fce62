use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A customer-registered webhook destination with subscription filters.
///
/// `chain_ids` is never a wildcard: an endpoint with an empty `chain_ids`
/// matches nothing. `contract_addresses` and `event_signatures` are
/// wildcards when empty (match any contract / any event).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Endpoint {
    pub id: Uuid,
    pub application_id: Uuid,
    pub name: String,
    pub webhook_url: String,
    pub hmac_secret: String,
    pub chain_ids: Vec<i32>,
    pub contract_addresses: Vec<String>,
    pub event_signatures: Vec<String>,
    pub rate_limit_per_second: i32,
    pub max_retries: i32,
    pub timeout_seconds: i32,
    pub is_active: bool,
    pub health_status: HealthStatus,
    pub last_successful_delivery_at: Option<DateTime<Utc>>,
    pub consecutive_failures: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Failed,
}

#[derive(Debug, Validate, Deserialize)]
pub struct CreateEndpointRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(url)]
    pub webhook_url: String,

    #[validate(length(min = 1, message = "chain_ids must be non-empty"))]
    pub chain_ids: Vec<i32>,

    #[serde(default)]
    pub contract_addresses: Vec<String>,

    #[serde(default)]
    pub event_signatures: Vec<String>,

    #[validate(range(min = 1, max = 100))]
    pub rate_limit_per_second: Option<i32>,

    #[validate(range(min = 0, max = 10))]
    pub max_retries: Option<i32>,

    #[validate(range(min = 5, max = 300))]
    pub timeout_seconds: Option<i32>,
}

#[derive(Debug, Validate, Deserialize)]
pub struct UpdateEndpointRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(url)]
    pub webhook_url: Option<String>,

    #[validate(length(min = 1, message = "chain_ids must be non-empty"))]
    pub chain_ids: Option<Vec<i32>>,

    pub contract_addresses: Option<Vec<String>>,

    pub event_signatures: Option<Vec<String>>,

    pub is_active: Option<bool>,

    #[validate(range(min = 1, max = 100))]
    pub rate_limit_per_second: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct EndpointResponse {
    pub id: Uuid,
    pub application_id: Uuid,
    pub name: String,
    pub webhook_url: String,
    pub hmac_secret: String,
    pub chain_ids: Vec<i32>,
    pub contract_addresses: Vec<String>,
    pub event_signatures: Vec<String>,
    pub rate_limit_per_second: i32,
    pub max_retries: i32,
    pub timeout_seconds: i32,
    pub is_active: bool,
    pub health_status: HealthStatus,
    pub last_successful_delivery_at: Option<DateTime<Utc>>,
    pub consecutive_failures: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Endpoint> for EndpointResponse {
    fn from(endpoint: Endpoint) -> Self {
        Self {
            id: endpoint.id,
            application_id: endpoint.application_id,
            name: endpoint.name,
            webhook_url: endpoint.webhook_url,
            hmac_secret: endpoint.hmac_secret,
            chain_ids: endpoint.chain_ids,
            contract_addresses: endpoint.contract_addresses,
            event_signatures: endpoint.event_signatures,
            rate_limit_per_second: endpoint.rate_limit_per_second,
            max_retries: endpoint.max_retries,
            timeout_seconds: endpoint.timeout_seconds,
            is_active: endpoint.is_active,
            health_status: endpoint.health_status,
            last_successful_delivery_at: endpoint.last_successful_delivery_at,
            consecutive_failures: endpoint.consecutive_failures,
            created_at: endpoint.created_at,
            updated_at: endpoint.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_ids_fails_validation() {
        let req = CreateEndpointRequest {
            name: "test".into(),
            webhook_url: "https://example.com/hook".into(),
            chain_ids: vec![],
            contract_addresses: vec![],
            event_signatures: vec![],
            rate_limit_per_second: None,
            max_retries: None,
            timeout_seconds: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn non_empty_chain_ids_passes_validation() {
        let req = CreateEndpointRequest {
            name: "test".into(),
            webhook_url: "https://example.com/hook".into(),
            chain_ids: vec![1],
            contract_addresses: vec![],
            event_signatures: vec![],
            rate_limit_per_second: None,
            max_retries: None,
            timeout_seconds: None,
        };
        assert!(req.validate().is_ok());
    }
}
