//! Pipeline data models

use serde::{Deserialize, Serialize};

use fomento_persistence::entity::agent_logs;

/// An opportunity as collected from a source, before classification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOpportunity {
    pub external_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub region: Option<String>,
    pub deadline: Option<chrono::NaiveDateTime>,
    pub amount: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub tags: Vec<String>,
}

/// Report produced by a collection pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionReport {
    pub collected: usize,
    pub classified: usize,
    pub indexed: usize,
    pub stored: usize,
    pub updated: usize,
    pub errors: Vec<String>,
    pub duration_seconds: f64,
}

/// Per-user outcome of a notification run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetail {
    pub user: String,
    pub opportunities: usize,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report produced by a notification pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
    pub details: Vec<DeliveryDetail>,
}

/// Aggregated agent state derived from agent_logs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub name: String,
    pub status: String,
    pub last_run: Option<chrono::NaiveDateTime>,
    pub success_rate: f64,
    pub total_processed: i64,
}

/// A single agent_logs row as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLogEntry {
    pub id: i64,
    pub agent_name: String,
    pub action: String,
    pub status: String,
    pub details: Option<serde_json::Value>,
    pub execution_time: Option<f64>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<agent_logs::Model> for AgentLogEntry {
    fn from(value: agent_logs::Model) -> Self {
        Self {
            id: value.id,
            agent_name: value.agent_name,
            action: value.action,
            status: value.status,
            details: value
                .details
                .as_deref()
                .and_then(|v| serde_json::from_str(v).ok()),
            execution_time: value.execution_time,
            created_at: value.created_at,
        }
    }
}

/// A scored match coming back from the vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticMatch {
    pub opportunity_id: i64,
    pub score: f64,
    pub title: String,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub region: Option<String>,
    pub amount: Option<String>,
    pub source: Option<String>,
}

/// Result of a semantic search over the vector index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSearchResult {
    pub matches: Vec<SemanticMatch>,
    pub response_text: Option<String>,
}
