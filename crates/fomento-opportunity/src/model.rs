//! Opportunity domain models

use serde::{Deserialize, Serialize};

use fomento_persistence::entity::opportunities;

/// Opportunity data exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityInfo {
    pub id: i64,
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
    pub relevance_score: f64,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    #[serde(default)]
    pub is_favorite: bool,
}

impl From<opportunities::Model> for OpportunityInfo {
    fn from(value: opportunities::Model) -> Self {
        Self {
            id: value.id,
            external_id: value.external_id,
            title: value.title,
            description: value.description,
            category: value.category,
            kind: value.kind,
            region: value.region,
            deadline: value.deadline,
            amount: value.amount,
            source: value.source,
            source_url: value.source_url,
            relevance_score: value.relevance_score,
            tags: value
                .tags
                .as_deref()
                .and_then(|v| serde_json::from_str(v).ok())
                .unwrap_or_default(),
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
            is_favorite: false,
        }
    }
}

impl OpportunityInfo {
    pub fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }
}

/// Fields of an opportunity as produced by the pipeline, keyed by external_id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOpportunity {
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
    pub relevance_score: f64,
    pub tags: Vec<String>,
}

/// Optional listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityFilter {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub region: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_serializes_kind_as_type() {
        let model = opportunities::Model {
            id: 1,
            external_id: "finep_2024_001".to_string(),
            title: "FINEP - Subvenção Econômica".to_string(),
            description: None,
            category: Some("Inteligência Artificial".to_string()),
            kind: Some("edital".to_string()),
            region: Some("Brasil".to_string()),
            deadline: None,
            amount: Some("R$ 500.000".to_string()),
            source: Some("FINEP".to_string()),
            source_url: None,
            relevance_score: 95.0,
            tags: Some(r#"["IA","Startup"]"#.to_string()),
            is_active: true,
            created_at: chrono::NaiveDateTime::default(),
            updated_at: chrono::NaiveDateTime::default(),
            vector_id: None,
        };

        let info = OpportunityInfo::from(model);
        assert_eq!(info.tags, vec!["IA".to_string(), "Startup".to_string()]);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "edital");
        assert_eq!(json["relevanceScore"], 95.0);
        assert!(json.get("kind").is_none());
    }
}
