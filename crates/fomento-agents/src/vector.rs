//! Vector index client
//!
//! Pinecone REST delegation: upsert, query, and delete against a configured
//! index host. Disabled when the API key or host is missing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use fomento_common::error::FomentoError;

use crate::model::SemanticMatch;

const API_KEY_HEADER: &str = "Api-Key";

#[derive(Debug, Clone, Default)]
pub struct VectorConfig {
    pub api_key: Option<String>,
    /// Full index host URL, e.g. `https://funding-xxxx.svc.us-east-1.pinecone.io`
    pub index_host: Option<String>,
}

/// Metadata stored alongside each vector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorMetadata {
    pub opportunity_id: i64,
    pub title: String,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub region: Option<String>,
    pub amount: Option<String>,
    pub source: Option<String>,
}

/// One vector to upsert
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[allow(dead_code)]
    id: String,
    score: f64,
    metadata: Option<VectorMetadata>,
}

pub struct VectorClient {
    config: VectorConfig,
    client: reqwest::Client,
}

impl VectorClient {
    pub fn new(config: VectorConfig) -> Self {
        if config.api_key.is_none() || config.index_host.is_none() {
            tracing::warn!("Vector index not configured, vector operations disabled");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    pub fn enabled(&self) -> bool {
        self.config.api_key.is_some() && self.config.index_host.is_some()
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<(String, &str)> {
        match (&self.config.index_host, &self.config.api_key) {
            (Some(host), Some(key)) => Ok((format!("{}{}", host, path), key.as_str())),
            _ => Err(FomentoError::ServiceDisabled("vector index").into()),
        }
    }

    /// Upsert a batch of vectors. Returns the number sent.
    pub async fn upsert(&self, vectors: Vec<VectorRecord>) -> anyhow::Result<usize> {
        if vectors.is_empty() {
            return Ok(0);
        }

        let (url, api_key) = self.endpoint("/vectors/upsert")?;
        let count = vectors.len();

        self.client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&serde_json::json!({ "vectors": vectors }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| FomentoError::NetworkError(e.to_string()))?;

        tracing::info!("Upserted {} vectors", count);

        Ok(count)
    }

    /// Query the index for the nearest vectors
    pub async fn query(
        &self,
        values: Vec<f32>,
        top_k: usize,
        filter: Option<serde_json::Value>,
    ) -> anyhow::Result<Vec<SemanticMatch>> {
        let (url, api_key) = self.endpoint("/query")?;

        let mut payload = serde_json::json!({
            "vector": values,
            "topK": top_k,
            "includeMetadata": true,
        });
        if let Some(filter) = filter {
            payload["filter"] = filter;
        }

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| FomentoError::NetworkError(e.to_string()))?;

        let body: QueryResponse = response.json().await?;

        let matches = body
            .matches
            .into_iter()
            .filter_map(|m| {
                m.metadata.map(|metadata| SemanticMatch {
                    opportunity_id: metadata.opportunity_id,
                    score: m.score,
                    title: metadata.title,
                    category: metadata.category,
                    kind: metadata.kind,
                    region: metadata.region,
                    amount: metadata.amount,
                    source: metadata.source,
                })
            })
            .collect();

        Ok(matches)
    }

    /// Delete vectors by id
    pub async fn delete(&self, ids: &[String]) -> anyhow::Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let (url, api_key) = self.endpoint("/vectors/delete")?;

        self.client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&serde_json::json!({ "ids": ids }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| FomentoError::NetworkError(e.to_string()))?;

        tracing::info!("Deleted {} vectors", ids.len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> VectorClient {
        VectorClient::new(VectorConfig {
            api_key: Some("pc-test-key".to_string()),
            index_host: Some(server.base_url()),
        })
    }

    #[tokio::test]
    async fn test_upsert_sends_vectors() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/vectors/upsert")
                    .header("Api-Key", "pc-test-key");
                then.status(200).json_body(serde_json::json!({ "upsertedCount": 1 }));
            })
            .await;

        let count = client_for(&server)
            .upsert(vec![VectorRecord {
                id: "opp_1".to_string(),
                values: vec![0.1; 4],
                metadata: VectorMetadata {
                    opportunity_id: 1,
                    title: "Edital".to_string(),
                    category: None,
                    kind: None,
                    region: None,
                    amount: None,
                    source: None,
                },
            }])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_query_maps_matches() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/query");
                then.status(200).json_body(serde_json::json!({
                    "matches": [
                        {
                            "id": "opp_7",
                            "score": 0.87,
                            "metadata": {
                                "opportunityId": 7,
                                "title": "Bolsa CNPq",
                                "type": "bolsa",
                                "region": "Brasil"
                            }
                        },
                        { "id": "opp_8", "score": 0.5 }
                    ]
                }));
            })
            .await;

        let matches = client_for(&server)
            .query(vec![0.1; 4], 10, None)
            .await
            .unwrap();

        // The match without metadata is dropped
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].opportunity_id, 7);
        assert_eq!(matches[0].kind.as_deref(), Some("bolsa"));
        assert!((matches[0].score - 0.87).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_disabled_without_credentials() {
        let client = VectorClient::new(VectorConfig::default());
        assert!(!client.enabled());
        assert!(client.query(vec![0.1], 5, None).await.is_err());
        // Empty upserts and deletes short-circuit before the credential check
        assert_eq!(client.upsert(vec![]).await.unwrap(), 0);
        assert!(client.delete(&[]).await.is_ok());
    }
}
