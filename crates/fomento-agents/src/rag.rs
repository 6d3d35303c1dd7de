//! Hosted LLM clients: embeddings and response generation
//!
//! Thin delegations to the OpenAI REST API. Both clients are disabled when no
//! API key is configured, and response generation degrades to an apology
//! string instead of failing the search.

use std::time::Duration;

use fomento_common::error::FomentoError;
use fomento_opportunity::OpportunityInfo;

use crate::model::SemanticMatch;

/// Dimension of the embedding model output
pub const EMBEDDING_DIMENSION: usize = 1536;

const EMBEDDINGS_PATH: &str = "/v1/embeddings";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub const RAG_UNAVAILABLE_MESSAGE: &str = "Sistema de busca semântica não disponível no momento.";
pub const RESPONSE_FAILURE_MESSAGE: &str =
    "Desculpe, não foi possível gerar uma resposta no momento.";

#[derive(Debug, Clone)]
pub struct RagConfig {
    /// OpenAI API key; the whole module is disabled when unset
    pub api_key: Option<String>,
    /// API base URL, overridable for tests
    pub api_url: String,
    pub embedding_model: String,
    pub chat_model: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.openai.com".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
        }
    }
}

pub struct RagClient {
    config: RagConfig,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, serde::Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, serde::Deserialize)]
struct ChatMessage {
    content: String,
}

impl RagClient {
    pub fn new(config: RagConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!("OpenAI API key not configured, semantic retrieval disabled");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    pub fn enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn api_key(&self) -> anyhow::Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| FomentoError::ServiceDisabled("openai").into())
    }

    /// Embed a batch of texts
    pub async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(format!("{}{}", self.config.api_url, EMBEDDINGS_PATH))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": self.config.embedding_model,
                "input": texts,
            }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| FomentoError::NetworkError(e.to_string()))?;

        let body: EmbeddingResponse = response.json().await?;

        Ok(body.data.into_iter().map(|item| item.embedding).collect())
    }

    /// Embed a single query string
    pub async fn embed_query(&self, query: &str) -> anyhow::Result<Vec<f32>> {
        let mut embeddings = self.embed(&[query.to_string()]).await?;

        embeddings
            .pop()
            .ok_or_else(|| FomentoError::InternalError("empty embedding response".to_string()).into())
    }

    /// Phrase an answer over the retrieved opportunities. Degrades to an
    /// apology string on any failure.
    pub async fn generate_response(&self, query: &str, context: &[SemanticMatch]) -> String {
        if !self.enabled() {
            return RAG_UNAVAILABLE_MESSAGE.to_string();
        }

        match self.chat_completion(&build_context_prompt(query, context)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to generate search response: {}", e);
                RESPONSE_FAILURE_MESSAGE.to_string()
            }
        }
    }

    async fn chat_completion(&self, prompt: &str) -> anyhow::Result<String> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(format!("{}{}", self.config.api_url, CHAT_COMPLETIONS_PATH))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": self.config.chat_model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": 0.1,
                "max_tokens": 1000,
            }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| FomentoError::NetworkError(e.to_string()))?;

        let body: ChatResponse = response.json().await?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| FomentoError::InternalError("empty completion".to_string()))?;

        Ok(content)
    }
}

/// Text representation of an opportunity fed to the embedding model
pub fn build_embedding_text(opportunity: &OpportunityInfo) -> String {
    format!(
        "Título: {}\nDescrição: {}\nCategoria: {}\nTipo: {}\nRegião: {}\nValor: {}\nFonte: {}\nTags: {}",
        opportunity.title,
        opportunity.description.as_deref().unwrap_or_default(),
        opportunity.category.as_deref().unwrap_or_default(),
        opportunity.kind.as_deref().unwrap_or_default(),
        opportunity.region.as_deref().unwrap_or_default(),
        opportunity.amount.as_deref().unwrap_or_default(),
        opportunity.source.as_deref().unwrap_or_default(),
        opportunity.tags.join(", "),
    )
}

fn build_context_prompt(query: &str, context: &[SemanticMatch]) -> String {
    let context_block = context
        .iter()
        .take(5)
        .map(|m| {
            format!(
                "Oportunidade: {}\nCategoria: {}\nTipo: {}\nRegião: {}\nValor: {}",
                m.title,
                m.category.as_deref().unwrap_or_default(),
                m.kind.as_deref().unwrap_or_default(),
                m.region.as_deref().unwrap_or_default(),
                m.amount.as_deref().unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Com base nas seguintes oportunidades de financiamento:\n\n{}\n\n\
         Responda à pergunta: {}\n\n\
         Forneça uma resposta detalhada e útil, incluindo informações específicas \
         sobre as oportunidades mais relevantes.",
        context_block, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn semantic_match(title: &str) -> SemanticMatch {
        SemanticMatch {
            opportunity_id: 1,
            score: 0.9,
            title: title.to_string(),
            category: Some("Saúde".to_string()),
            kind: Some("bolsa".to_string()),
            region: Some("Brasil".to_string()),
            amount: Some("R$ 3.000/mês".to_string()),
            source: Some("CNPq".to_string()),
        }
    }

    #[test]
    fn test_build_context_prompt() {
        let prompt = build_context_prompt("bolsas de saúde", &[semantic_match("Bolsa CNPq")]);
        assert!(prompt.contains("Bolsa CNPq"));
        assert!(prompt.contains("bolsas de saúde"));
    }

    #[test]
    fn test_build_embedding_text() {
        let info = OpportunityInfo {
            id: 1,
            external_id: "x".to_string(),
            title: "Edital FINEP".to_string(),
            description: Some("apoio a startups".to_string()),
            category: Some("Energia".to_string()),
            kind: Some("edital".to_string()),
            region: None,
            deadline: None,
            amount: None,
            source: Some("FINEP".to_string()),
            source_url: None,
            relevance_score: 0.0,
            tags: vec!["solar".to_string()],
            is_active: true,
            created_at: chrono::NaiveDateTime::default(),
            updated_at: chrono::NaiveDateTime::default(),
            is_favorite: false,
        };

        let text = build_embedding_text(&info);
        assert!(text.contains("Edital FINEP"));
        assert!(text.contains("Tags: solar"));
    }

    #[tokio::test]
    async fn test_embed_parses_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/embeddings")
                    .header("authorization", "Bearer sk-test");
                then.status(200).json_body(serde_json::json!({
                    "data": [
                        { "embedding": [0.1, 0.2, 0.3] },
                        { "embedding": [0.4, 0.5, 0.6] }
                    ]
                }));
            })
            .await;

        let client = RagClient::new(RagConfig {
            api_key: Some("sk-test".to_string()),
            api_url: server.base_url(),
            ..Default::default()
        });

        let embeddings = client
            .embed(&["texto um".to_string(), "texto dois".to_string()])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_generate_response_degrades_on_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(500);
            })
            .await;

        let client = RagClient::new(RagConfig {
            api_key: Some("sk-test".to_string()),
            api_url: server.base_url(),
            ..Default::default()
        });

        let text = client.generate_response("pergunta", &[]).await;
        assert_eq!(text, RESPONSE_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_disabled_client() {
        let client = RagClient::new(RagConfig::default());
        assert!(!client.enabled());
        assert!(client.embed_query("q").await.is_err());
        assert_eq!(
            client.generate_response("q", &[]).await,
            RAG_UNAVAILABLE_MESSAGE
        );
    }
}
