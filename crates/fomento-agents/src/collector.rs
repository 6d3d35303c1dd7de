//! Opportunity collector
//!
//! Fetches raw opportunities from a JSON source API and scrapes funding-agency
//! pages into plain text for the content parser. Failures never abort a
//! pipeline run: the caller records the error and continues with what it has.

use std::sync::LazyLock;
use std::time::Duration;

use fomento_common::collapse_whitespace;
use fomento_common::error::FomentoError;

use crate::model::RawOpportunity;

/// Monitored funding agency pages
pub const SOURCES: &[(&str, &str)] = &[
    ("finep", "https://www.finep.gov.br/chamadas-publicas"),
    (
        "cnpq",
        "https://www.gov.br/cnpq/pt-br/acesso-a-informacao/acoes-e-programas/programas",
    ),
    ("fapesp", "https://fapesp.br/oportunidades/"),
    (
        "capes",
        "https://www.gov.br/capes/pt-br/acesso-a-informacao/acoes-e-programas",
    ),
];

const SCRAPE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SCRAPE_MAX_CHARS: usize = 5000;
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Patterns that signal a funding opportunity inside scraped page text
static CONTENT_PATTERNS: LazyLock<Vec<regex::Regex>> = LazyLock::new(|| {
    [
        r"(?i)edital\s+n[º°]?\s*(\d+/\d+)",
        r"(?i)chamada\s+pública\s+n[º°]?\s*(\d+/\d+)",
        r"(?i)bolsa\s+de\s+(\w+)",
        r"(?i)financiamento\s+de\s+até\s+r\$\s*([\d.,]+)",
        r"(?i)prazo\s+até\s+(\d{1,2}/\d{1,2}/\d{4})",
    ]
    .iter()
    .map(|p| regex::Regex::new(p).expect("Invalid content pattern"))
    .collect()
});

#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    /// JSON API endpoint returning `{ "results": [...] }`
    pub api_endpoint: Option<String>,
    /// Serve the built-in sample batch instead of calling out
    pub use_samples: bool,
}

pub struct Collector {
    config: CollectorConfig,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct ApiResponse {
    #[serde(default)]
    results: Vec<ApiItem>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiItem {
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    deadline: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    source_url: Option<String>,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Fetch the source API and map its items into raw opportunities.
    /// Without a configured endpoint the built-in sample batch is served.
    pub async fn collect(&self) -> anyhow::Result<Vec<RawOpportunity>> {
        if self.config.use_samples {
            return Ok(sample_batch());
        }

        let Some(endpoint) = self.config.api_endpoint.as_deref() else {
            tracing::warn!("No source API endpoint configured, serving sample batch");
            return Ok(sample_batch());
        };

        let response = self
            .client
            .get(endpoint)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(|e| FomentoError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FomentoError::NetworkError(format!(
                "source API returned HTTP {}",
                response.status()
            ))
            .into());
        }

        let body: ApiResponse = response.json().await?;

        let opportunities = body
            .results
            .into_iter()
            .filter(|item| !item.title.is_empty())
            .map(|item| RawOpportunity {
                external_id: json_id_to_string(&item.id),
                title: item.title,
                description: item.description,
                category: item.category,
                kind: item.kind,
                region: item.region,
                deadline: item.deadline.as_deref().and_then(parse_deadline),
                amount: item.amount,
                source: item.source.or_else(|| Some("API".to_string())),
                source_url: item.source_url,
                tags: Vec::new(),
            })
            .collect::<Vec<_>>();

        tracing::info!("Collected {} opportunities from source API", opportunities.len());

        Ok(opportunities)
    }

    /// Fetch a source page and reduce it to plain text
    pub async fn scrape_page(&self, url: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, SCRAPE_USER_AGENT)
            .send()
            .await
            .map_err(|e| FomentoError::NetworkError(format!("failed to fetch {}: {}", url, e)))?
            .error_for_status()
            .map_err(|e| FomentoError::NetworkError(e.to_string()))?;

        let html = response.text().await?;
        let text = html2text::from_read(html.as_bytes(), 120)
            .map_err(|e| FomentoError::InternalError(format!("failed to parse page: {}", e)))?;

        let mut text = collapse_whitespace(&text);
        if let Some((idx, _)) = text.char_indices().nth(SCRAPE_MAX_CHARS) {
            text.truncate(idx);
        }

        Ok(text)
    }
}

/// Extract opportunity markers (edital numbers, bolsa kinds, amounts,
/// deadlines) from scraped page text
pub fn parse_content(content: &str) -> Vec<String> {
    let mut matches = Vec::new();

    for pattern in CONTENT_PATTERNS.iter() {
        for capture in pattern.captures_iter(content) {
            if let Some(m) = capture.get(1) {
                matches.push(m.as_str().to_string());
            }
        }
    }

    matches
}

/// The demo batch served when no source API is configured
pub fn sample_batch() -> Vec<RawOpportunity> {
    let now = chrono::Utc::now().naive_utc();

    vec![
        RawOpportunity {
            external_id: "finep_2024_001".to_string(),
            title: "FINEP - Subvenção Econômica para Startups de IA".to_string(),
            description: Some(
                "Programa de apoio financeiro para startups desenvolvedoras de soluções de IA."
                    .to_string(),
            ),
            category: Some("Inteligência Artificial".to_string()),
            kind: Some("edital".to_string()),
            region: Some("Brasil".to_string()),
            deadline: Some(now + chrono::Duration::days(45)),
            amount: Some("R$ 500.000".to_string()),
            source: Some("FINEP".to_string()),
            source_url: Some(SOURCES[0].1.to_string()),
            tags: vec![
                "IA".to_string(),
                "Startup".to_string(),
                "Inovação".to_string(),
                "Subvenção".to_string(),
            ],
        },
        RawOpportunity {
            external_id: "cnpq_2024_002".to_string(),
            title: "CNPq - Bolsa de Desenvolvimento Tecnológico".to_string(),
            description: Some(
                "Bolsa para desenvolvimento de tecnologias disruptivas em healthtech."
                    .to_string(),
            ),
            category: Some("Saúde".to_string()),
            kind: Some("bolsa".to_string()),
            region: Some("Brasil".to_string()),
            deadline: Some(now + chrono::Duration::days(30)),
            amount: Some("R$ 3.000/mês".to_string()),
            source: Some("CNPq".to_string()),
            source_url: Some(SOURCES[1].1.to_string()),
            tags: vec![
                "Healthtech".to_string(),
                "Bolsa".to_string(),
                "P&D".to_string(),
            ],
        },
    ]
}

fn json_id_to_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_deadline(value: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(value)
                .map(|d| d.naive_utc())
                .ok()
        })
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_parse_content_finds_markers() {
        let text = "Edital nº 12/2024 aberto. Chamada Pública n 3/2024. \
                    Bolsa de mestrado disponível, financiamento de até R$ 150.000,00, \
                    prazo até 15/03/2024.";

        let matches = parse_content(text);
        assert!(matches.contains(&"12/2024".to_string()));
        assert!(matches.contains(&"3/2024".to_string()));
        assert!(matches.contains(&"mestrado".to_string()));
        assert!(matches.contains(&"150.000,00".to_string()));
        assert!(matches.contains(&"15/03/2024".to_string()));
    }

    #[test]
    fn test_parse_content_empty_text() {
        assert!(parse_content("nada de interessante aqui").is_empty());
    }

    #[test]
    fn test_parse_deadline_formats() {
        assert!(parse_deadline("2024-03-15T00:00:00").is_some());
        assert!(parse_deadline("2024-03-15T00:00:00Z").is_some());
        assert!(parse_deadline("2024-03-15").is_some());
        assert!(parse_deadline("15/03/2024").is_none());
    }

    #[test]
    fn test_sample_batch() {
        let batch = sample_batch();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].external_id, "finep_2024_001");
        assert_eq!(batch[1].kind.as_deref(), Some("bolsa"));
        assert!(batch.iter().all(|o| o.deadline.is_some()));
    }

    #[tokio::test]
    async fn test_collect_maps_api_items() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/oportunidades");
                then.status(200).json_body(serde_json::json!({
                    "results": [
                        {
                            "id": 42,
                            "title": "Edital de Inovação",
                            "category": "Energia",
                            "type": "edital",
                            "region": "Brasil",
                            "amount": "R$ 100.000",
                            "deadline": "2030-06-01T00:00:00"
                        },
                        { "id": 43, "title": "" }
                    ]
                }));
            })
            .await;

        let collector = Collector::new(CollectorConfig {
            api_endpoint: Some(server.url("/oportunidades")),
            use_samples: false,
        });

        let collected = collector.collect().await.unwrap();
        mock.assert_async().await;

        // The untitled item is dropped
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].external_id, "42");
        assert_eq!(collected[0].kind.as_deref(), Some("edital"));
        assert!(collected[0].deadline.is_some());
    }

    #[tokio::test]
    async fn test_collect_propagates_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/oportunidades");
                then.status(500);
            })
            .await;

        let collector = Collector::new(CollectorConfig {
            api_endpoint: Some(server.url("/oportunidades")),
            use_samples: false,
        });

        assert!(collector.collect().await.is_err());
    }

    #[tokio::test]
    async fn test_scrape_page_strips_markup() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/chamadas");
                then.status(200).body(
                    "<html><head><style>body{}</style></head><body>\
                     <h1>Chamadas abertas</h1><p>Edital nº 7/2024</p></body></html>",
                );
            })
            .await;

        let collector = Collector::new(CollectorConfig::default());
        let text = collector.scrape_page(&server.url("/chamadas")).await.unwrap();

        assert!(text.contains("Chamadas abertas"));
        assert!(text.contains("Edital nº 7/2024"));
        assert!(!text.contains("<p>"));
    }
}
