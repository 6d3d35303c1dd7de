//! Pipeline manager
//!
//! Owns the four stages and the hosted-service clients, and runs them in
//! sequence: collect, classify, store, index, notify. Stage failures are
//! recorded in the run report and the pipeline continues with what it has.

use sea_orm::DatabaseConnection;

use fomento_auth::{StartupProfile, UserAccount};
use fomento_common::{
    AGENT_CLASSIFIER, AGENT_COLLECTOR, AGENT_NOTIFIER, AGENT_STATUS_ERROR, AGENT_STATUS_SUCCESS,
};
use fomento_opportunity::service::opportunity;
use fomento_opportunity::{NewOpportunity, OpportunityFilter, OpportunityInfo};

use crate::classifier;
use crate::collector::{Collector, CollectorConfig};
use crate::logs;
use crate::model::{
    AgentLogEntry, AgentStatus, CollectionReport, DeliveryReport, SemanticSearchResult,
};
use crate::notifier::{EmailConfig, Notifier};
use crate::rag::{self, RagClient, RagConfig};
use crate::vector::{VectorClient, VectorConfig, VectorMetadata, VectorRecord};

/// Agent log rows older than this are pruned by the cleanup job
const LOG_RETENTION_DAYS: i64 = 30;

/// Configuration for all pipeline stages and clients
#[derive(Debug, Clone, Default)]
pub struct AgentsConfig {
    pub collector: CollectorConfig,
    pub email: EmailConfig,
    pub rag: RagConfig,
    pub vector: VectorConfig,
}

pub struct AgentManager {
    db: DatabaseConnection,
    collector: Collector,
    notifier: Notifier,
    rag: RagClient,
    vector: VectorClient,
}

impl AgentManager {
    pub fn new(db: DatabaseConnection, config: AgentsConfig) -> Self {
        Self {
            db,
            collector: Collector::new(config.collector),
            notifier: Notifier::new(config.email),
            rag: RagClient::new(config.rag),
            vector: VectorClient::new(config.vector),
        }
    }

    /// Both hosted services needed for semantic retrieval are configured
    pub fn retrieval_enabled(&self) -> bool {
        self.rag.enabled() && self.vector.enabled()
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Run the full collection pipeline: collect, classify, store, index.
    pub async fn run_collection_pipeline(&self) -> CollectionReport {
        tracing::info!("Starting collection pipeline");
        let started = std::time::Instant::now();
        let mut report = CollectionReport::default();

        // Stage 1: collect
        let batch = self
            .logged_stage(
                AGENT_COLLECTOR,
                "collect opportunities",
                self.collector.collect(),
                |batch: &Vec<_>| serde_json::json!({ "processed": batch.len() }),
            )
            .await
            .unwrap_or_else(|e| {
                report.errors.push(format!("collect: {}", e));
                Vec::new()
            });
        report.collected = batch.len();

        if batch.is_empty() {
            tracing::warn!("No opportunities collected");
            report.duration_seconds = started.elapsed().as_secs_f64();
            return report;
        }

        // Stage 2: classify (pure, never drops an item)
        let classified = self
            .logged_stage(
                AGENT_CLASSIFIER,
                "classify opportunities",
                async { Ok(classifier::classify_batch(batch)) },
                |classified: &Vec<_>| serde_json::json!({ "processed": classified.len() }),
            )
            .await
            .unwrap_or_default();
        report.classified = classified.len();

        // Stage 3: store
        match opportunity::upsert_batch(&self.db, &classified).await {
            Ok(stats) => {
                report.stored = stats.inserted;
                report.updated = stats.updated;
            }
            Err(e) => {
                tracing::error!("Failed to store opportunities: {}", e);
                report.errors.push(format!("store: {}", e));
                report.duration_seconds = started.elapsed().as_secs_f64();
                return report;
            }
        }

        // Stage 4: index embeddings
        if self.retrieval_enabled() {
            match self.index_batch(&classified).await {
                Ok(indexed) => report.indexed = indexed,
                Err(e) => {
                    tracing::error!("Failed to index opportunities: {}", e);
                    report.errors.push(format!("index: {}", e));
                }
            }
        }

        report.duration_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            "Collection pipeline finished in {:.2}s: {} collected, {} stored, {} updated, {} indexed",
            report.duration_seconds,
            report.collected,
            report.stored,
            report.updated,
            report.indexed
        );

        report
    }

    /// Rank opportunities for a profile
    pub fn run_ranking_pipeline(
        &self,
        opportunities: Vec<OpportunityInfo>,
        profile: Option<&StartupProfile>,
    ) -> Vec<OpportunityInfo> {
        tracing::info!("Ranking {} opportunities", opportunities.len());
        crate::ranker::rank(opportunities, profile)
    }

    /// Deliver alerts to the given users about the given opportunities
    pub async fn run_notification_pipeline(
        &self,
        users: &[UserAccount],
        opportunities: &[OpportunityInfo],
    ) -> DeliveryReport {
        self.logged_stage(
            AGENT_NOTIFIER,
            "send opportunity alerts",
            async {
                Ok(self
                    .notifier
                    .send_alerts(&self.db, users, opportunities)
                    .await)
            },
            |report: &DeliveryReport| {
                serde_json::json!({
                    "processed": report.sent + report.failed,
                    "sent": report.sent,
                    "failed": report.failed,
                })
            },
        )
        .await
        .unwrap_or_default()
    }

    /// Scheduled digest for users with the given alert frequency
    pub async fn run_scheduled_digest(&self, frequency: &str) -> anyhow::Result<DeliveryReport> {
        let users =
            fomento_auth::service::user::list_by_alert_frequency(&self.db, frequency).await?;
        if users.is_empty() {
            return Ok(DeliveryReport::default());
        }

        let opportunities = opportunity::search(&self.db, &OpportunityFilter::default())
            .await?
            .into_iter()
            .map(OpportunityInfo::from)
            .collect::<Vec<_>>();

        Ok(self.run_notification_pipeline(&users, &opportunities).await)
    }

    /// Semantic search over the vector index. Errors degrade to an empty
    /// result with an apology text.
    pub async fn semantic_search(
        &self,
        query: &str,
        filters: Option<serde_json::Value>,
        top_k: usize,
    ) -> SemanticSearchResult {
        if !self.retrieval_enabled() {
            return SemanticSearchResult {
                matches: Vec::new(),
                response_text: Some(rag::RAG_UNAVAILABLE_MESSAGE.to_string()),
            };
        }

        match self.try_semantic_search(query, filters, top_k).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Semantic search failed: {}", e);
                SemanticSearchResult {
                    matches: Vec::new(),
                    response_text: Some(format!(
                        "Desculpe, não foi possível processar sua consulta: {}",
                        e
                    )),
                }
            }
        }
    }

    async fn try_semantic_search(
        &self,
        query: &str,
        filters: Option<serde_json::Value>,
        top_k: usize,
    ) -> anyhow::Result<SemanticSearchResult> {
        let query_embedding = self.rag.embed_query(query).await?;
        let matches = self.vector.query(query_embedding, top_k, filters).await?;
        let response_text = self.rag.generate_response(query, &matches).await;

        Ok(SemanticSearchResult {
            matches,
            response_text: Some(response_text),
        })
    }

    /// Deactivate expired opportunities and prune old agent logs
    pub async fn cleanup(&self) -> anyhow::Result<(u64, u64)> {
        let deactivated = opportunity::deactivate_expired(&self.db).await?;
        let pruned = logs::prune_older_than(&self.db, LOG_RETENTION_DAYS).await?;

        tracing::info!(
            "Cleanup finished: {} opportunities deactivated, {} log rows pruned",
            deactivated,
            pruned
        );

        Ok((deactivated, pruned))
    }

    pub async fn agent_status(&self) -> anyhow::Result<Vec<AgentStatus>> {
        logs::status_summary(&self.db).await
    }

    pub async fn recent_logs(&self, limit: u64) -> anyhow::Result<Vec<AgentLogEntry>> {
        logs::recent(&self.db, limit).await
    }

    /// Embed the stored rows for a classified batch and upsert them into the
    /// vector index, recording the vector id on each row.
    async fn index_batch(&self, classified: &[NewOpportunity]) -> anyhow::Result<usize> {
        let external_ids = classified
            .iter()
            .map(|item| item.external_id.clone())
            .collect::<Vec<_>>();

        let infos = opportunity::find_by_external_ids(&self.db, &external_ids)
            .await?
            .into_iter()
            .map(OpportunityInfo::from)
            .collect::<Vec<_>>();

        if infos.is_empty() {
            return Ok(0);
        }

        let texts = infos
            .iter()
            .map(rag::build_embedding_text)
            .collect::<Vec<_>>();
        let embeddings = self.rag.embed(&texts).await?;

        let records = infos
            .iter()
            .zip(embeddings)
            .map(|(info, values)| VectorRecord {
                id: format!("opp_{}", info.id),
                values,
                metadata: VectorMetadata {
                    opportunity_id: info.id,
                    title: info.title.clone(),
                    category: info.category.clone(),
                    kind: info.kind.clone(),
                    region: info.region.clone(),
                    amount: info.amount.clone(),
                    source: info.source.clone(),
                },
            })
            .collect::<Vec<_>>();

        let indexed = self.vector.upsert(records).await?;

        for info in &infos {
            let vector_id = format!("opp_{}", info.id);
            if let Err(e) = opportunity::set_vector_id(&self.db, info.id, &vector_id).await {
                tracing::error!("Failed to record vector id for {}: {}", info.id, e);
            }
        }

        Ok(indexed)
    }

    /// Run a stage between a `running` log row and its final status. The log
    /// rows feed the agent status API; failing to write them never fails the
    /// stage itself.
    async fn logged_stage<T, Fut>(
        &self,
        agent_name: &str,
        action: &str,
        stage: Fut,
        details: impl FnOnce(&T) -> serde_json::Value,
    ) -> anyhow::Result<T>
    where
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let started = std::time::Instant::now();

        let log_id = match logs::record_start(&self.db, agent_name, action).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!("Failed to record {} run start: {}", agent_name, e);
                None
            }
        };

        let result = stage.await;
        let elapsed = started.elapsed().as_secs_f64();

        if let Some(log_id) = log_id {
            let (status, detail) = match &result {
                Ok(value) => (AGENT_STATUS_SUCCESS, details(value)),
                Err(e) => (
                    AGENT_STATUS_ERROR,
                    serde_json::json!({ "error": e.to_string() }),
                ),
            };

            if let Err(e) = logs::record_finish(&self.db, log_id, status, detail, elapsed).await {
                tracing::error!("Failed to record {} run finish: {}", agent_name, e);
            }
        }

        result
    }
}
