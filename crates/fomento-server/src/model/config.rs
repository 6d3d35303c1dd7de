//! Configuration management for the Fomento server
//!
//! This module handles loading and accessing application configuration from
//! `conf/application.yml`, the `fomento` environment prefix, and CLI overrides.

use std::time::Duration;

use clap::Parser;
use config::{Config, Environment};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use fomento_agents::collector::CollectorConfig;
use fomento_agents::manager::AgentsConfig;
use fomento_agents::notifier::EmailConfig;
use fomento_agents::rag::RagConfig;
use fomento_agents::scheduler::SchedulerConfig;
use fomento_agents::vector::VectorConfig;
use fomento_auth::DEFAULT_TOKEN_EXPIRE_SECONDS;

use crate::startup::logging::LoggingConfig;

const DEFAULT_SERVER_PORT: u16 = 8000;

/// Development fallback; override `fomento.auth.token.secretKey` in production
const DEFAULT_TOKEN_SECRET_KEY: &str =
    "Zm9tZW50by1kZXYtdG9rZW4tc2VjcmV0LWtleS0wMTIzNDU2Nzg5YWJjZGVm";

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command()]
struct Cli {
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Serve the built-in sample batch instead of calling the source API
    #[arg(long = "use-samples")]
    use_samples: bool,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        let mut config_builder = Config::builder()
            .add_source(
                Environment::with_prefix("fomento")
                    .separator(".")
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("conf/application.yml").required(false));

        if let Some(v) = args.port {
            config_builder = config_builder
                .set_override("server.port", i64::from(v))
                .expect("Failed to set port override");
        }
        if let Some(v) = args.database_url {
            config_builder = config_builder
                .set_override("db.url", v)
                .expect("Failed to set database URL override");
        }
        if args.use_samples {
            config_builder = config_builder
                .set_override("fomento.agents.useSamples", true)
                .expect("Failed to set sample mode override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/application.yml");

        Configuration { config: app_config }
    }

    // ========================================================================
    // Server
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or("0.0.0.0".to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    /// Origins allowed by CORS, for the local frontend by default
    pub fn cors_origins(&self) -> Vec<String> {
        self.config
            .get_array("server.cors.origins")
            .map(|values| {
                values
                    .into_iter()
                    .filter_map(|v| v.into_string().ok())
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            })
    }

    // ========================================================================
    // Database
    // ========================================================================

    pub fn database_url(&self) -> String {
        self.config
            .get_string("db.url")
            .unwrap_or("sqlite://fomento.db?mode=rwc".to_string())
    }

    pub fn database_max_connections(&self) -> u32 {
        self.config.get_int("db.maxConnections").unwrap_or(10) as u32
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let mut options = ConnectOptions::new(self.database_url());
        options
            .max_connections(self.database_max_connections())
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        Ok(Database::connect(options).await?)
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub fn token_secret_key(&self) -> String {
        self.config
            .get_string("fomento.auth.token.secretKey")
            .unwrap_or(DEFAULT_TOKEN_SECRET_KEY.to_string())
    }

    pub fn auth_token_expire_seconds(&self) -> i64 {
        self.config
            .get_int("fomento.auth.token.expireSeconds")
            .unwrap_or(DEFAULT_TOKEN_EXPIRE_SECONDS)
    }

    // ========================================================================
    // Agents
    // ========================================================================

    pub fn source_api_endpoint(&self) -> Option<String> {
        self.config.get_string("fomento.agents.sourceApi").ok()
    }

    pub fn agents_use_samples(&self) -> bool {
        self.config
            .get_bool("fomento.agents.useSamples")
            .unwrap_or(false)
    }

    pub fn sendgrid_api_key(&self) -> Option<String> {
        self.config
            .get_string("fomento.email.sendgrid.apiKey")
            .ok()
            .filter(|v| !v.is_empty())
    }

    pub fn email_from(&self) -> String {
        self.config
            .get_string("fomento.email.fromEmail")
            .unwrap_or("noreply@fomento.dev".to_string())
    }

    pub fn dashboard_url(&self) -> String {
        self.config
            .get_string("fomento.email.dashboardUrl")
            .unwrap_or("https://app.fomento.dev/dashboard".to_string())
    }

    pub fn openai_api_key(&self) -> Option<String> {
        self.config
            .get_string("fomento.openai.apiKey")
            .ok()
            .filter(|v| !v.is_empty())
    }

    pub fn openai_api_url(&self) -> String {
        self.config
            .get_string("fomento.openai.apiUrl")
            .unwrap_or("https://api.openai.com".to_string())
    }

    pub fn openai_embedding_model(&self) -> String {
        self.config
            .get_string("fomento.openai.embeddingModel")
            .unwrap_or("text-embedding-ada-002".to_string())
    }

    pub fn openai_chat_model(&self) -> String {
        self.config
            .get_string("fomento.openai.chatModel")
            .unwrap_or("gpt-4o-mini".to_string())
    }

    pub fn pinecone_api_key(&self) -> Option<String> {
        self.config
            .get_string("fomento.pinecone.apiKey")
            .ok()
            .filter(|v| !v.is_empty())
    }

    pub fn pinecone_index_host(&self) -> Option<String> {
        self.config
            .get_string("fomento.pinecone.indexHost")
            .ok()
            .filter(|v| !v.is_empty())
    }

    pub fn to_agents_config(&self) -> AgentsConfig {
        AgentsConfig {
            collector: CollectorConfig {
                api_endpoint: self.source_api_endpoint(),
                use_samples: self.agents_use_samples(),
            },
            email: EmailConfig {
                api_key: self.sendgrid_api_key(),
                from_email: self.email_from(),
                dashboard_url: self.dashboard_url(),
                ..Default::default()
            },
            rag: RagConfig {
                api_key: self.openai_api_key(),
                api_url: self.openai_api_url(),
                embedding_model: self.openai_embedding_model(),
                chat_model: self.openai_chat_model(),
            },
            vector: VectorConfig {
                api_key: self.pinecone_api_key(),
                index_host: self.pinecone_index_host(),
            },
        }
    }

    // ========================================================================
    // Scheduler
    // ========================================================================

    pub fn to_scheduler_config(&self) -> SchedulerConfig {
        let defaults = SchedulerConfig::default();

        SchedulerConfig {
            collection_interval_hours: self
                .config
                .get_int("fomento.scheduler.collectionIntervalHours")
                .map(|v| v as u64)
                .unwrap_or(defaults.collection_interval_hours),
            daily_digest_hour: self
                .config
                .get_int("fomento.scheduler.dailyDigestHour")
                .map(|v| v as u32)
                .unwrap_or(defaults.daily_digest_hour),
            weekly_digest_hour: self
                .config
                .get_int("fomento.scheduler.weeklyDigestHour")
                .map(|v| v as u32)
                .unwrap_or(defaults.weekly_digest_hour),
            cleanup_interval_hours: self
                .config
                .get_int("fomento.scheduler.cleanupIntervalHours")
                .map(|v| v as u64)
                .unwrap_or(defaults.cleanup_interval_hours),
        }
    }

    // ========================================================================
    // Logging
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            directory: self
                .config
                .get_string("fomento.logs.path")
                .unwrap_or("logs".to_string()),
            level: self
                .config
                .get_string("fomento.logs.level")
                .unwrap_or("info".to_string()),
            file_enabled: self.config.get_bool("fomento.logs.file").unwrap_or(true),
        }
    }
}
