//! File-based logging setup
//!
//! Multi-file logging where the pipeline, auth, and persistence components
//! write to separate daily-rotated files, plus a root file capturing
//! everything and a formatted stdout layer:
//!
//! | Log file        | Component                     | Target prefixes                         |
//! |-----------------|-------------------------------|-----------------------------------------|
//! | fomento.log     | Root logger (all components)  | (all)                                   |
//! | agents.log      | Pipeline stages and clients   | fomento_agents                          |
//! | auth.log        | Authentication                | fomento_auth, fomento_server::middleware|
//! | persistence.log | Database access               | fomento_persistence, fomento_opportunity|
//!
//! Override the directory with `fomento.logs.path`; disable the file layers
//! entirely with `fomento.logs.file: false`.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Internal definition for a component log file
struct ComponentLogDef {
    /// Log file name (e.g. "agents.log")
    file_name: &'static str,
    /// Target module prefixes routed to this file
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "agents.log",
        targets: &["fomento_agents"],
    },
    ComponentLogDef {
        file_name: "auth.log",
        targets: &["fomento_auth", "fomento_server::middleware"],
    },
    ComponentLogDef {
        file_name: "persistence.log",
        targets: &["fomento_persistence", "fomento_opportunity"],
    },
];

const ROOT_LOG_FILE: &str = "fomento.log";

/// Logging configuration for the entire application
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub directory: String,
    pub level: String,
    pub file_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            level: "info".to_string(),
            file_enabled: true,
        }
    }
}

/// Initialize the tracing subscriber.
///
/// The returned guards must be kept alive for the lifetime of the process so
/// the non-blocking file writers flush on shutdown.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Vec<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let stdout_layer = fmt::layer().with_target(true).with_filter(env_filter);

    let mut guards = Vec::new();
    let mut file_layers = Vec::new();

    if config.file_enabled {
        let directory = PathBuf::from(&config.directory);
        std::fs::create_dir_all(&directory)?;

        // Root file captures every event
        let (root_writer, root_guard) = tracing_appender::non_blocking(
            RollingFileAppender::new(Rotation::DAILY, &directory, ROOT_LOG_FILE),
        );
        guards.push(root_guard);
        file_layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_writer(root_writer)
                .with_filter(LevelFilter::INFO)
                .boxed(),
        );

        // Per-component files route by tracing target prefix
        for def in COMPONENT_LOGS {
            let (writer, guard) = tracing_appender::non_blocking(RollingFileAppender::new(
                Rotation::DAILY,
                &directory,
                def.file_name,
            ));
            guards.push(guard);

            let mut targets = Targets::new();
            for target in def.targets {
                targets = targets.with_target(*target, LevelFilter::DEBUG);
            }

            file_layers.push(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(targets)
                    .boxed(),
            );
        }
    }

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layers)
        .init();

    Ok(guards)
}
