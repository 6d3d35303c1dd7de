//! Fomento Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Fomento components:
//! - Error types and error codes
//! - Common constants
//! - Validation helpers

pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::{ErrorCode, FomentoError};
pub use utils::{collapse_whitespace, is_valid_email};

/// Opportunity kinds as stored in the database and exposed over the API
pub const KIND_EDITAL: &str = "edital";
pub const KIND_BOLSA: &str = "bolsa";
pub const KIND_INVESTIMENTO: &str = "investimento";

/// Category assigned when keyword classification finds no match
pub const CATEGORY_GERAL: &str = "Geral";

/// Alert channels
pub const ALERT_KIND_EMAIL: &str = "email";
pub const ALERT_KIND_DASHBOARD: &str = "dashboard";

/// Alert frequencies
pub const ALERT_FREQUENCY_DAILY: &str = "daily";
pub const ALERT_FREQUENCY_WEEKLY: &str = "weekly";

/// Pipeline agent names used in agent_logs rows
pub const AGENT_COLLECTOR: &str = "collector";
pub const AGENT_CLASSIFIER: &str = "classifier";
pub const AGENT_RANKER: &str = "ranker";
pub const AGENT_NOTIFIER: &str = "notifier";

/// All pipeline agents, in execution order
pub const AGENT_NAMES: &[&str] = &[AGENT_COLLECTOR, AGENT_CLASSIFIER, AGENT_RANKER, AGENT_NOTIFIER];

/// Agent run statuses
pub const AGENT_STATUS_RUNNING: &str = "running";
pub const AGENT_STATUS_SUCCESS: &str = "success";
pub const AGENT_STATUS_ERROR: &str = "error";

/// Relevance score assigned when classification or ranking cannot decide
pub const NEUTRAL_RELEVANCE: f64 = 50.0;

/// Minimum relevance an opportunity needs to be included in a user alert
pub const ALERT_RELEVANCE_THRESHOLD: f64 = 60.0;
