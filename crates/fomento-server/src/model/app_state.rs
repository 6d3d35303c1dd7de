//! Application state shared across handlers

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use fomento_agents::AgentManager;

use super::config::Configuration;

pub struct AppState {
    pub configuration: Configuration,
    pub database_connection: DatabaseConnection,
    pub agent_manager: Arc<AgentManager>,
}

impl AppState {
    pub fn db(&self) -> &DatabaseConnection {
        &self.database_connection
    }

    pub fn agents(&self) -> &AgentManager {
        &self.agent_manager
    }
}
