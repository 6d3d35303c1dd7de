//! Fomento Persistence - Database entities
//!
//! This crate provides the SeaORM entity definitions backing the REST API and
//! the agent pipeline: user accounts with their startup profile, collected
//! opportunities, favorites, delivered alerts, and agent run logs.

pub mod entity;

// Re-export sea-orm for convenience
pub use sea_orm;
