//! Fomento Opportunity - Domain services for collected funding opportunities
//!
//! Query, upsert, favorite, and alert services over the persistence entities,
//! plus the CSV export used by the REST API.

pub mod model;
pub mod service;

pub use model::{NewOpportunity, OpportunityFilter, OpportunityInfo};
