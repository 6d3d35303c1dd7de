//! REST API handlers

pub mod agents;
pub mod auth;
pub mod health;
pub mod opportunities;
pub mod route;
pub mod search;
pub mod users;
