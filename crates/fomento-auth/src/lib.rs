//! Fomento Auth - Authentication and account management
//!
//! This crate provides:
//! - JWT token handling with a decode cache
//! - bcrypt password hashing
//! - User account and startup-profile services

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
