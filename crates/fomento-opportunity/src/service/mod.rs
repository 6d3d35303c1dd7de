//! Opportunity domain services

pub mod alert;
pub mod export;
pub mod favorite;
pub mod opportunity;
