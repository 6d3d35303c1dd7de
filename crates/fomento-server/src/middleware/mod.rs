//! actix-web middleware

pub mod auth;
