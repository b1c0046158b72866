//! API Routes

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod health;
pub mod products;
pub mod reports;
