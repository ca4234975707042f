pub mod auth;
pub mod bridge;
pub mod cta;
pub mod schedule;
