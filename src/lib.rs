pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod entities;
pub mod gemini;
pub mod ledger;
pub mod metrics;
pub mod migrator;
pub mod onboarding;
pub mod prompts;
pub mod store;
pub mod summary;
pub mod telemetry;

pub use sea_orm;
