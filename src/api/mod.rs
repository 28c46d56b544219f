pub mod ai;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod exercise;
pub mod food;
pub mod middleware;
pub mod user;
pub mod water;
pub mod weight;
pub mod zone;

pub use error::ApiError;
