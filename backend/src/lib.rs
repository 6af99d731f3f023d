//! Task Manager API: CRUD over task records stored in Redis.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use routes::router;
pub use service::{ServiceError, TaskService};
