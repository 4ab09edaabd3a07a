//! Sanad Core Library
//!
//! Foundational pieces shared by every Sanad crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging setup
//! - Workspace configuration

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AppConfig, ProviderConfig};
pub use error::{AppError, AppResult};
