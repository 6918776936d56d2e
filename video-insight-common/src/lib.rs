//! Video Insight Common Library
//!
//! Shared utilities for configuration, API credentials, Gemini model
//! definitions, error handling, tracing, and HTTP serving used by the
//! Video Insight server.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod tracing;


pub use auth::ApiKey;
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use models::{GeminiModel, ModelRegistry};
pub use server::{ServerError, WebServerBuilder, shutdown_channel};
