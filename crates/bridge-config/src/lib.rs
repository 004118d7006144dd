#![allow(clippy::must_use_candidate)]

pub mod cors;
pub mod dashscope;
mod duration;
mod env;
mod loader;
pub mod server;
pub mod telemetry;
pub mod upload;

use serde::Deserialize;

pub use cors::*;
pub use dashscope::*;
pub use server::*;
pub use telemetry::*;
pub use upload::*;

/// Top-level bridge configuration
///
/// Built once at startup and shared read-only with every component.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Inbound HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload validation and object-store settings
    #[serde(default)]
    pub upload: UploadConfig,
    /// Vendor endpoints and timeouts
    #[serde(default)]
    pub dashscope: DashScopeConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
