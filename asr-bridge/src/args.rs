use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// OpenAI-compatible transcription bridge for DashScope ASR
#[derive(Debug, Parser)]
#[command(name = "asr-bridge", version, about)]
pub struct Args {
    /// Path to a TOML configuration file; built-in defaults when omitted
    #[arg(short, long, env = "ASR_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "ASR_BRIDGE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directives, e.g. `info` or `stt=debug`
    #[arg(long, env = "ASR_BRIDGE_LOG", default_value = "info")]
    pub log_filter: String,
}
