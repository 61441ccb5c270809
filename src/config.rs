//! Startup configuration, from flags or the environment.

use clap::{Parser, ValueEnum};
use reqwest::Url;

use crate::proxy::{DEFAULT_BACKEND_URL, DEFAULT_PROXY_URL};

#[derive(Parser, Debug, Clone)]
#[command(name = "sccgate")]
#[command(version, about = "Forwards fixed routes to a backend behind a forward proxy")]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080", env = "BIND_ADDRESS")]
    pub bind_address: String,

    /// Base URL of the backend, as the proxy resolves it
    #[arg(long, default_value = DEFAULT_BACKEND_URL, env = "BACKEND_URL")]
    pub backend_url: Url,

    /// Forward proxy all outbound requests go through
    #[arg(long, default_value = DEFAULT_PROXY_URL, env = "PROXY_URL")]
    pub proxy_url: Url,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
