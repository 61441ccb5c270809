use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sccgate::config::{Config, LogFormat};
use sccgate::{Error, Server, Upstream, routes, shutdown_signal};

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let server = Server::new(&config.bind_address)?;

    info!(backend = %config.backend_url, proxy = %config.proxy_url, "forwarding through proxy");
    let upstream = Arc::new(Upstream::new(config.backend_url, config.proxy_url)?);

    server.start(routes::router(upstream), shutdown_signal()).await
}

/// `RUST_LOG` wins; otherwise `info`.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
