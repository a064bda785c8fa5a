//! Collaborative code editor server.
//!
//! Rooms are created over HTTP, clients join them and receive every change
//! made by the other participants over a Server-Sent Events stream.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin codesync-server
//! cargo run --bin codesync-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use codesync_server::{
    app::Application,
    config::{
        DEFAULT_CHANNEL_CAPACITY, DEFAULT_HOST, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_PORT,
        DEFAULT_RECONCILE_INTERVAL_SECS, DEFAULT_TYPING_TTL_SECS, ServerConfig,
    },
    infrastructure::code_runner::piston::DEFAULT_PISTON_URL,
    ui::Server,
};
use codesync_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "codesync-server")]
#[command(about = "Real-time collaborative code editor server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "CODESYNC_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds without events before a keep-alive ping is sent
    #[arg(
        long,
        env = "CODESYNC_IDLE_TIMEOUT_SECS",
        default_value_t = DEFAULT_IDLE_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    idle_timeout_secs: u64,

    /// Seconds between presence reconciliation passes
    #[arg(
        long,
        env = "CODESYNC_RECONCILE_INTERVAL_SECS",
        default_value_t = DEFAULT_RECONCILE_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    reconcile_interval_secs: u64,

    /// Seconds after which a typing indicator expires
    #[arg(long, env = "CODESYNC_TYPING_TTL_SECS", default_value_t = DEFAULT_TYPING_TTL_SECS)]
    typing_ttl_secs: u64,

    /// Capacity of each participant's event channel
    #[arg(
        long,
        env = "CODESYNC_CHANNEL_CAPACITY",
        default_value_t = DEFAULT_CHANNEL_CAPACITY,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    channel_capacity: usize,

    /// Piston-compatible code execution endpoint
    #[arg(long, env = "CODESYNC_CODE_RUNNER_URL", default_value = DEFAULT_PISTON_URL)]
    code_runner_url: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            idle_timeout: Duration::from_secs(args.idle_timeout_secs),
            reconcile_interval: Duration::from_secs(args.reconcile_interval_secs),
            typing_ttl: Duration::from_secs(args.typing_ttl_secs),
            channel_capacity: args.channel_capacity,
            code_runner_url: args.code_runner_url,
            ..ServerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"), "debug");

    let config: ServerConfig = Args::parse().into();
    tracing::debug!("Configuration: {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let Application {
        app_state,
        reconciler,
    } = Application::build(&config, Arc::new(SystemClock))?;

    let server = Server::new(app_state, reconciler, config.reconcile_interval);
    server.run(config.bind_addr()).await
}
