use std::{path::PathBuf, time::Duration};

use {
    clap::Parser,
    repolink_gateway::{DEFAULT_MAX_PAGES, GatewayOptions},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "repolink", about = "Pick repositories through GitHub sign-in")]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[derive(clap::Args)]
struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// JSON secrets document with the OAuth provider settings.
    #[arg(long, env = "REPOLINK_CONFIG", default_value = "secrets.json")]
    config: PathBuf,
    /// Directory served under /vendor.
    #[arg(long, default_value = "vendor")]
    static_dir: PathBuf,
    /// Timeout for provider requests in seconds (0 waits indefinitely).
    #[arg(long, default_value_t = 30)]
    http_timeout_secs: u64,
    /// Maximum repository pages fetched per sign-in.
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,
}

impl ServeArgs {
    fn options(&self) -> GatewayOptions {
        GatewayOptions {
            config_path: self.config.clone(),
            static_dir: self.static_dir.clone(),
            http_timeout: (self.http_timeout_secs > 0)
                .then(|| Duration::from_secs(self.http_timeout_secs)),
            max_pages: self.max_pages,
        }
    }
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "repolink starting");

    let args = &cli.serve;
    repolink_gateway::start_gateway(&args.bind, args.port, args.options()).await
}
