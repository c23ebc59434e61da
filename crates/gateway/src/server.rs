use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    anyhow::Context,
    repolink_config::ProviderConfig,
    repolink_oauth::{Clock, ProcessClock},
    tokio::net::TcpListener,
    tracing::info,
};

use crate::{
    flow::RepoFlow,
    http_client::build_http_client,
    routes::build_router,
    selection::{LogSelectionHandler, SelectionDispatcher},
    state::GatewayState,
};

/// Runtime options for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// JSON secrets document with the provider settings.
    pub config_path: PathBuf,
    /// Directory served under `/vendor`.
    pub static_dir: PathBuf,
    /// Timeout for calls to the provider; `None` waits indefinitely.
    pub http_timeout: Option<Duration>,
    pub max_pages: usize,
}

/// Load configuration, bind `bind:port` and serve until the process is stopped.
pub async fn start_gateway(bind: &str, port: u16, options: GatewayOptions) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(ProcessClock::start());
    let client = build_http_client(options.http_timeout).context("building HTTP client")?;

    let flow = ProviderConfig::load(&options.config_path)
        .map(|config| RepoFlow::new(Arc::new(config), clock, client, options.max_pages));
    let dispatcher = SelectionDispatcher::spawn(Arc::new(LogSelectionHandler));
    let state = Arc::new(GatewayState::new(flow, dispatcher));

    let app = build_router(state, &options.static_dir);
    let listener = TcpListener::bind((bind, port))
        .await
        .with_context(|| format!("binding {bind}:{port}"))?;
    info!(
        addr = %listener.local_addr()?,
        static_dir = %options.static_dir.display(),
        "gateway listening"
    );

    axum::serve(listener, app).await?;
    info!("gateway stopped");
    Ok(())
}
