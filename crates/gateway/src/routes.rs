use std::{path::Path, sync::Arc};

use {
    axum::{
        Json, Router,
        body::Bytes,
        extract::{RawQuery, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    tower_http::{services::ServeDir, trace::TraceLayer},
    tracing::{info, warn},
};

use crate::{
    flow::{CallbackParams, FlowError, RepoFlow},
    pages::{IndexPage, ReposPage, SubmittedPage, error_page, render},
    selection::{SelectionForm, SelectionJob},
    state::GatewayState,
};

/// Build the HTTP router. Static assets under `/vendor` come from `static_dir`.
pub fn build_router(state: Arc<GatewayState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/callback", get(callback))
        .route("/process", post(process))
        .route("/health", get(health))
        .nest_service("/vendor", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn require_flow(state: &GatewayState) -> Result<&RepoFlow, Response> {
    state.flow().map_err(|e| {
        warn!(error = %e, "rejecting request, provider config unavailable");
        error_page(
            StatusCode::SERVICE_UNAVAILABLE,
            "Sign-in is not configured on this server.",
        )
    })
}

fn flow_error(e: &FlowError) -> Response {
    error_page(e.status_code(), &e.public_message())
}

async fn index(State(state): State<Arc<GatewayState>>) -> Response {
    let flow = match require_flow(&state) {
        Ok(flow) => flow,
        Err(resp) => return resp,
    };
    let authorize_url = flow.begin();
    render(StatusCode::OK, &IndexPage {
        authorize_url: &authorize_url,
    })
}

async fn callback(
    State(state): State<Arc<GatewayState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let flow = match require_flow(&state) {
        Ok(flow) => flow,
        Err(resp) => return resp,
    };
    let params = match CallbackParams::from_query(query.as_deref().unwrap_or_default()) {
        Ok(params) => params,
        Err(e) => {
            warn!(error = %e, "rejecting callback query");
            return flow_error(&e);
        },
    };
    match flow.complete(params).await {
        Ok(outcome) => render(StatusCode::OK, &ReposPage {
            projects: &outcome.projects,
            state: outcome.next_state.as_str(),
        }),
        Err(e) => flow_error(&e),
    }
}

async fn process(State(state): State<Arc<GatewayState>>, body: Bytes) -> Response {
    let flow = match require_flow(&state) {
        Ok(flow) => flow,
        Err(resp) => return resp,
    };
    let form = match SelectionForm::parse(&body) {
        Ok(form) => form,
        Err(e) => {
            warn!(error = %e, "rejecting selection form");
            return flow_error(&e);
        },
    };
    if let Err(e) = flow.check_submission(&form.state) {
        warn!(error = %e, "rejecting selection, state check failed");
        return flow_error(&e);
    }

    info!(count = form.repos.len(), "selection accepted");
    let page = render(StatusCode::ACCEPTED, &SubmittedPage { repos: &form.repos });
    state.dispatcher.dispatch(SelectionJob { repos: form.repos });
    page
}

async fn health(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "oauth_configured": state.flow().is_ok(),
    }))
}
