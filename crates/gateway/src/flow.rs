//! Coordinator for one OAuth callback: state check, code exchange, then the
//! repository listing. Nothing survives between requests.

use std::{fmt, sync::Arc};

use {
    axum::http::StatusCode,
    repolink_config::ProviderConfig,
    repolink_github::{FetchError, Project, RepoFetcher, repos_url},
    repolink_oauth::{
        Clock, ExchangeError, StateError, StateToken, StateValidator, TokenExchangeClient,
        authorize_url,
    },
    tracing::{debug, info, warn},
};

use crate::form::parse_pairs;

/// Where a callback flow stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Received,
    StateChecked,
    TokenExchanged,
    ResourcesFetched,
    Completed,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Received => "received",
            Self::StateChecked => "state_checked",
            Self::TokenExchanged => "token_exchanged",
            Self::ResourcesFetched => "resources_fetched",
            Self::Completed => "completed",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("missing '{0}' parameter")]
    MissingParameter(&'static str),
    #[error("invalid request: {0}")]
    Parse(String),
    #[error("authorization denied by provider: {0}")]
    ProviderDenied(String),
    #[error("state token is stale")]
    StaleState,
    #[error("state token is malformed")]
    MalformedState,
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<StateError> for FlowError {
    fn from(e: StateError) -> Self {
        match e {
            StateError::Stale => Self::StaleState,
            StateError::Malformed => Self::MalformedState,
        }
    }
}

impl FlowError {
    /// Stage at which the flow was aborted.
    pub fn stage(&self) -> FlowStage {
        match self {
            Self::MissingParameter(_) | Self::Parse(_) | Self::ProviderDenied(_) => {
                FlowStage::Received
            },
            Self::StaleState | Self::MalformedState => FlowStage::StateChecked,
            Self::Exchange(_) => FlowStage::TokenExchanged,
            Self::Fetch(_) => FlowStage::ResourcesFetched,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::Parse(_) | Self::MalformedState => {
                StatusCode::BAD_REQUEST
            },
            Self::ProviderDenied(_) => StatusCode::FORBIDDEN,
            Self::StaleState => StatusCode::REQUEST_TIMEOUT,
            Self::Exchange(_) | Self::Fetch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show to the requester.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingParameter(_) | Self::Parse(_) => self.to_string(),
            Self::ProviderDenied(_) => "Authorization was denied.".into(),
            Self::StaleState => "This sign-in link has expired. Please start again.".into(),
            Self::MalformedState => "The sign-in request was not recognised.".into(),
            Self::Exchange(_) | Self::Fetch(_) => {
                "Could not complete sign-in with the provider.".into()
            },
        }
    }
}

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Decode a raw query string. The first occurrence of each key wins.
    pub fn from_query(query: &str) -> Result<Self, FlowError> {
        let mut params = Self::default();
        for (key, value) in parse_pairs(query)? {
            let slot = match key.as_str() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value);
            }
        }
        Ok(params)
    }
}

/// Result of a completed callback.
#[derive(Debug, Clone)]
pub struct FlowOutcome {
    pub projects: Vec<Project>,
    /// Token for the repository selection form.
    pub next_state: StateToken,
}

pub struct RepoFlow {
    config: Arc<ProviderConfig>,
    states: StateValidator,
    exchange: TokenExchangeClient,
    fetcher: RepoFetcher,
}

impl RepoFlow {
    pub fn new(
        config: Arc<ProviderConfig>,
        clock: Arc<dyn Clock>,
        client: reqwest::Client,
        max_pages: usize,
    ) -> Self {
        Self {
            states: StateValidator::new(clock, config.state_policy),
            exchange: TokenExchangeClient::new(Arc::clone(&config), client.clone()),
            fetcher: RepoFetcher::new(client).with_max_pages(max_pages),
            config,
        }
    }

    /// Authorize URL carrying a freshly minted state token.
    pub fn begin(&self) -> String {
        let state = self.states.mint();
        debug!(%state, "minted state token for authorization");
        authorize_url(&self.config, &state)
    }

    /// Run the callback flow to completion.
    pub async fn complete(&self, params: CallbackParams) -> Result<FlowOutcome, FlowError> {
        let result = self.run(params).await;
        match &result {
            Ok(outcome) => info!(
                stage = %FlowStage::Completed,
                repos = outcome.projects.len(),
                "oauth flow completed"
            ),
            Err(e) => warn!(stage = %e.stage(), error = %e, "oauth flow aborted"),
        }
        result
    }

    async fn run(&self, params: CallbackParams) -> Result<FlowOutcome, FlowError> {
        if let Some(error) = params.error {
            return Err(FlowError::ProviderDenied(error));
        }
        let state = params.state.ok_or(FlowError::MissingParameter("state"))?;
        let code = params.code.ok_or(FlowError::MissingParameter("code"))?;

        self.states.validate(&state)?;

        let token = self.exchange.exchange(&code).await?;

        let projects = self
            .fetcher
            .fetch_all(
                &repos_url(&token.api_base_url),
                &token.authorization_header(),
            )
            .await?;

        Ok(FlowOutcome {
            projects,
            next_state: self.states.mint(),
        })
    }

    /// Check the state token returned with the selection form.
    pub fn check_submission(&self, state: &str) -> Result<(), FlowError> {
        self.states.validate(state).map_err(FlowError::from)
    }
}
