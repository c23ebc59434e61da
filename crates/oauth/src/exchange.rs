use std::{collections::HashMap, sync::Arc};

use {
    repolink_config::ProviderConfig,
    secrecy::{ExposeSecret, SecretString},
    tracing::{debug, info, warn},
};

use crate::{authorize::fill_template, types::AccessToken};

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("provider rejected the authorization code: {error}")]
    ExchangeRejected {
        error: String,
        description: Option<String>,
    },
    #[error("token response is missing '{0}'")]
    MalformedTokenResponse(&'static str),
    #[error("token endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Trades an authorization code for an access token.
pub struct TokenExchangeClient {
    config: Arc<ProviderConfig>,
    client: reqwest::Client,
}

impl TokenExchangeClient {
    pub fn new(config: Arc<ProviderConfig>, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Token exchange URL for `code`. Contains the client secret.
    fn exchange_url(&self, code: &str) -> String {
        fill_template(&self.config.access_token_url, &[
            ("client_id", self.config.client_id.as_str()),
            (
                "client_secret",
                self.config.client_secret.expose_secret().as_str(),
            ),
            ("code", code),
        ])
    }

    pub async fn exchange(&self, code: &str) -> Result<AccessToken, ExchangeError> {
        debug!("exchanging authorization code");
        let resp = self.client.get(self.exchange_url(code)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "token endpoint returned an error status");
            return Err(ExchangeError::Status(status));
        }

        let body = resp.text().await?;
        let token = parse_token_response(&body, self.config.api_base())?;
        info!(
            token_type = %token.token_type,
            scope = token.scope.as_deref().unwrap_or(""),
            "authorization code exchanged"
        );
        Ok(token)
    }
}

/// Decode a form-encoded token response body.
fn parse_token_response(body: &str, api_base_url: &str) -> Result<AccessToken, ExchangeError> {
    let mut fields: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        fields
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    let first = |name: &str| {
        fields
            .get(name)
            .and_then(|values| values.first())
            .filter(|v| !v.is_empty())
            .cloned()
    };

    if fields.contains_key("error") {
        let error = first("error").unwrap_or_default();
        let description = first("error_description");
        warn!(%error, ?description, "token exchange rejected");
        return Err(ExchangeError::ExchangeRejected { error, description });
    }

    let token =
        first("access_token").ok_or(ExchangeError::MalformedTokenResponse("access_token"))?;
    let token_type =
        first("token_type").ok_or(ExchangeError::MalformedTokenResponse("token_type"))?;

    Ok(AccessToken {
        token: SecretString::new(token),
        token_type,
        scope: first("scope"),
        api_base_url: api_base_url.to_string(),
    })
}
