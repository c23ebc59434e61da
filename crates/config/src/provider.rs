use std::path::{Path, PathBuf};

use {
    secrecy::SecretString,
    serde::Deserialize,
    tracing::{debug, info},
};

/// Placeholders the authorize-URL template must carry.
pub const AUTHORIZE_PLACEHOLDERS: &[&str] = &["{client_id}", "{state}"];

/// Placeholders the token-exchange-URL template must carry.
pub const EXCHANGE_PLACEHOLDERS: &[&str] = &["{client_id}", "{client_secret}", "{code}"];

/// Errors raised while reading the secrets document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config field '{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("config field '{field}' is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        field: &'static str,
        placeholder: &'static str,
    },
}

/// How a state token that cannot be decoded is treated at callback time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatePolicy {
    /// Undecodable tokens are rejected.
    #[default]
    Strict,
    /// Undecodable tokens are accepted as fresh.
    Permissive,
}

/// OAuth provider settings. Immutable once loaded.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub callback_url: String,
    pub scope: String,
    /// Authorize URL template, e.g.
    /// `https://github.com/login/oauth/authorize?client_id={client_id}&redirect_uri={callback_url}&scope={scope}&state={state}`.
    pub oauth_url: String,
    /// Token exchange URL template, e.g.
    /// `https://github.com/login/oauth/access_token?client_id={client_id}&client_secret={client_secret}&code={code}`.
    pub access_token_url: String,
    pub api_base_url: String,
    #[serde(default)]
    pub state_policy: StatePolicy,
}

impl ProviderConfig {
    /// Read and validate the secrets document at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        debug!(path = %path.display(), "loading provider config");
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|e| match e {
            ConfigLoadError::Parse { source, .. } => ConfigLoadError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(
            path = %path.display(),
            client_id = %config.client_id,
            api_base_url = %config.api_base_url,
            "provider config loaded"
        );
        Ok(config)
    }

    /// Parse and validate a secrets document held in memory.
    pub fn from_json(raw: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigLoadError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Base URL for API requests, without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        use secrecy::ExposeSecret;

        let required = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("callback_url", self.callback_url.as_str()),
            ("oauth_url", self.oauth_url.as_str()),
            ("access_token_url", self.access_token_url.as_str()),
            ("api_base_url", self.api_base_url.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigLoadError::EmptyField(field));
            }
        }

        check_placeholders("oauth_url", &self.oauth_url, AUTHORIZE_PLACEHOLDERS)?;
        check_placeholders(
            "access_token_url",
            &self.access_token_url,
            EXCHANGE_PLACEHOLDERS,
        )?;
        Ok(())
    }
}

fn check_placeholders(
    field: &'static str,
    template: &str,
    placeholders: &[&'static str],
) -> Result<(), ConfigLoadError> {
    match placeholders.iter().find(|p| !template.contains(**p)) {
        Some(placeholder) => Err(ConfigLoadError::MissingPlaceholder {
            field,
            placeholder: *placeholder,
        }),
        None => Ok(()),
    }
}
