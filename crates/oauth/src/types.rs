use secrecy::{ExposeSecret, SecretString};

/// Access token granted by a completed authorization code exchange.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: SecretString,
    pub token_type: String,
    /// Scope granted by the provider, which may be narrower than requested.
    pub scope: Option<String>,
    /// API base URL the token is valid against.
    pub api_base_url: String,
}

impl AccessToken {
    /// Value for the `Authorization` request header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.token.expose_secret())
    }
}
