use repolink_config::ProviderConfig;

use crate::state::StateToken;

/// Build the provider's authorize URL for a new flow.
pub fn authorize_url(config: &ProviderConfig, state: &StateToken) -> String {
    fill_template(&config.oauth_url, &[
        ("client_id", config.client_id.as_str()),
        ("callback_url", config.callback_url.as_str()),
        ("scope", config.scope.as_str()),
        ("state", state.as_str()),
    ])
}

/// Substitute `{name}` placeholders with percent-encoded values.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), &urlencoding::encode(value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "client_id": "abc123",
        "client_secret": "s3cr3t",
        "callback_url": "http://localhost:8080/callback",
        "scope": "repo read:org",
        "oauth_url": "https://github.com/login/oauth/authorize?client_id={client_id}&redirect_uri={callback_url}&scope={scope}&state={state}",
        "access_token_url": "https://github.com/login/oauth/access_token?client_id={client_id}&client_secret={client_secret}&code={code}",
        "api_base_url": "https://api.github.com"
    }"#;

    #[test]
    fn test_authorize_url_substitutes_and_encodes() {
        let config = ProviderConfig::from_json(CONFIG).unwrap();
        let url = authorize_url(&config, &StateToken::at(std::time::Duration::from_secs(3)));
        assert_eq!(
            url,
            "https://github.com/login/oauth/authorize?client_id=abc123\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback\
             &scope=repo%20read%3Aorg&state=3000000000"
        );
    }

    #[test]
    fn test_fill_template_leaves_unknown_placeholders() {
        let out = fill_template("{a}/{b}", &[("a", "x y")]);
        assert_eq!(out, "x%20y/{b}");
    }
}
