use std::time::Duration;

/// User agent for every outbound request; GitHub rejects anonymous clients.
pub const USER_AGENT: &str = concat!("repolink/", env!("CARGO_PKG_VERSION"));

/// Shared outbound client. `timeout` of `None` waits indefinitely.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
