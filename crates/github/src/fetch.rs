use std::collections::HashSet;

use {
    reqwest::{
        StatusCode,
        header::{ACCEPT, AUTHORIZATION, LINK},
    },
    tracing::{debug, info, warn},
    url::Url,
};

use crate::{
    link::parse_link_header,
    types::{Project, RepositoryPage},
};

/// Upper bound on pages walked by [`RepoFetcher::fetch_all`].
pub const DEFAULT_MAX_PAGES: usize = 100;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid listing URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: Url, status: StatusCode },
    #[error("could not decode repositories from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
    #[error("pagination exceeded {max} pages")]
    PageLimit { max: usize },
    #[error("pagination cycled back to {url}")]
    Cycle { url: Url },
}

/// Repository listing URL under an API base.
pub fn repos_url(api_base: &str) -> String {
    format!("{}/user/repos", api_base.trim_end_matches('/'))
}

/// Walks a `Link`-paginated repository listing.
///
/// The `User-Agent` GitHub requires comes from the supplied client.
#[derive(Debug, Clone)]
pub struct RepoFetcher {
    client: reqwest::Client,
    max_pages: usize,
}

impl RepoFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetch every page starting at `start`, in API order.
    ///
    /// Pages are requested one after another. Any failure discards what was
    /// collected so far.
    pub async fn fetch_all(
        &self,
        start: &str,
        authorization: &str,
    ) -> Result<Vec<Project>, FetchError> {
        let start = Url::parse(start).map_err(|source| FetchError::InvalidUrl {
            url: start.to_string(),
            source,
        })?;

        let mut projects = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(start);
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            if pages == self.max_pages {
                warn!(max = self.max_pages, "repository listing exceeded page cap");
                return Err(FetchError::PageLimit {
                    max: self.max_pages,
                });
            }
            if !visited.insert(url.clone()) {
                warn!(%url, "repository listing links back to a visited page");
                return Err(FetchError::Cycle { url });
            }

            let page = self.fetch_page(&url, authorization).await?;
            pages += 1;
            debug!(page = pages, count = page.projects.len(), "fetched repository page");
            projects.extend(page.projects);
            next = page.next;
        }

        info!(pages, total = projects.len(), "repository listing complete");
        Ok(projects)
    }

    /// Fetch and decode a single page.
    pub async fn fetch_page(
        &self,
        url: &Url,
        authorization: &str,
    ) -> Result<RepositoryPage, FetchError> {
        let resp = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let next = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| parse_link_header(v, url).remove("next"));

        let body = resp.bytes().await.map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })?;
        let projects: Vec<Project> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;

        Ok(RepositoryPage { projects, next })
    }
}
