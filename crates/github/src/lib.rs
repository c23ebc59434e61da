//! Client for the repository listing endpoint of a GitHub-shaped REST API.

pub mod fetch;
pub mod link;
pub mod types;

pub use fetch::{DEFAULT_MAX_PAGES, FetchError, RepoFetcher, repos_url};
pub use link::parse_link_header;
pub use types::{Project, RepositoryPage};
