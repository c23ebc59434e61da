use {serde::Deserialize, url::Url};

/// Summary of one remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
}

/// One decoded page of the repository listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPage {
    pub projects: Vec<Project>,
    pub next: Option<Url>,
}
