//! Fire-and-forget processing of the repositories a user picked.

use std::sync::Arc;

use {
    async_trait::async_trait,
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use crate::{flow::FlowError, form::parse_pairs};

/// Form field carrying each selected repository.
pub const REPOS_FIELD: &str = "reposGroup";

/// Repositories submitted from the selection form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionJob {
    pub repos: Vec<String>,
}

/// Decoded `POST /process` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionForm {
    pub state: String,
    pub repos: Vec<String>,
}

impl SelectionForm {
    pub fn parse(body: &[u8]) -> Result<Self, FlowError> {
        let body = std::str::from_utf8(body)
            .map_err(|_| FlowError::Parse("form body is not valid UTF-8".into()))?;

        let mut state = None;
        let mut repos = Vec::new();
        for (key, value) in parse_pairs(body)? {
            match key.as_str() {
                "state" if state.is_none() => state = Some(value),
                REPOS_FIELD if !value.is_empty() => repos.push(value),
                _ => {},
            }
        }

        let state = state.ok_or(FlowError::MissingParameter("state"))?;
        if repos.is_empty() {
            return Err(FlowError::MissingParameter(REPOS_FIELD));
        }
        Ok(Self { state, repos })
    }
}

/// Work performed for each submitted selection.
#[async_trait]
pub trait SelectionHandler: Send + Sync {
    async fn handle(&self, job: SelectionJob);
}

/// Records the selection in the log.
pub struct LogSelectionHandler;

#[async_trait]
impl SelectionHandler for LogSelectionHandler {
    async fn handle(&self, job: SelectionJob) {
        for repo in &job.repos {
            info!(repo = %repo, "processing selected repository");
        }
        info!(count = job.repos.len(), "selection processed");
    }
}

/// Hands selections to a background worker. Callers never wait on the result.
#[derive(Clone)]
pub struct SelectionDispatcher {
    tx: mpsc::UnboundedSender<SelectionJob>,
}

impl SelectionDispatcher {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(handler: Arc<dyn SelectionHandler>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SelectionJob>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    handler.handle(job).await;
                });
            }
            debug!("selection worker stopped");
        });
        Self { tx }
    }

    pub fn dispatch(&self, job: SelectionJob) {
        debug!(count = job.repos.len(), "dispatching selection");
        if self.tx.send(job).is_err() {
            warn!("selection worker is gone; dropping selection");
        }
    }
}
