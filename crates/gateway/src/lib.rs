//! HTTP front-end that runs the OAuth authorization code flow and lists the
//! signed-in user's repositories.

pub mod flow;
mod form;
pub mod http_client;
pub mod pages;
pub mod routes;
pub mod selection;
pub mod server;
pub mod state;

pub use {
    flow::{CallbackParams, FlowError, FlowOutcome, FlowStage, RepoFlow},
    selection::{
        LogSelectionHandler, SelectionDispatcher, SelectionForm, SelectionHandler, SelectionJob,
    },
    server::{GatewayOptions, start_gateway},
    state::GatewayState,
};

pub use repolink_github::DEFAULT_MAX_PAGES;
