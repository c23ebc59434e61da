//! Provider configuration for the OAuth front-end.
//!
//! The configuration is a JSON secrets document loaded once at startup and
//! shared read-only for the lifetime of the process.

pub mod provider;

pub use provider::{ConfigLoadError, ProviderConfig, StatePolicy};
