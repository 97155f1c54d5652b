//! Minimal HTTP server exposing a local directory tree for browsing and download.
//!
//! Files are streamed back as attachments with a content type picked from their
//! extension; directories are rendered as HTML listings of their immediate children.

pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod mime;
pub mod resolve;
pub mod routes;

use std::sync::Arc;

pub use config::Config;
pub use error::FileServerError;
pub use resolve::ServeRoot;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Directory tree to serve files from
    pub root: ServeRoot,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState with the given root and default config.
    pub fn new(root: ServeRoot) -> Self {
        Self {
            root,
            config: Arc::new(Config::default()),
        }
    }

    /// Create a new AppState with the given root and config.
    pub fn with_config(root: ServeRoot, config: Config) -> Self {
        Self {
            root,
            config: Arc::new(config),
        }
    }
}
