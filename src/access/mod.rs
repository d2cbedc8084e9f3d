//! Durable-access tokens for paths outside the sandbox
//!
//! The enricher mints a token for every dropped path that does not already
//! live in the app's own container or temp area. The companion command
//! handler later turns a token back into a temporary access grant.

mod portable;

pub use portable::PortableBookmarks;

use crate::model::AccessToken;
use std::path::Path;
use thiserror::Error;

/// Errors from minting or resolving an access token.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("cannot create bookmark for {path}: {reason}")]
    Unresolvable { path: String, reason: String },

    #[error("malformed access token: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The OS security-scope registry.
///
/// `create_bookmark` runs on blocking worker threads, many at once, so
/// implementations must be `Sync`.
pub trait SecurityScope: Send + Sync {
    /// Mint a durable token granting future access to `path`.
    fn create_bookmark(&self, path: &Path) -> Result<AccessToken, ScopeError>;

    /// Resolve a token and start accessing the resource it names.
    ///
    /// `Ok(false)` means the token resolved but access was not granted.
    fn start_accessing(&self, token: &AccessToken) -> Result<bool, ScopeError>;

    /// Release a grant obtained with `start_accessing`.
    fn stop_accessing(&self, token: &AccessToken) -> Result<(), ScopeError>;
}
