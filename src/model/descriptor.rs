//! FileDescriptor: one ingested item

use serde::{Deserialize, Serialize};

/// Opaque durable-access credential for a path outside the sandbox.
///
/// Serializes as a plain byte array so it can cross the channel unchanged
/// and come back later through `startAccessingResource`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(Vec<u8>);

impl AccessToken {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single dropped file or directory.
///
/// Created once per unique path per drop and never mutated afterwards.
/// The serialized form is the item map sent with `performOperation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Absolute filesystem path
    pub path: String,
    /// Durable-access token; absent for sandbox-local paths or when minting failed
    pub access_token: Option<AccessToken>,
    /// Best-effort stat result, false when the stat failed
    pub is_directory: bool,
    /// True when the file was written to disk from a file promise
    pub from_promise: bool,
}
