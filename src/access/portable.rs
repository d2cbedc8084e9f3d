//! PortableBookmarks: a SecurityScope that works without an OS registry
//!
//! Tokens are JSON records naming the bookmarked path. Grants are counted
//! per bookmark so nested start/stop pairs balance out.

use super::{ScopeError, SecurityScope};
use crate::model::AccessToken;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkRecord {
    id: Uuid,
    path: String,
    issued_at: DateTime<Utc>,
}

/// Bookmark store backed by self-describing tokens.
#[derive(Debug, Default)]
pub struct PortableBookmarks {
    /// Active grant count per bookmark id
    grants: DashMap<Uuid, usize>,
}

impl PortableBookmarks {
    pub fn new() -> Self {
        Self {
            grants: DashMap::new(),
        }
    }

    /// The path a token was minted for.
    pub fn resolve(&self, token: &AccessToken) -> Result<PathBuf, ScopeError> {
        Ok(PathBuf::from(decode(token)?.path))
    }

    /// Total number of outstanding grants across all bookmarks.
    pub fn active_grants(&self) -> usize {
        self.grants.iter().map(|entry| *entry.value()).sum()
    }
}

fn decode(token: &AccessToken) -> Result<BookmarkRecord, ScopeError> {
    serde_json::from_slice(token.as_bytes()).map_err(|e| ScopeError::Malformed(e.to_string()))
}

impl SecurityScope for PortableBookmarks {
    fn create_bookmark(&self, path: &Path) -> Result<AccessToken, ScopeError> {
        let display = path.to_string_lossy().into_owned();
        if !path.is_absolute() {
            return Err(ScopeError::Unresolvable {
                path: display,
                reason: "path is not absolute".to_string(),
            });
        }
        if let Err(e) = std::fs::symlink_metadata(path) {
            return Err(ScopeError::Unresolvable {
                path: display,
                reason: e.to_string(),
            });
        }

        let record = BookmarkRecord {
            id: Uuid::new_v4(),
            path: display,
            issued_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&record).map_err(|e| ScopeError::Malformed(e.to_string()))?;
        Ok(AccessToken::from_bytes(bytes))
    }

    fn start_accessing(&self, token: &AccessToken) -> Result<bool, ScopeError> {
        let record = decode(token)?;
        if !Path::new(&record.path).exists() {
            return Ok(false);
        }
        *self.grants.entry(record.id).or_insert(0) += 1;
        Ok(true)
    }

    fn stop_accessing(&self, token: &AccessToken) -> Result<(), ScopeError> {
        let record = decode(token)?;
        if let Some(mut count) = self.grants.get_mut(&record.id) {
            *count = count.saturating_sub(1);
        }
        // Re-checked under the shard lock: a start that lands after the
        // decrement keeps its grant.
        self.grants.remove_if(&record.id, |_, count| *count == 0);
        Ok(())
    }
}
