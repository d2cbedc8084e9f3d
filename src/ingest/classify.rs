//! Payload classification
//!
//! Reads the drop pasteboard once and decides what kind of drop this is.
//! Concrete references (file URLs, then the legacy filename list) win over
//! file promises: some senders attach both, and reading both would ingest
//! the same files twice.

use super::materialize::FilePromise;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors reading one pasteboard type.
#[derive(Debug, Error)]
pub enum PasteboardError {
    #[error("pasteboard type {0} is not readable")]
    Unreadable(String),

    #[error("pasteboard read failed: {0}")]
    Read(String),
}

/// The pasteboard attached to a drop.
///
/// Implementations usually wrap OS objects that are only valid inside the
/// drop callback. Every method must be called synchronously from that
/// callback, on the thread that received it.
pub trait DragPasteboard {
    /// URL strings of the public file-URL type.
    fn file_urls(&self) -> Result<Vec<String>, PasteboardError>;

    /// Entries of the legacy flat filename list.
    fn legacy_filenames(&self) -> Result<Vec<String>, PasteboardError>;

    /// Promise receivers for files the sender has not written yet.
    fn file_promises(&self) -> Result<Vec<Arc<dyn FilePromise>>, PasteboardError>;
}

/// An in-memory pasteboard.
#[derive(Debug, Default, Clone)]
pub struct DropPayload {
    file_urls: Vec<String>,
    legacy_filenames: Vec<String>,
    promises: Vec<Arc<dyn FilePromise>>,
}

impl DropPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_url(mut self, url: impl Into<String>) -> Self {
        self.file_urls.push(url.into());
        self
    }

    pub fn with_legacy_filename(mut self, path: impl Into<String>) -> Self {
        self.legacy_filenames.push(path.into());
        self
    }

    pub fn with_promise(mut self, promise: Arc<dyn FilePromise>) -> Self {
        self.promises.push(promise);
        self
    }
}

impl DragPasteboard for DropPayload {
    fn file_urls(&self) -> Result<Vec<String>, PasteboardError> {
        Ok(self.file_urls.clone())
    }

    fn legacy_filenames(&self) -> Result<Vec<String>, PasteboardError> {
        Ok(self.legacy_filenames.clone())
    }

    fn file_promises(&self) -> Result<Vec<Arc<dyn FilePromise>>, PasteboardError> {
        Ok(self.promises.clone())
    }
}

/// What a drop carries, resolved once at classification.
#[derive(Debug)]
pub enum PayloadKind {
    /// Paths readable right away: file URLs first, then legacy names
    ConcreteRefs(Vec<PathBuf>),
    /// Files that must be materialized before they can be read
    Promises(Vec<Arc<dyn FilePromise>>),
    /// Nothing readable
    Empty,
}

impl PayloadKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConcreteRefs(_) => "concrete",
            Self::Promises(_) => "promises",
            Self::Empty => "empty",
        }
    }
}

/// Result of classifying a payload.
#[derive(Debug)]
pub struct Classification {
    pub kind: PayloadKind,
    /// Raw entry count of the chosen branch, duplicates included
    pub item_count: usize,
}

/// Decides between concrete references, promises, and nothing.
pub struct PayloadClassifier;

impl PayloadClassifier {
    /// Classify `pasteboard`.
    ///
    /// Must be invoked synchronously within the drop-event callback (see
    /// `DragPasteboard`). Only reads metadata, so it is cheap even for
    /// thousands of items. A type that cannot be read counts as having no
    /// entries; if nothing can be read the result is `Empty`.
    pub fn classify(pasteboard: &dyn DragPasteboard) -> Classification {
        let mut paths: Vec<PathBuf> = read_or_empty("file URLs", pasteboard.file_urls())
            .iter()
            .filter_map(|raw| file_url_to_path(raw))
            .collect();
        paths.extend(
            read_or_empty("legacy filenames", pasteboard.legacy_filenames())
                .iter()
                .filter_map(|name| legacy_name_to_path(name)),
        );
        if !paths.is_empty() {
            return Classification {
                item_count: paths.len(),
                kind: PayloadKind::ConcreteRefs(paths),
            };
        }

        let promises = read_or_empty("file promises", pasteboard.file_promises());
        if promises.is_empty() {
            return Classification {
                kind: PayloadKind::Empty,
                item_count: 0,
            };
        }

        Classification {
            item_count: promises.len(),
            kind: PayloadKind::Promises(promises),
        }
    }
}

fn read_or_empty<T>(what: &str, read: Result<Vec<T>, PasteboardError>) -> Vec<T> {
    read.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read {} from pasteboard", what);
        Vec::new()
    })
}

/// Legacy names may be relative; they resolve against the working directory.
fn legacy_name_to_path(name: &str) -> Option<PathBuf> {
    match std::path::absolute(name) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!(name, error = %e, "could not resolve legacy filename");
            None
        }
    }
}

/// Parse a `file:` URL into a local path. Other schemes are not files.
fn file_url_to_path(raw: &str) -> Option<PathBuf> {
    let url = Url::parse(raw).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::materialize::CopyFilePromise;

    struct BrokenPasteboard;

    impl DragPasteboard for BrokenPasteboard {
        fn file_urls(&self) -> Result<Vec<String>, PasteboardError> {
            Err(PasteboardError::Unreadable("public.file-url".into()))
        }

        fn legacy_filenames(&self) -> Result<Vec<String>, PasteboardError> {
            Err(PasteboardError::Read("no property list".into()))
        }

        fn file_promises(&self) -> Result<Vec<Arc<dyn FilePromise>>, PasteboardError> {
            Err(PasteboardError::Unreadable("promise receivers".into()))
        }
    }

    fn paths(kind: &PayloadKind) -> Vec<PathBuf> {
        match kind {
            PayloadKind::ConcreteRefs(paths) => paths.clone(),
            other => panic!("expected concrete refs, got {}", other.label()),
        }
    }

    #[test]
    fn file_urls_become_paths() {
        let payload = DropPayload::new()
            .with_file_url("file:///Users/me/a.txt")
            .with_file_url("file:///Users/me/My%20Docs/b.txt");

        let classification = PayloadClassifier::classify(&payload);
        assert_eq!(classification.item_count, 2);
        assert_eq!(
            paths(&classification.kind),
            vec![
                PathBuf::from("/Users/me/a.txt"),
                PathBuf::from("/Users/me/My Docs/b.txt")
            ]
        );
    }

    #[test]
    fn non_file_urls_are_ignored() {
        let payload = DropPayload::new()
            .with_file_url("https://example.com/a.txt")
            .with_file_url("not a url")
            .with_file_url("file:///c.txt");

        let classification = PayloadClassifier::classify(&payload);
        assert_eq!(classification.item_count, 1);
        assert_eq!(paths(&classification.kind), vec![PathBuf::from("/c.txt")]);
    }

    #[test]
    fn urls_precede_legacy_names_and_both_count() {
        let payload = DropPayload::new()
            .with_legacy_filename("/x/legacy.txt")
            .with_file_url("file:///x/url.txt");

        let classification = PayloadClassifier::classify(&payload);
        assert_eq!(classification.item_count, 2);
        assert_eq!(
            paths(&classification.kind),
            vec![PathBuf::from("/x/url.txt"), PathBuf::from("/x/legacy.txt")]
        );
    }

    #[test]
    fn relative_legacy_names_become_absolute() {
        let payload = DropPayload::new().with_legacy_filename("notes/today.txt");

        let classification = PayloadClassifier::classify(&payload);
        assert_eq!(classification.item_count, 1);
        let resolved = paths(&classification.kind).remove(0);
        assert!(resolved.is_absolute());
        assert_eq!(
            resolved,
            std::env::current_dir().unwrap().join("notes/today.txt")
        );
    }

    #[test]
    fn empty_legacy_name_is_skipped() {
        let payload = DropPayload::new()
            .with_legacy_filename("")
            .with_legacy_filename("/x/kept.txt");

        let classification = PayloadClassifier::classify(&payload);
        assert_eq!(classification.item_count, 1);
        assert_eq!(paths(&classification.kind), vec![PathBuf::from("/x/kept.txt")]);
    }

    #[test]
    fn concrete_refs_shadow_promises() {
        let payload = DropPayload::new()
            .with_file_url("file:///x/a.txt")
            .with_promise(Arc::new(CopyFilePromise::new("/x/b.txt")))
            .with_promise(Arc::new(CopyFilePromise::new("/x/c.txt")));

        let classification = PayloadClassifier::classify(&payload);
        assert_eq!(classification.item_count, 1);
        assert_eq!(classification.kind.label(), "concrete");
    }

    #[test]
    fn promises_used_when_no_concrete_refs() {
        let payload = DropPayload::new()
            .with_file_url("https://example.com/not-a-file")
            .with_promise(Arc::new(CopyFilePromise::new("/x/b.txt")));

        let classification = PayloadClassifier::classify(&payload);
        assert_eq!(classification.item_count, 1);
        assert!(matches!(classification.kind, PayloadKind::Promises(ref p) if p.len() == 1));
    }

    #[test]
    fn empty_payload_is_empty() {
        let classification = PayloadClassifier::classify(&DropPayload::new());
        assert_eq!(classification.item_count, 0);
        assert!(matches!(classification.kind, PayloadKind::Empty));
    }

    #[test]
    fn unreadable_payload_is_empty() {
        let classification = PayloadClassifier::classify(&BrokenPasteboard);
        assert_eq!(classification.item_count, 0);
        assert!(matches!(classification.kind, PayloadKind::Empty));
    }
}
