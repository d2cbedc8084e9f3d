//! ItemEnricher: one resolved path in, one descriptor out

use super::dedup::PathDeduplicator;
use crate::access::SecurityScope;
use crate::model::FileDescriptor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directories whose contents the app can already reach without a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRoots {
    container_root: PathBuf,
    temp_root: PathBuf,
}

impl SandboxRoots {
    pub fn new(container_root: impl Into<PathBuf>, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            container_root: container_root.into(),
            temp_root: temp_root.into(),
        }
    }

    /// True if `path` lies under the container or the shared temp directory.
    ///
    /// Empty roots never match.
    pub fn contains(&self, path: &Path) -> bool {
        [&self.container_root, &self.temp_root]
            .into_iter()
            .any(|root| !root.as_os_str().is_empty() && path.starts_with(root))
    }
}

/// Lexical cleanup: drops trailing separators, repeated separators and `.`
/// segments. `..` is kept; resolving it would need the filesystem.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Builds a `FileDescriptor` for one path, consulting the drop's deduplicator.
///
/// Every failure inside is soft: a failed stat means "not a directory", a
/// failed bookmark means "no token". Only a duplicate path yields `None`.
pub struct ItemEnricher {
    roots: SandboxRoots,
    scope: Arc<dyn SecurityScope>,
    dedup: Arc<PathDeduplicator>,
}

impl ItemEnricher {
    pub fn new(
        roots: SandboxRoots,
        scope: Arc<dyn SecurityScope>,
        dedup: Arc<PathDeduplicator>,
    ) -> Self {
        Self { roots, scope, dedup }
    }

    pub fn dedup(&self) -> &Arc<PathDeduplicator> {
        &self.dedup
    }

    /// Enrich `path`. Blocking: stats the file and may mint a bookmark.
    ///
    /// The path is normalized first, so `/x/dir/` and `/x/dir` claim the
    /// same entry and the descriptor carries the normalized form.
    pub fn enrich(&self, path: &Path, from_promise: bool) -> Option<FileDescriptor> {
        let path = normalize(path);
        let path = path.as_path();
        let path_str = path.to_string_lossy().into_owned();
        if !self.dedup.try_claim(&path_str) {
            tracing::trace!(path = %path_str, "duplicate path suppressed");
            return None;
        }

        let is_directory = std::fs::metadata(path)
            .map(|meta| meta.is_dir())
            .unwrap_or(false);

        let access_token = if self.roots.contains(path) {
            None
        } else {
            match self.scope.create_bookmark(path) {
                Ok(token) => Some(token),
                Err(e) => {
                    tracing::debug!(path = %path_str, error = %e, "bookmark creation failed");
                    None
                }
            }
        };

        Some(FileDescriptor {
            path: path_str,
            access_token,
            is_directory,
            from_promise,
        })
    }

    /// Enrich `path` and append the result to the drop's item list.
    pub fn enrich_and_record(&self, path: &Path, from_promise: bool) -> bool {
        match self.enrich(path, from_promise) {
            Some(descriptor) => {
                self.dedup.record(descriptor);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{PortableBookmarks, ScopeError};
    use crate::model::AccessToken;

    struct FailingScope;

    impl SecurityScope for FailingScope {
        fn create_bookmark(&self, path: &Path) -> Result<AccessToken, ScopeError> {
            Err(ScopeError::Unresolvable {
                path: path.display().to_string(),
                reason: "denied".to_string(),
            })
        }

        fn start_accessing(&self, _token: &AccessToken) -> Result<bool, ScopeError> {
            Ok(false)
        }

        fn stop_accessing(&self, _token: &AccessToken) -> Result<(), ScopeError> {
            Ok(())
        }
    }

    fn outside_roots() -> SandboxRoots {
        SandboxRoots::new("/nonexistent/container", "/nonexistent/tmp")
    }

    fn enricher(roots: SandboxRoots, scope: Arc<dyn SecurityScope>) -> ItemEnricher {
        ItemEnricher::new(roots, scope, Arc::new(PathDeduplicator::new()))
    }

    #[test]
    fn normalize_strips_trailing_and_dot_segments() {
        assert_eq!(normalize(Path::new("/x/dir/")), PathBuf::from("/x/dir"));
        assert_eq!(normalize(Path::new("/x//./dir")), PathBuf::from("/x/dir"));
        assert_eq!(normalize(Path::new("/x/../y")), PathBuf::from("/x/../y"));
    }

    #[test]
    fn trailing_slash_variant_is_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("folder");
        std::fs::create_dir(&folder).unwrap();
        let with_slash = PathBuf::from(format!("{}/", folder.display()));

        let enricher = enricher(outside_roots(), Arc::new(PortableBookmarks::new()));
        let descriptor = enricher.enrich(&with_slash, false).unwrap();
        assert_eq!(descriptor.path, folder.to_string_lossy());
        assert!(descriptor.is_directory);
        assert!(enricher.enrich(&folder, false).is_none());
    }

    #[test]
    fn roots_match_by_component() {
        let roots = SandboxRoots::new("/Users/me/Library/Containers/app", "/tmp");
        assert!(roots.contains(Path::new("/tmp/a.txt")));
        assert!(roots.contains(Path::new("/Users/me/Library/Containers/app/Data/x")));
        assert!(!roots.contains(Path::new("/tmpfoo/a.txt")));
        assert!(!roots.contains(Path::new("/Users/me/Desktop/a.txt")));
    }

    #[test]
    fn empty_roots_match_nothing() {
        let roots = SandboxRoots::new("", "");
        assert!(!roots.contains(Path::new("/anything")));
    }

    #[test]
    fn file_outside_sandbox_gets_token() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "a").unwrap();

        let enricher = enricher(outside_roots(), Arc::new(PortableBookmarks::new()));
        let descriptor = enricher.enrich(&file, false).unwrap();

        assert_eq!(descriptor.path, file.to_string_lossy());
        assert!(descriptor.access_token.is_some());
        assert!(!descriptor.is_directory);
        assert!(!descriptor.from_promise);
    }

    #[test]
    fn directory_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let enricher = enricher(outside_roots(), Arc::new(PortableBookmarks::new()));
        let descriptor = enricher.enrich(dir.path(), true).unwrap();
        assert!(descriptor.is_directory);
        assert!(descriptor.from_promise);
    }

    #[test]
    fn sandbox_local_path_has_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("inside.txt");
        std::fs::write(&file, "x").unwrap();

        let roots = SandboxRoots::new("/nonexistent/container", dir.path());
        let enricher = enricher(roots, Arc::new(PortableBookmarks::new()));
        let descriptor = enricher.enrich(&file, false).unwrap();
        assert!(descriptor.access_token.is_none());
    }

    #[test]
    fn missing_file_degrades_instead_of_failing() {
        let enricher = enricher(outside_roots(), Arc::new(PortableBookmarks::new()));
        let descriptor = enricher
            .enrich(Path::new("/nonexistent/desktop-drop/missing.txt"), false)
            .unwrap();
        assert!(!descriptor.is_directory);
        assert!(descriptor.access_token.is_none());
    }

    #[test]
    fn bookmark_failure_leaves_token_absent() {
        let dir = tempfile::tempdir().unwrap();
        let enricher = enricher(outside_roots(), Arc::new(FailingScope));
        let descriptor = enricher.enrich(dir.path(), false).unwrap();
        assert!(descriptor.access_token.is_none());
        assert!(descriptor.is_directory);
    }

    #[test]
    fn duplicate_path_is_suppressed() {
        let dir = tempfile::tempdir().unwrap();
        let enricher = enricher(outside_roots(), Arc::new(PortableBookmarks::new()));

        assert!(enricher.enrich_and_record(dir.path(), false));
        assert!(!enricher.enrich_and_record(dir.path(), true));
        assert_eq!(enricher.dedup().take_recorded().len(), 1);
    }
}
