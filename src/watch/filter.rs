// src/watch/filter.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::{Event, EventKind};

use crate::errors::{DevloopError, Result};

/// Decides which filesystem notifications count as a source change.
#[derive(Clone)]
pub struct ChangeFilter {
    root: PathBuf,
    ignore: GlobSet,
}

impl fmt::Debug for ChangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFilter")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ChangeFilter {
    /// `patterns` are globs evaluated against paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                DevloopError::ConfigError(format!("invalid ignore pattern '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }
        let ignore = builder
            .build()
            .map_err(|e| DevloopError::ConfigError(format!("building ignore glob set: {e}")))?;

        Ok(Self {
            root: root.into(),
            ignore,
        })
    }

    /// Whether `path` (absolute, or relative to the root) is ignored.
    pub fn is_ignored(&self, path: &Path) -> bool {
        match relative_str(&self.root, path) {
            Some(rel) => self.ignore.is_match(rel),
            None => self.ignore.is_match(path),
        }
    }

    /// Whether a notification should (eventually) trigger a run.
    ///
    /// Only creations, modifications and removals count, and only if at
    /// least one affected path is not ignored. Events without paths (e.g.
    /// a rescan request) always count.
    pub fn is_relevant(&self, event: &Event) -> bool {
        let kind_matters = matches!(
            event.kind,
            EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        );
        if !kind_matters {
            return false;
        }

        event.paths.is_empty() || event.paths.iter().any(|p| !self.is_ignored(p))
    }
}

/// `path` relative to `root` with forward slashes, trying canonical forms
/// when the plain prefix doesn't match (symlinked temp dirs on macOS).
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if path.is_relative() {
        return Some(path.to_string_lossy().replace('\\', "/"));
    }

    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    let root = root.canonicalize().ok()?;
    let parent = path.parent()?.canonicalize().ok()?;
    let rel = parent.strip_prefix(&root).ok()?.join(path.file_name()?);
    Some(rel.to_string_lossy().replace('\\', "/"))
}
