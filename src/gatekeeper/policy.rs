//! Exclusion policy: which resource paths bypass locking.

use crate::error::{AgentLockError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Glob-based filter evaluated before any lease is requested.
///
/// A path is excluded if it lies under one of the fixed directories (the
/// lock and activity directories) or if any glob matches it: relative to
/// the base directory when it lies inside it, otherwise as a full path.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    globs: GlobSet,
    patterns: Vec<String>,
    excluded_dirs: Vec<PathBuf>,
}

impl ExclusionPolicy {
    /// Build a policy from glob patterns.
    pub fn from_patterns(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                AgentLockError::UserError(format!(
                    "invalid exclude pattern '{}': {}",
                    pattern, e
                ))
            })?;
            builder.add(glob);
        }
        let globs = builder.build().map_err(|e| {
            AgentLockError::UserError(format!("failed to build exclude patterns: {}", e))
        })?;

        Ok(Self {
            globs,
            patterns: patterns.to_vec(),
            excluded_dirs: Vec::new(),
        })
    }

    /// Also exclude everything under `dir`.
    pub fn with_excluded_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.excluded_dirs.push(dir.into());
        self
    }

    /// The glob patterns this policy was built from.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `path` bypasses locking.
    ///
    /// `base` is the directory relative patterns are written against
    /// (usually the agent's working directory).
    pub fn is_excluded(&self, path: &Path, base: Option<&Path>) -> bool {
        if self.excluded_dirs.iter().any(|dir| path.starts_with(dir)) {
            return true;
        }
        // Match inside the base directory on the relative form only, so a
        // checkout that itself lives under e.g. `/tmp` is not excluded wholesale.
        match base.and_then(|b| path.strip_prefix(b).ok()) {
            Some(relative) => self.globs.is_match(relative),
            None => self.globs.is_match(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::default_exclude_patterns;

    fn default_policy() -> ExclusionPolicy {
        ExclusionPolicy::from_patterns(&default_exclude_patterns()).unwrap()
    }

    #[test]
    fn default_patterns_exclude_noise() {
        let policy = default_policy();

        for path in [
            "/repo/build.log",
            "/repo/scratch.tmp",
            "/repo/.git/index",
            "/repo/web/node_modules/react/index.js",
            "/repo/target/debug/app",
            "/repo/.agentlock/locks/x.lock",
            "/repo/py/__pycache__/m.pyc",
        ] {
            assert!(policy.is_excluded(Path::new(path), None), "{}", path);
        }
    }

    #[test]
    fn default_patterns_keep_source_files() {
        let policy = default_policy();
        assert_eq!(policy.patterns(), default_exclude_patterns().as_slice());

        for path in ["/repo/src/main.rs", "/repo/cfg.json", "/repo/docs/target.md"] {
            assert!(!policy.is_excluded(Path::new(path), None), "{}", path);
        }
    }

    #[test]
    fn relative_patterns_match_against_base() {
        let policy = ExclusionPolicy::from_patterns(&["docs/**".to_string()]).unwrap();
        let base = Path::new("/repo");

        assert!(policy.is_excluded(Path::new("/repo/docs/guide.md"), Some(base)));
        assert!(!policy.is_excluded(Path::new("/repo/src/docs.rs"), Some(base)));
        assert!(!policy.is_excluded(Path::new("/elsewhere/docs/guide.md"), Some(base)));
    }

    #[test]
    fn excluded_dirs_match_by_prefix() {
        let policy = ExclusionPolicy::from_patterns(&[])
            .unwrap()
            .with_excluded_dir("/state/locks");

        assert!(policy.is_excluded(Path::new("/state/locks/a.lock"), None));
        assert!(!policy.is_excluded(Path::new("/state/lockstep.rs"), None));
    }

    #[test]
    fn invalid_pattern_is_user_error() {
        let err = ExclusionPolicy::from_patterns(&["a/[b".to_string()]).unwrap_err();
        assert!(matches!(err, AgentLockError::UserError(_)));
    }
}
