use crate::cli::CommonArgs;
use crate::error::{Result, StockError};
use crate::mailmap::Mailmap;
use crate::model::Identity;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Explicit run configuration: exclusion rules, identity resolution, and the
/// optional "now" reference instant. Passed into the aggregators instead of
/// living in process-global state so the engine stays testable.
pub struct Config {
    excludes: Option<Gitignore>,
    mailmap: Mailmap,
    pub now: Option<i64>,
}

impl Config {
    pub fn new(excludes: Option<Gitignore>, mailmap: Mailmap, now: Option<i64>) -> Self {
        Self {
            excludes,
            mailmap,
            now,
        }
    }

    pub fn from_args(common: &CommonArgs, repo_root: &Path) -> Result<Self> {
        let excludes = if common.exclude.is_empty() {
            None
        } else {
            Some(build_excludes(&common.exclude)?)
        };

        let mailmap = if let Some(path) = &common.mailmap {
            Mailmap::from_path(path)?
        } else if common.use_mailmap {
            Mailmap::from_path(repo_root.join(".mailmap"))?
        } else {
            Mailmap::empty()
        };

        let now = if common.now {
            Some(chrono::Utc::now().timestamp())
        } else {
            None
        };

        Ok(Self::new(excludes, mailmap, now))
    }

    pub fn should_skip(&self, path: &str) -> bool {
        match &self.excludes {
            Some(excludes) => excludes.matched(path, false).is_ignore(),
            None => false,
        }
    }

    pub fn resolve(&self, email: &str, name: &str) -> Identity {
        self.mailmap.resolve(email, name)
    }

    /// Reference instant for age computations: the "now" override when set,
    /// otherwise the newest commit timestamp of whatever is being reported.
    pub fn offset_for(&self, last_commit: Option<i64>) -> i64 {
        self.now.or(last_commit).unwrap_or(0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, Mailmap::empty(), None)
    }
}

fn build_excludes(patterns: &[String]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new("");
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| StockError::ExcludePattern(format!("{pattern}: {e}")))?;
    }
    builder
        .build()
        .map_err(|e| StockError::ExcludePattern(e.to_string()))
}
