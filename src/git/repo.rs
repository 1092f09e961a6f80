use crate::error::{Result, StockError};
use crate::model::{BlameHunk, CommitInfo};
use git2::{BlameOptions, ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

const FILEMODE_LINK: i32 = 0o120000;

/// Thin wrapper around the libgit2 repository handle. The handle is `Send`
/// but not `Sync`; concurrent consumers open one `GitRepo` per thread.
pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or discover one from the current dir.
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        let repo = Repository::discover(&repo_path)?;
        let path = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Rev-parse `rev` (default `HEAD`) down to a commit.
    pub fn resolve_commit(&self, rev: Option<&str>) -> Result<CommitInfo> {
        let spec = rev.unwrap_or("HEAD");
        let object = self.repo.revparse_single(spec)?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| StockError::NotACommit(spec.to_string()))?;
        Ok(self.commit_info(&commit))
    }

    pub fn commit_lookup(&self, id: Oid) -> Result<CommitInfo> {
        let commit = self.repo.find_commit(id)?;
        Ok(self.commit_info(&commit))
    }

    fn commit_info(&self, commit: &git2::Commit<'_>) -> CommitInfo {
        let author = commit.author();
        CommitInfo {
            id: commit.id(),
            timestamp: commit.time().seconds(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            summary: commit.summary().unwrap_or("").to_string(),
        }
    }

    /// Reachability walk over parents starting at `head`. A seen-set keeps
    /// every commit in the result exactly once even across merge diamonds.
    pub fn walk_commits(&self, head: Oid) -> Result<Vec<CommitInfo>> {
        let mut commits = Vec::new();
        let mut seen: HashSet<Oid> = HashSet::new();
        let mut stack: VecDeque<Oid> = VecDeque::from([head]);

        while let Some(id) = stack.pop_back() {
            if !seen.insert(id) {
                continue;
            }

            // Missing parents happen in shallow clones; they shrink
            // coverage but never abort the walk.
            let commit = match self.repo.find_commit(id) {
                Ok(commit) => commit,
                Err(_) => continue,
            };

            commits.push(self.commit_info(&commit));

            for parent in commit.parent_ids() {
                stack.push_back(parent);
            }
        }

        Ok(commits)
    }

    /// All text-blob paths in the tree of commit `at`. Symlinks, binary
    /// blobs, and unreadable objects are left out.
    pub fn tree_files(&self, at: Oid) -> Result<Vec<String>> {
        let commit = self.repo.find_commit(at)?;
        let tree = commit.tree()?;

        let mut candidates: Vec<(String, Oid, i32)> = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    candidates.push((format!("{root}{name}"), entry.id(), entry.filemode()));
                }
            }
            TreeWalkResult::Ok
        })?;

        let mut files = Vec::with_capacity(candidates.len());
        for (path, id, filemode) in candidates {
            if filemode == FILEMODE_LINK {
                continue;
            }
            if let Ok(blob) = self.repo.find_blob(id) {
                if !blob.is_binary() {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    /// Per-line attribution for `path` as of commit `at`, one hunk per
    /// contiguous run of lines from the same commit. Timestamps and
    /// signatures come from each hunk's final commit.
    pub fn blame_file(&self, path: &str, at: Oid) -> Result<Vec<BlameHunk>> {
        let mut options = BlameOptions::new();
        options.newest_commit(at);

        let blame = self.repo.blame_file(Path::new(path), Some(&mut options))?;

        let mut hunks = Vec::with_capacity(blame.len());
        for hunk in blame.iter() {
            let commit = match self.repo.find_commit(hunk.final_commit_id()) {
                Ok(commit) => commit,
                Err(_) => continue,
            };
            let committer = commit.committer();

            hunks.push(BlameHunk {
                timestamp: commit.time().seconds(),
                author_name: committer.name().unwrap_or("").to_string(),
                author_email: committer.email().unwrap_or("").to_string(),
                lines: hunk.lines_in_hunk() as u64,
            });
        }

        Ok(hunks)
    }
}
