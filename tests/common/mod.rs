// tests/common/mod.rs
#![allow(dead_code)]

use git2::{BranchType, Oid, Repository, RepositoryInitOptions, Signature};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// A bare `origin` repository in a scratch directory, seeded with one commit
/// on its default branch. Every change goes through a fresh clone and a push.
pub struct Origin {
    base: TempDir,
    origin_dir: PathBuf,
    pub default_branch: String,
    pub first_commit: Oid,
}

impl Origin {
    pub fn new(default_branch: &str) -> Self {
        let base = TempDir::new().unwrap();
        let origin_dir = base.path().join("origin");

        let mut options = RepositoryInitOptions::new();
        options.bare(true).initial_head(default_branch);
        Repository::init_opts(&origin_dir, &options).unwrap();

        let setup_dir = base.path().join("setup");
        let mut options = RepositoryInitOptions::new();
        options.initial_head(default_branch);
        let setup = Repository::init_opts(&setup_dir, &options).unwrap();
        let first_commit = commit_file(&setup, "README.md", "# test", "first commit");
        setup
            .remote("origin", origin_dir.to_str().unwrap())
            .unwrap();
        push(&setup, &[default_branch]);

        Origin {
            base,
            origin_dir,
            default_branch: default_branch.to_string(),
            first_commit,
        }
    }

    /// Scratch directory holding the origin and every clone
    pub fn base_dir(&self) -> &Path {
        self.base.path()
    }

    /// Clone the origin, checking out each of `branches` in turn; the last
    /// one stays checked out. With no branches only the default one is.
    pub fn clone(&self, branches: &[&str]) -> PathBuf {
        let clone_dir = self.base.path().join(Uuid::new_v4().to_string());
        let repo = Repository::clone(self.origin_dir.to_str().unwrap(), &clone_dir).unwrap();

        for branch in branches {
            if repo.find_branch(branch, BranchType::Local).is_err() {
                let upstream = format!("origin/{}", branch);
                let target = repo
                    .find_branch(&upstream, BranchType::Remote)
                    .unwrap()
                    .get()
                    .peel_to_commit()
                    .unwrap();
                let mut local = repo.branch(branch, &target, false).unwrap();
                local.set_upstream(Some(upstream.as_str())).unwrap();
            }
            repo.set_head(&format!("refs/heads/{}", branch)).unwrap();
            repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
                .unwrap();
        }

        clone_dir
    }

    /// Commit `content` to `file_name` on `branch` (default branch if `None`) and push it
    pub fn commit(&self, file_name: &str, content: &str, message: &str, branch: Option<&str>) -> Oid {
        let branch = branch.unwrap_or(self.default_branch.as_str());
        let repo = Repository::open(self.clone(&[branch])).unwrap();

        let commit = commit_file(&repo, file_name, content, message);
        push(&repo, &[branch]);
        commit
    }

    /// Delete `file_name` on `branch` and push the commit
    pub fn delete(&self, file_name: &str, message: &str, branch: &str) -> Oid {
        let repo = Repository::open(self.clone(&[branch])).unwrap();
        fs::remove_file(repo.workdir().unwrap().join(file_name)).unwrap();

        let mut index = repo.index().unwrap();
        index.remove_path(Path::new(file_name)).unwrap();
        index.write().unwrap();

        let commit = write_commit(&repo, message);
        push(&repo, &[branch]);
        commit
    }

    /// Create `name` on the default branch tip and push it
    pub fn create_branch(&self, name: &str) {
        let repo = Repository::open(self.clone(&[])).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();

        repo.branch(name, &head, false).unwrap();
        push(&repo, &[name]);
    }
}

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

fn commit_file(repo: &Repository, file_name: &str, content: &str, message: &str) -> Oid {
    fs::write(repo.workdir().unwrap().join(file_name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file_name)).unwrap();
    index.write().unwrap();

    write_commit(repo, message)
}

fn write_commit(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = signature();

    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}

fn push(repo: &Repository, branches: &[&str]) {
    let refspecs: Vec<String> = branches
        .iter()
        .map(|branch| format!("refs/heads/{0}:refs/heads/{0}", branch))
        .collect();

    repo.find_remote("origin").unwrap().push(&refspecs, None).unwrap();
}

/// Parse `key=value` lines the way a CI runner reads its output file
pub fn parse_outputs(path: &Path) -> Vec<(String, String)> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Commit ids reachable from `tip`
pub fn history(repo: &Repository, tip: Oid) -> Vec<Oid> {
    let mut revwalk = repo.revwalk().unwrap();
    revwalk.push(tip).unwrap();
    revwalk.map(|oid| oid.unwrap()).collect()
}

/// Whether the working tree has no untracked files and no uncommitted changes
pub fn is_clean(path: &Path) -> bool {
    let repo = Repository::open(path).unwrap();
    let mut options = git2::StatusOptions::new();
    options.include_untracked(true).recurse_untracked_dirs(true);

    let clean = repo.statuses(Some(&mut options)).unwrap().is_empty();
    clean
}
