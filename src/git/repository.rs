use crate::config::{CommitterConfig, Config};
use crate::domain::ReleaseBranch;
use crate::error::{ReferenceRole, ReleaserError, Result};
use crate::git::{Reference, ReleaseRepository, HEAD};
use git2::build::CheckoutBuilder;
use git2::{
    BranchType, ErrorCode, ObjectType, Oid, Repository as Git2Repo, ResetType, Signature,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Wrapper around git2::Repository implementing the release operations
pub struct Git2Repository {
    repo: Git2Repo,
    remote: String,
    default_branch: String,
    committer: CommitterConfig,
}

impl Git2Repository {
    /// Open an existing repository with a working tree
    ///
    /// Fails with [ReleaserError::DefaultBranchNotFound] when none of the
    /// configured default branch candidates exists on the remote.
    pub fn open<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let repo = Git2Repo::open(path)?;

        Self::from_git2(repo, config)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo, config: &Config) -> Result<Self> {
        let default_branch = config
            .default_branches
            .iter()
            .find(|candidate| {
                repo.find_branch(
                    &format!("{}/{}", config.remote, candidate),
                    BranchType::Remote,
                )
                .is_ok()
            })
            .cloned()
            .ok_or(ReleaserError::DefaultBranchNotFound)?;

        debug!("Default branch is '{}'", default_branch);

        Ok(Git2Repository {
            repo,
            remote: config.remote.clone(),
            default_branch,
            committer: config.committer.clone(),
        })
    }

    /// Name of the remote releases are pushed to
    pub fn remote_name(&self) -> &str {
        &self.remote
    }

    /// Tip of a branch, or `None` when no branch by that name exists
    fn branch_target(&self, name: &str, branch_type: BranchType) -> Result<Option<Oid>> {
        match self.repo.find_branch(name, branch_type) {
            Ok(branch) => Ok(branch.get().target()),
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn head_reference(&self) -> Result<Option<Reference>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        let Some(target) = head.target() else {
            return Ok(None);
        };
        let branch = if head.is_branch() {
            head.shorthand().map(str::to_string)
        } else {
            None
        };

        Ok(Some(Reference::Head { target, branch }))
    }

    /// Point HEAD at `reference` (if given) and force the tree to match it.
    ///
    /// Local branches are attached; remote-tracking branches and detached heads
    /// are checked out detached.
    fn checkout_clean(&self, reference: Option<&Reference>) -> Result<()> {
        if let Some(reference) = reference {
            match reference {
                Reference::Local { name, .. }
                | Reference::Head {
                    branch: Some(name), ..
                } => {
                    self.repo.set_head(&format!("refs/heads/{}", name))?;
                }
                Reference::Head {
                    target,
                    branch: None,
                }
                | Reference::Remote { target, .. } => {
                    self.repo.set_head_detached(*target)?;
                }
            }
        }

        self.clean_working_tree()
    }

    /// Hard reset to HEAD, then drop untracked files and directories
    fn clean_working_tree(&self) -> Result<()> {
        let head = self.repo.head()?.peel(ObjectType::Commit)?;
        self.repo.reset(&head, ResetType::Hard, None)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true);
        self.repo.checkout_head(Some(&mut checkout))?;

        Ok(())
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(_) => Ok(Signature::now(
                &self.committer.name,
                &self.committer.email,
            )?),
        }
    }

    /// Full refspec for a short branch or tag name; tags win over branches
    fn push_refspec(&self, name: &str) -> Result<String> {
        for namespace in ["refs/tags", "refs/heads"] {
            let full_name = format!("{}/{}", namespace, name);
            if self.repo.find_reference(&full_name).is_ok() {
                return Ok(format!("{0}:{0}", full_name));
            }
        }

        Err(ReleaserError::not_found(ReferenceRole::Push, name))
    }
}

/// Credential and status callbacks for network operations.
///
/// Tries SSH keys from `~/.ssh/`, then the SSH agent, then default credentials.
fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();

    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => {
            warn!("Remote rejected {}: {}", refname, status);
            Err(git2::Error::from_str(&format!(
                "Push failed for {}: {}",
                refname, status
            )))
        }
        None => Ok(()),
    });

    callbacks
}

impl ReleaseRepository for Git2Repository {
    fn default_branch(&self) -> &str {
        &self.default_branch
    }

    fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| git2::Error::from_str("repository has no working tree").into())
    }

    fn remote_url(&self) -> Result<String> {
        let remote = self.repo.find_remote(&self.remote)?;

        Ok(remote.url().unwrap_or_default().to_string())
    }

    fn find_reference(&self, name: &str) -> Result<Option<Reference>> {
        if name == HEAD {
            return self.head_reference();
        }

        if let Some(target) = self.branch_target(name, BranchType::Local)? {
            return Ok(Some(Reference::Local {
                name: name.to_string(),
                target,
            }));
        }

        let remote_branch = format!("{}/{}", self.remote, name);
        if let Some(target) = self.branch_target(&remote_branch, BranchType::Remote)? {
            return Ok(Some(Reference::Remote {
                remote: self.remote.clone(),
                name: name.to_string(),
                target,
            }));
        }

        Ok(None)
    }

    fn checkout(&self, branch: &str, base: &str) -> Result<()> {
        match self.find_reference(branch)? {
            Some(Reference::Remote {
                remote,
                name,
                target,
            }) => {
                debug!("Creating '{}' tracking '{}/{}'", name, remote, name);
                let commit = self.repo.find_commit(target)?;
                let mut local = self.repo.branch(&name, &commit, false)?;
                let upstream = format!("{}/{}", remote, name);
                local.set_upstream(Some(upstream.as_str()))?;

                self.checkout_clean(Some(&Reference::Local { name, target }))
            }
            Some(reference @ (Reference::Local { .. } | Reference::Head { .. })) => {
                self.checkout_clean(Some(&reference))
            }
            None => {
                let target = match self.find_reference(base)? {
                    Some(reference) => reference.target(),
                    None => self.repo.revparse_single(base)?.peel_to_commit()?.id(),
                };
                debug!("Creating '{}' on '{}' ({})", branch, base, target);
                let commit = self.repo.find_commit(target)?;
                self.repo.branch(branch, &commit, false)?;

                self.checkout_clean(Some(&Reference::Local {
                    name: branch.to_string(),
                    target,
                }))
            }
        }
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        if self.branch_target(branch, BranchType::Local)?.is_none() {
            return Ok(());
        }

        if self.find_reference(&self.default_branch)?.is_none() {
            return Err(ReleaserError::not_found(
                ReferenceRole::Default,
                self.default_branch.as_str(),
            ));
        }
        self.checkout(&self.default_branch, HEAD)?;

        self.repo.find_branch(branch, BranchType::Local)?.delete()?;
        debug!("Deleted branch '{}'", branch);

        Ok(())
    }

    fn find_release_branches(&self) -> Result<Vec<ReleaseBranch>> {
        let prefix = format!("{}/", self.remote);
        let mut release_branches = Vec::new();

        for entry in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                if let Some(release) = name.strip_prefix(&prefix).and_then(ReleaseBranch::parse) {
                    release_branches.push(release);
                }
            }
        }

        ReleaseBranch::sort_descending(&mut release_branches);
        Ok(release_branches)
    }

    fn find_first_commit(&self) -> Result<Oid> {
        let remote_default = format!("{}/{}", self.remote, self.default_branch);
        let tip = self
            .branch_target(&remote_default, BranchType::Remote)?
            .ok_or_else(|| ReleaserError::not_found(ReferenceRole::Default, remote_default))?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(tip)?;

        for oid in revwalk {
            let oid = oid?;
            if self.repo.find_commit(oid)?.parent_count() == 0 {
                return Ok(oid);
            }
        }

        Err(git2::Error::from_str("no root commit reachable from the default branch").into())
    }

    fn merge(&self, source: &str, target: &str, message: Option<&str>) -> Result<Oid> {
        let source_reference = self
            .find_reference(source)?
            .ok_or_else(|| ReleaserError::not_found(ReferenceRole::Source, source))?;
        let target_reference = self
            .find_reference(target)?
            .ok_or_else(|| ReleaserError::not_found(ReferenceRole::Target, target))?;

        // Remote-only targets get a local tracking branch so the merge commit lands on it
        self.checkout(target, HEAD)?;

        let source_commit = self.repo.find_commit(source_reference.target())?;
        let target_commit = self.repo.find_commit(target_reference.target())?;
        let base = self.repo.merge_base(source_commit.id(), target_commit.id())?;
        let base_tree = self.repo.find_commit(base)?.tree()?;

        let mut index = self.repo.merge_trees(
            &base_tree,
            &target_commit.tree()?,
            &source_commit.tree()?,
            None,
        )?;

        if index.has_conflicts() {
            let paths = index
                .conflicts()?
                .filter_map(|conflict| conflict.ok())
                .filter_map(|conflict| conflict.our.or(conflict.their).or(conflict.ancestor))
                .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
                .collect();

            return Err(ReleaserError::MergeConflict {
                source_branch: source.to_string(),
                target_branch: target.to_string(),
                paths,
            });
        }

        let tree = self.repo.find_tree(index.write_tree_to(&self.repo)?)?;
        let message = match message {
            Some(message) => message.to_string(),
            None => format!("Merge `{}` into `{}`", source, target),
        };
        let signature = self.signature()?;

        let merge_commit = self.repo.commit(
            Some(HEAD),
            &signature,
            &signature,
            &message,
            &tree,
            &[&target_commit, &source_commit],
        )?;
        info!("Merged '{}' into '{}' as {}", source, target, merge_commit);

        self.checkout_clean(None)?;
        Ok(merge_commit)
    }

    fn commit(&self, files: &[&Path], message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        for file in files {
            index.add_path(file)?;
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let parent = self.repo.head()?.peel_to_commit()?;
        let signature = self.signature()?;

        Ok(self.repo.commit(
            Some(HEAD),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?)
    }

    fn tag(&self, name: &str, message: &str, commit: Oid) -> Result<Oid> {
        let object = self.repo.find_object(commit, Some(ObjectType::Commit))?;
        let signature = self.signature()?;

        Ok(self.repo.tag(name, &object, &signature, message, false)?)
    }

    fn push(&self, ref_names: &[&str], dry_run: bool) -> Result<()> {
        let refspecs = ref_names
            .iter()
            .map(|name| self.push_refspec(name))
            .collect::<Result<Vec<_>>>()?;

        if dry_run {
            info!(
                "[DRY RUN] Would push {} to '{}'",
                refspecs.join(", "),
                self.remote
            );
            return Ok(());
        }

        let mut remote = self.repo.find_remote(&self.remote).map_err(|e| {
            ReleaserError::remote(format!("Cannot find remote '{}': {}", self.remote, e))
        })?;

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(remote_callbacks());

        let refspec_strs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| ReleaserError::remote(format!("Push failed: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_without_remote_default_branch() {
        let dir = tempfile::TempDir::new().unwrap();
        Git2Repo::init(dir.path()).unwrap();

        let result = Git2Repository::open(dir.path(), &Config::default());
        assert!(matches!(result, Err(ReleaserError::DefaultBranchNotFound)));
    }

    #[test]
    fn test_open_missing_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Git2Repository::open(dir.path().join("missing"), &Config::default());
        assert!(matches!(result, Err(ReleaserError::Git(_))));
    }
}
