use crate::domain::ReleaseBranch;
use crate::error::{ReferenceRole, ReleaserError, Result};
use crate::git::{Reference, ReleaseRepository, HEAD};
use git2::Oid;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
struct MockState {
    local: BTreeMap<String, Oid>,
    remote: BTreeMap<String, Oid>,
    head: Option<String>,
    next_commit: u8,
    root_commit: Option<Oid>,
    tags: BTreeMap<String, Oid>,
    pushed: Vec<String>,
    operations: Vec<String>,
}

impl MockState {
    fn new_commit(&mut self) -> Oid {
        self.next_commit = self.next_commit.wrapping_add(1);
        Oid::from_bytes(&[self.next_commit; 20]).unwrap_or_else(|_| Oid::zero())
    }
}

/// In-memory repository for exercising the workflows without git
///
/// Branch tips are synthetic commit ids; every mutating call is recorded so
/// tests can assert on the sequence of operations.
pub struct MockRepository {
    workdir: PathBuf,
    default_branch: String,
    state: RefCell<MockState>,
}

impl MockRepository {
    /// Create a repository whose remote has only the default branch
    pub fn new(workdir: impl Into<PathBuf>, default_branch: impl Into<String>) -> Self {
        let default_branch = default_branch.into();
        let mut state = MockState::default();
        let root = state.new_commit();
        state.root_commit = Some(root);
        state.remote.insert(default_branch.clone(), root);
        state.local.insert(default_branch.clone(), root);
        state.head = Some(default_branch.clone());

        MockRepository {
            workdir: workdir.into(),
            default_branch,
            state: RefCell::new(state),
        }
    }

    /// Add a branch to the remote with a fresh tip
    pub fn add_remote_branch(&self, name: impl Into<String>) -> Oid {
        let mut state = self.state.borrow_mut();
        let oid = state.new_commit();
        state.remote.insert(name.into(), oid);
        oid
    }

    /// Names of local branches
    pub fn local_branches(&self) -> Vec<String> {
        self.state.borrow().local.keys().cloned().collect()
    }

    /// Currently checked-out branch
    pub fn current_branch(&self) -> Option<String> {
        self.state.borrow().head.clone()
    }

    /// Tip of a local branch
    pub fn local_tip(&self, name: &str) -> Option<Oid> {
        self.state.borrow().local.get(name).copied()
    }

    /// Root commit every branch descends from
    pub fn root_commit(&self) -> Oid {
        self.state.borrow().root_commit.unwrap_or_else(Oid::zero)
    }

    /// Tags created so far
    pub fn tags(&self) -> Vec<String> {
        self.state.borrow().tags.keys().cloned().collect()
    }

    /// Ref names handed to non-dry-run pushes
    pub fn pushed(&self) -> Vec<String> {
        self.state.borrow().pushed.clone()
    }

    /// Recorded mutating operations, in order
    pub fn operations(&self) -> Vec<String> {
        self.state.borrow().operations.clone()
    }

    fn record(&self, operation: String) {
        self.state.borrow_mut().operations.push(operation);
    }
}

impl ReleaseRepository for MockRepository {
    fn default_branch(&self) -> &str {
        &self.default_branch
    }

    fn workdir(&self) -> Result<PathBuf> {
        Ok(self.workdir.clone())
    }

    fn remote_url(&self) -> Result<String> {
        Ok("https://example.com/organization/repository.git".to_string())
    }

    fn find_reference(&self, name: &str) -> Result<Option<Reference>> {
        let state = self.state.borrow();

        if name == HEAD {
            return Ok(state.head.as_ref().and_then(|branch| {
                state.local.get(branch).map(|target| Reference::Head {
                    target: *target,
                    branch: Some(branch.clone()),
                })
            }));
        }

        if let Some(target) = state.local.get(name) {
            return Ok(Some(Reference::Local {
                name: name.to_string(),
                target: *target,
            }));
        }

        Ok(state.remote.get(name).map(|target| Reference::Remote {
            remote: "origin".to_string(),
            name: name.to_string(),
            target: *target,
        }))
    }

    fn checkout(&self, branch: &str, base: &str) -> Result<()> {
        let reference = self.find_reference(branch)?;
        let mut state = self.state.borrow_mut();

        match reference {
            Some(Reference::Remote { name, target, .. }) => {
                state.local.insert(name.clone(), target);
                state.head = Some(name);
            }
            Some(Reference::Local { name, .. }) => state.head = Some(name),
            Some(Reference::Head { .. }) => {}
            None => {
                drop(state);
                let target = match self.find_reference(base)? {
                    Some(reference) => reference.target(),
                    None => Oid::from_str(base)?,
                };
                let mut state = self.state.borrow_mut();
                state.local.insert(branch.to_string(), target);
                state.head = Some(branch.to_string());
                state
                    .operations
                    .push(format!("create {} on {}", branch, base));
                return Ok(());
            }
        }

        state.operations.push(format!("checkout {}", branch));
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        if !self.state.borrow().local.contains_key(branch) {
            return Ok(());
        }

        let default_branch = self.default_branch.clone();
        self.checkout(&default_branch, HEAD)?;

        self.state.borrow_mut().local.remove(branch);
        self.record(format!("delete {}", branch));
        Ok(())
    }

    fn find_release_branches(&self) -> Result<Vec<ReleaseBranch>> {
        let mut branches: Vec<ReleaseBranch> = self
            .state
            .borrow()
            .remote
            .keys()
            .filter_map(|name| ReleaseBranch::parse(name))
            .collect();

        ReleaseBranch::sort_descending(&mut branches);
        Ok(branches)
    }

    fn find_first_commit(&self) -> Result<Oid> {
        Ok(self.root_commit())
    }

    fn merge(&self, source: &str, target: &str, message: Option<&str>) -> Result<Oid> {
        if self.find_reference(source)?.is_none() {
            return Err(ReleaserError::not_found(ReferenceRole::Source, source));
        }
        if self.find_reference(target)?.is_none() {
            return Err(ReleaserError::not_found(ReferenceRole::Target, target));
        }

        self.checkout(target, HEAD)?;

        let mut state = self.state.borrow_mut();
        let merge_commit = state.new_commit();
        state.local.insert(target.to_string(), merge_commit);
        let message = match message {
            Some(message) => message.to_string(),
            None => format!("Merge `{}` into `{}`", source, target),
        };
        state.operations.push(message);
        Ok(merge_commit)
    }

    fn commit(&self, files: &[&Path], message: &str) -> Result<Oid> {
        let mut state = self.state.borrow_mut();
        let branch = state
            .head
            .clone()
            .ok_or_else(|| ReleaserError::not_found(ReferenceRole::Target, HEAD))?;
        let commit = state.new_commit();
        state.local.insert(branch, commit);

        let files: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        state
            .operations
            .push(format!("commit [{}] {}", files.join(", "), message));
        Ok(commit)
    }

    fn tag(&self, name: &str, message: &str, commit: Oid) -> Result<Oid> {
        let mut state = self.state.borrow_mut();
        state.tags.insert(name.to_string(), commit);
        state.operations.push(format!("tag {} {}", name, message));
        Ok(commit)
    }

    fn push(&self, ref_names: &[&str], dry_run: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        for name in ref_names {
            if !state.local.contains_key(*name) && !state.tags.contains_key(*name) {
                return Err(ReleaserError::not_found(ReferenceRole::Push, *name));
            }
        }

        let names = ref_names.join(", ");
        if dry_run {
            state.operations.push(format!("push (dry run) {}", names));
        } else {
            state.pushed.extend(ref_names.iter().map(|n| n.to_string()));
            state.operations.push(format!("push {}", names));
        }
        Ok(())
    }
}
