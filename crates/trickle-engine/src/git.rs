//! Git-backed publisher: one commit per unit, pushed to GitHub over HTTPS

use anyhow::{bail, Context, Result};
use git2::{
    Commit, Cred, Direction, ErrorCode, PushOptions, RemoteCallbacks, Repository, Signature,
};
use std::path::Path;

use crate::publish::{PublishError, PublishResult, Publisher};

/// Identity used when the repository has no `user.name` / `user.email`
const FALLBACK_NAME: &str = "trickle";
const FALLBACK_EMAIL: &str = "trickle@localhost";

/// Connection settings beyond the repository identifier and token
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Remote name to create or update (default: "origin")
    pub remote: String,

    /// Branch to publish on; defaults to the checked-out branch or "main"
    pub branch: Option<String>,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: None,
        }
    }
}

/// Commits single files and pushes them to a GitHub repository
pub struct GitPublisher {
    repo: Repository,
    remote: String,
    branch: String,
    token: String,
}

impl GitPublisher {
    /// Opens (or initialises) the repository at `project_dir`, points the
    /// remote at `https://github.com/<repo_id>.git` and checks that it
    /// accepts the token for pushing.
    ///
    /// Any failure here is a setup error: nothing has been published yet.
    pub fn connect(
        project_dir: &Path,
        repo_id: &str,
        token: &str,
        options: PublishOptions,
    ) -> Result<Self> {
        let url = github_url(repo_id)?;

        let repo = match Repository::open(project_dir) {
            Ok(repo) => repo,
            Err(_) => {
                log::info!("No git repository at {:?}, initialising one", project_dir);
                Repository::init(project_dir).with_context(|| {
                    format!("Failed to initialise repository at {:?}", project_dir)
                })?
            }
        };

        match repo.find_remote(&options.remote) {
            Ok(remote) if remote.url() == Some(url.as_str()) => {}
            Ok(_) => {
                log::info!("Pointing remote '{}' at {}", options.remote, url);
                repo.remote_set_url(&options.remote, &url)
                    .context("Failed to update remote URL")?;
            }
            Err(_) => {
                log::info!("Adding remote '{}' → {}", options.remote, url);
                repo.remote(&options.remote, &url).context("Failed to add remote")?;
            }
        }

        let branch = resolve_branch(&repo, options.branch.as_deref())?;

        {
            // The connection disconnects when dropped
            let mut remote = repo.find_remote(&options.remote)?;
            let connection = remote
                .connect_auth(Direction::Push, Some(credentials(token)), None)
                .with_context(|| {
                    format!("Failed to connect to {} (check the token and repository)", url)
                })?;
            drop(connection);
        }

        log::info!("Connected to {} (branch '{}')", repo_id, branch);

        Ok(Self {
            repo,
            remote: options.remote,
            branch,
            token: token.to_string(),
        })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    fn signature(&self) -> Result<Signature<'static>, git2::Error> {
        self.repo
            .signature()
            .or_else(|_| Signature::now(FALLBACK_NAME, FALLBACK_EMAIL))
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>, git2::Error> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn push(&self) -> Result<(), PublishError> {
        let mut remote = self.repo.find_remote(&self.remote)?;

        let mut callbacks = credentials(&self.token);
        callbacks.push_update_reference(|refname, status| match status {
            Some(msg) => Err(git2::Error::from_str(&format!("{} rejected: {}", refname, msg))),
            None => Ok(()),
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", self.branch);
        remote
            .push(&[refspec.as_str()], Some(&mut options))
            .map_err(|e| PublishError::Remote(e.message().to_string()))
    }
}

impl Publisher for GitPublisher {
    fn publish(&mut self, file: &Path, message: &str) -> PublishResult {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| git2::Error::from_str("repository has no working directory"))?;
        if !workdir.join(file).is_file() {
            return Err(PublishError::FileMissing(file.to_path_buf()));
        }

        let mut index = self.repo.index()?;
        index.add_path(file)?;
        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = self.head_commit()?;
        if parent.as_ref().map(|c| c.tree_id()) == Some(tree_id) {
            return Err(PublishError::NoChanges);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.signature()?;
        let parents: Vec<&Commit> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        log::debug!("Committed {} as {}", file.display(), oid);
        self.push()?;
        Ok(oid.to_string())
    }
}

/// Credentials callback sending the token as HTTPS basic auth
fn credentials(token: &str) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        Cred::userpass_plaintext("x-access-token", token)
    });
    callbacks
}

/// Validates an `owner/name` identifier and builds its HTTPS URL
pub fn github_url(repo_id: &str) -> Result<String> {
    let repo_id = repo_id.trim().trim_end_matches(".git");
    let parts: Vec<&str> = repo_id.split('/').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
        bail!("Invalid repository '{}': expected <owner>/<name>", repo_id);
    }
    Ok(format!("https://github.com/{}.git", repo_id))
}

/// Picks the branch to publish on, switching an unborn HEAD if requested
fn resolve_branch(repo: &Repository, requested: Option<&str>) -> Result<String> {
    let head_ref = repo.find_reference("HEAD").context("Repository has no HEAD")?;
    let current = head_ref
        .symbolic_target()
        .and_then(|t| t.strip_prefix("refs/heads/"))
        .map(str::to_string);
    let unborn = repo.head().is_err();

    match (requested, current) {
        (Some(wanted), Some(current)) if wanted == current => Ok(current),
        (Some(wanted), _) if unborn => {
            repo.set_head(&format!("refs/heads/{}", wanted))
                .with_context(|| format!("Failed to switch to branch '{}'", wanted))?;
            Ok(wanted.to_string())
        }
        (Some(wanted), Some(current)) => bail!(
            "Branch '{}' requested but '{}' is checked out; switch branches first",
            wanted,
            current
        ),
        (Some(_), None) => bail!("HEAD is detached; check out a branch first"),
        (None, Some(current)) => Ok(current),
        (None, None) => bail!("HEAD is detached; check out a branch first"),
    }
}
