//! Repository-root resolution.
//!
//! The root can be injected explicitly (preferred for testability);
//! otherwise it is resolved fresh by shelling out to
//! `git rev-parse --show-toplevel`. A non-zero exit becomes the tagged
//! [`Error::RepoRootNotFound`] so callers can branch on the failure
//! kind instead of parsing a subprocess error.

use bof_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolves the repository root, honoring an explicit override.
pub fn resolve_repo_root(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(root) => Ok(root.to_path_buf()),
        None => git_toplevel(None),
    }
}

/// Resolves the root by running git in `cwd` (current directory when
/// `None`).
pub fn git_toplevel(cwd: Option<&Path>) -> Result<PathBuf> {
    let mut command = Command::new("git");
    command.args(["rev-parse", "--show-toplevel"]);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().map_err(Error::Io)?;

    if !output.status.success() {
        return Err(Error::RepoRootNotFound);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(PathBuf::from(stdout.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_override_wins() {
        let root = resolve_repo_root(Some(Path::new("/srv/project"))).unwrap();
        assert_eq!(root, PathBuf::from("/srv/project"));
    }

    #[test]
    fn test_outside_repository_is_tagged_error() {
        // A fresh temp directory is not under version control.
        let dir = tempfile::tempdir().unwrap();
        let result = git_toplevel(Some(dir.path()));
        match result {
            Err(Error::RepoRootNotFound) => {
                assert_eq!(
                    Error::RepoRootNotFound.to_string(),
                    "not inside a Git repository"
                );
            }
            // Machines without git surface the spawn failure as IO.
            Err(Error::Io(_)) => {}
            other => panic!("expected RepoRootNotFound, got {other:?}"),
        }
    }
}
