//! Repository history: git plumbing and the implemented-since diff
//!
//! Revisions are read with `git ls-tree` / `git show`; the working tree is
//! never checked out. Revisions older than [`SET_LISTING_REFACTOR`] use the
//! oldest card layout (see [`crate::legacy`]).

use crate::config::SETS_PATH;
use crate::error::{Error, Result};
use crate::models::CardRecord;
use crate::scanner::{TreeScan, TOKENS_DIR};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::process::{Command, Output};

/// First commit in which card classes declare their own `expansionSetCode`
pub const SET_LISTING_REFACTOR: &str = "e0b43883612d551873445ace182c5fc433b283d7";
/// First commit with one set class per set and no per-card classes
pub const SET_CLASS_REFACTOR: &str = "39eaaf727491e998ba6137a18fcdd18fde95b558";

/// One line of `git ls-tree` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: String,
    pub name: String,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.kind == "tree"
    }
}

fn git_output(repo: &Path, args: &[&str]) -> Result<Output> {
    log::debug!("git {}", args.join(" "));

    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .map_err(|e| Error::io(repo, e))
}

/// Run git in `repo` and return its stdout
fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    let output = git_output(repo, args)?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(Error::Git(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// `git pull` in the given checkout
pub fn pull(repo: &Path) -> Result<()> {
    if !repo.is_dir() {
        return Err(Error::DirectoryNotFound(repo.to_path_buf()));
    }
    log::info!("Pulling {}", repo.display());
    run_git(repo, &["pull"])?;
    Ok(())
}

/// Resolve a revision to its commit hash
pub fn resolve_revision(repo: &Path, revision: &str) -> Result<String> {
    let spec = format!("{}^{{commit}}", revision);
    run_git(repo, &["rev-parse", "--verify", "--quiet", &spec])
        .map(|out| out.trim().to_string())
        .map_err(|e| match e {
            Error::Git(_) => Error::RevisionNotFound(revision.to_string()),
            other => other,
        })
}

/// Whether `commit` is older than `marker`, i.e. `marker` is not one of its
/// ancestors; `None` when `marker` is not part of this repository
pub fn older_than(repo: &Path, commit: &str, marker: &str) -> Result<Option<bool>> {
    let output = git_output(repo, &["merge-base", "--is-ancestor", marker, commit])?;
    match output.status.code() {
        Some(0) => Ok(Some(false)),
        Some(1) => Ok(Some(true)),
        _ => {
            log::debug!(
                "{} not found: {}",
                marker,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Ok(None)
        }
    }
}

/// Parse `git ls-tree` output (`<mode> <type> <hash>\t<name>`)
pub fn parse_ls_tree(output: &str) -> Vec<TreeEntry> {
    output
        .lines()
        .filter_map(|line| {
            let (meta, name) = line.split_once('\t')?;
            let kind = meta.split_whitespace().nth(1)?;
            Some(TreeEntry {
                kind: kind.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// Entries of a directory at `revision`; a directory missing at that revision is empty
fn ls_tree(repo: &Path, revision: &str, dir: &str) -> Result<Vec<TreeEntry>> {
    match run_git(repo, &["ls-tree", &format!("{}:{}", revision, dir)]) {
        Ok(out) => Ok(parse_ls_tree(&out)),
        Err(Error::Git(msg)) => {
            log::debug!("{} not present at {}: {}", dir, revision, msg);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

fn show(repo: &Path, revision: &str, file: &str) -> Result<String> {
    run_git(repo, &["show", &format!("{}:{}", revision, file)])
}

fn add_revision_dir(
    scan: &mut TreeScan,
    repo: &Path,
    revision: &str,
    dir: &str,
    package: Option<&str>,
) -> Result<()> {
    for entry in ls_tree(repo, revision, dir)?.iter().filter(|e| !e.is_tree()) {
        let rel = format!("{}/{}", dir, entry.name);
        let text = show(repo, revision, &rel)?;
        match package {
            Some(package) => scan.add_file(package, &repo.join(&rel), &text),
            None => scan.add_root_file(&repo.join(&rel), &text),
        }
    }
    Ok(())
}

/// Scan the sets tree as of `revision`, the same way the filesystem scanner does
///
/// Revisions that predate [`SET_LISTING_REFACTOR`] are read with the set
/// listing layout. A repository without that commit (a shallow clone, or an
/// unrelated history) is read with the current layouts.
pub fn scan_revision(repo: &Path, revision: &str) -> Result<Vec<CardRecord>> {
    let commit = resolve_revision(repo, revision)?;
    let listings = older_than(repo, &commit, SET_LISTING_REFACTOR)? == Some(true);
    if listings {
        log::info!("{} predates per-card set codes", revision);
    } else if older_than(repo, &commit, SET_CLASS_REFACTOR)? == Some(true) {
        log::info!("{} predates set classes, resolving per-card classes", revision);
    }

    let mut scan = TreeScan::new(listings);
    add_revision_dir(&mut scan, repo, &commit, SETS_PATH, None)?;
    for entry in ls_tree(repo, &commit, SETS_PATH)? {
        if entry.is_tree() && entry.name != TOKENS_DIR {
            let dir = format!("{}/{}", SETS_PATH, entry.name);
            add_revision_dir(&mut scan, repo, &commit, &dir, Some(entry.name.as_str()))?;
        }
    }

    let records = scan.finish();
    log::info!("Found {} implemented cards at {}", records.len(), revision);
    Ok(records)
}

/// Cards present in `current` but not in `previous`, grouped by set code
pub fn newly_implemented(
    current: &[CardRecord],
    previous: &[CardRecord],
) -> BTreeMap<String, BTreeSet<String>> {
    let before: BTreeSet<(&str, &str)> = previous
        .iter()
        .map(|r| (r.set_code.as_str(), r.name.as_str()))
        .collect();

    let mut added: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in current {
        if !before.contains(&(record.set_code.as_str(), record.name.as_str())) {
            added
                .entry(record.set_code.clone())
                .or_default()
                .insert(record.name.clone());
        }
    }
    added
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
