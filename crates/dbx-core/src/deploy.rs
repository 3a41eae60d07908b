//! Mirror a local bundle tree into the workspace namespace.

use std::collections::HashSet;
use std::path::{Component, Path};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::api::ApiClient;
use crate::error::Result;

/// Directory names never descended into.
pub const IGNORED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    "dist",
    "build",
    ".pytest_cache",
    ".venv",
];

/// File name suffixes never uploaded.
pub const IGNORED_SUFFIXES: &[&str] = &[".pyc", ".pyo", ".pyd", ".so", ".dylib", ".DS_Store"];

/// Whether a bundle-relative path must stay local.
pub fn is_ignored(relative: &Path) -> bool {
    let in_ignored_dir = relative.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| IGNORED_DIRS.contains(&n)),
        _ => false,
    });
    if in_ignored_dir {
        return true;
    }
    relative
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| IGNORED_SUFFIXES.iter().any(|s| n.ends_with(s)))
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|n| IGNORED_DIRS.contains(&n))
}

/// Join a bundle-relative path onto a workspace path with `/` separators.
pub fn remote_path(workspace_root: &str, relative: &Path) -> String {
    let mut out = workspace_root.trim_end_matches('/').to_string();
    for c in relative.components() {
        if let Component::Normal(part) = c {
            out.push('/');
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

fn remote_parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub workspace_path: String,
    pub files_uploaded: usize,
    pub directories_created: usize,
}

pub struct TreeDeployer<'a> {
    client: &'a ApiClient,
}

impl<'a> TreeDeployer<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Upload every non-ignored file under `local_root` to the same relative
    /// location under `workspace_root`, overwriting. The first failure aborts;
    /// files already uploaded stay uploaded.
    pub fn deploy(&self, local_root: &Path, workspace_root: &str) -> Result<TreeSummary> {
        let workspace = self.client.workspace();
        let mut created: HashSet<String> = HashSet::new();
        let mut summary = TreeSummary {
            workspace_path: workspace_root.to_string(),
            ..Default::default()
        };

        let walker = WalkDir::new(local_root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e));

        for entry in walker {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop in bundle tree"))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(local_root)
                .unwrap_or(entry.path());
            if is_ignored(relative) {
                tracing::debug!(path = %relative.display(), "skipping ignored file");
                continue;
            }

            let target = remote_path(workspace_root, relative);
            let parent = remote_parent(&target).to_string();
            if !created.contains(&parent) {
                tracing::info!(dir = %parent, "creating workspace directory");
                workspace.mkdirs(&parent)?;
                created.insert(parent);
                summary.directories_created += 1;
            }

            tracing::info!(path = %relative.display(), target = %target, "uploading");
            let content = std::fs::read(entry.path())?;
            workspace.upload(&target, &content)?;
            summary.files_uploaded += 1;
        }

        tracing::info!(
            workspace_path = workspace_root,
            files = summary.files_uploaded,
            "bundle tree deployed"
        );
        Ok(summary)
    }
}
