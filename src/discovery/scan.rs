//! Route-tree enumeration.
//!
//! # Responsibilities
//! - Walk the conventional directories (routes, api, middleware)
//! - Produce relative source paths in deterministic discovery order
//! - Skip files whose extension is not a recognized route source
//!
//! # Design Decisions
//! - Depth-first walk with entries sorted by name, so discovery order is
//!   stable across platforms and runs
//! - Paths are normalized to `/` separators regardless of platform
//! - Enumeration happens once at build time; change notification is a
//!   concern of the surrounding system

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::DiscoveryConfig;

/// Which conventional directory a file was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// `routes/`: served without a prefix.
    Route,
    /// `api/`: served under the configured API prefix.
    Api,
    /// `middleware/`: runs on every request before dispatch.
    Middleware,
}

/// One file found in the route tree. `source_path` is relative to its
/// conventional directory, `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub kind: RouteKind,
    pub source_path: String,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read route tree at `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Enumerate the route tree rooted at `root` according to the configured
/// conventions. Missing conventional directories are simply empty.
pub fn scan_tree(root: &Path, discovery: &DiscoveryConfig) -> Result<Vec<DiscoveredFile>, ScanError> {
    let sections = [
        (discovery.routes_dir.as_str(), RouteKind::Route),
        (discovery.api_dir.as_str(), RouteKind::Api),
        (discovery.middleware_dir.as_str(), RouteKind::Middleware),
    ];

    let mut discovered = Vec::new();
    for (dir_name, kind) in sections {
        let dir = root.join(dir_name);
        if !dir.is_dir() {
            continue;
        }
        let mut files = Vec::new();
        walk(&dir, String::new(), &mut files).map_err(|source| ScanError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        for source_path in files {
            if !has_known_extension(&source_path, &discovery.source_extensions) {
                tracing::debug!(file = %source_path, "skipping non-route file");
                continue;
            }
            discovered.push(DiscoveredFile { kind, source_path });
        }
    }
    Ok(discovered)
}

/// Depth-first walk with entries sorted by name. A directory's contents
/// are visited in place of the directory, before later siblings.
fn walk(dir: &Path, rel: String, out: &mut Vec<String>) -> io::Result<()> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_rel = if rel.is_empty() {
            name
        } else {
            format!("{rel}/{}", name)
        };
        if entry.file_type()?.is_dir() {
            walk(&entry.path(), child_rel, out)?;
        } else {
            out.push(child_rel);
        }
    }
    Ok(())
}

fn has_known_extension(path: &str, extensions: &[String]) -> bool {
    match path.rfind('.') {
        Some(pos) => {
            let ext = &path[pos + 1..];
            extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
        }
        None => false,
    }
}
