//! Route discovery over an app directory.
//!
//! A route is any directory under the app root that contains one of the
//! configured entry files (`page.tsx`, `route.ts`, ...). The route id is
//! the directory path relative to the app root, `/`-separated, with the
//! entry file name stripped; the app root itself is the empty route `""`.
//!
//! [`RouteDiscovery`] is a lazy, restartable sequence: every call to
//! [`iter`](RouteDiscovery::iter) starts a fresh depth-first walk, and
//! nothing is read until the iterator is advanced.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use route_registry_core::{RegistryError, Result};

use crate::config::ScannerConfig;

#[derive(Debug, Clone)]
pub struct RouteDiscovery {
    root: PathBuf,
    entry_files: Vec<String>,
    excludes: GlobSet,
}

/// Prepare route discovery under `root`.
///
/// # Errors
///
/// [`RegistryError::Io`] if `root` is absent or cannot be listed, and a
/// parse error for an invalid exclude glob.
pub fn discover_routes(root: &Path, scanner: &ScannerConfig) -> Result<RouteDiscovery> {
    std::fs::read_dir(root).map_err(|e| RegistryError::io(root, e))?;

    Ok(RouteDiscovery {
        root: root.to_path_buf(),
        entry_files: scanner.entry_files.clone(),
        excludes: build_globset(&scanner.exclude_globs)?,
    })
}

impl RouteDiscovery {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a new depth-first walk. Children are visited in file-name
    /// order, so the sequence is stable for an unchanged tree.
    pub fn iter(&self) -> Routes<'_> {
        let root = self.root.clone();
        let excludes = &self.excludes;
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| keep_dir(e, &root, excludes));
        Routes {
            discovery: self,
            walker: Box::new(walker),
        }
    }
}

impl<'a> IntoIterator for &'a RouteDiscovery {
    type Item = Result<String>;
    type IntoIter = Routes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over route ids. Walk errors are yielded as `Err` items and
/// the walk continues past them.
pub struct Routes<'a> {
    discovery: &'a RouteDiscovery,
    walker: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + 'a>,
}

impl Iterator for Routes<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.discovery.root.clone());
                    return Some(Err(RegistryError::io(path, err.into())));
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            if find_entry_file(entry.path(), &self.discovery.entry_files).is_some() {
                return Some(Ok(route_id(&self.discovery.root, entry.path())));
            }
        }
    }
}

/// First configured entry file present in `dir`.
pub fn find_entry_file(dir: &Path, entry_files: &[String]) -> Option<PathBuf> {
    entry_files
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Resolve a route id to its entry file under `app_root`.
///
/// Segments that are not plain directory names (`..`, `.`, absolute or
/// prefixed paths) resolve to nothing, so a route never leaves `app_root`.
pub fn entry_file_for_route(app_root: &Path, route: &str, entry_files: &[String]) -> Option<PathBuf> {
    let mut dir = app_root.to_path_buf();
    for seg in route.split('/').filter(|s| !s.is_empty()) {
        let mut parts = Path::new(seg).components();
        match (parts.next(), parts.next()) {
            (Some(Component::Normal(part)), None) => dir.push(part),
            _ => return None,
        }
    }
    find_entry_file(&dir, entry_files)
}

fn route_id(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn keep_dir(entry: &DirEntry, root: &Path, excludes: &GlobSet) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || name == "node_modules" {
        return false;
    }
    !excludes.is_match(route_id(root, entry.path()))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| RegistryError::parse("scanner.exclude_globs", e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| RegistryError::parse("scanner.exclude_globs", e.to_string()))
}
