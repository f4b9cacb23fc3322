//! JSON artifact persistence: one `<route>.registry.json` file per route.
//!
//! Writes go to a temp file in the target directory and are renamed into
//! place, so readers see either the old artifact or the new one.

use std::io::Write;
use std::path::{Path, PathBuf};

use route_registry_core::models::RouteRegistry;
use route_registry_core::{RegistryError, Result};

pub const ARTIFACT_SUFFIX: &str = ".registry.json";

pub const ROOT_ARTIFACT_STEM: &str = "_root";

/// File name for a route's artifact. Runs of `/` or `\` become a single
/// `_`; the root route is [`ROOT_ARTIFACT_STEM`].
///
/// A non-root name that starts with `_` gets one more `_` in front, so no
/// route can land on the root's file.
pub fn artifact_file_name(route: &str) -> String {
    let trimmed = route.trim_matches(|c| c == '/' || c == '\\');
    if trimmed.is_empty() {
        return format!("{ROOT_ARTIFACT_STEM}{ARTIFACT_SUFFIX}");
    }

    let mut name = String::with_capacity(trimmed.len() + ARTIFACT_SUFFIX.len() + 1);
    if trimmed.starts_with('_') {
        name.push('_');
    }
    let mut in_separator = false;
    for c in trimmed.chars() {
        if c == '/' || c == '\\' {
            if !in_separator {
                name.push('_');
            }
            in_separator = true;
        } else {
            name.push(c);
            in_separator = false;
        }
    }
    name.push_str(ARTIFACT_SUFFIX);
    name
}

/// Atomically write `registry` into `dir`, creating it if needed.
pub fn write_artifact(dir: &Path, registry: &RouteRegistry) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| RegistryError::io(dir, e))?;
    let path = dir.join(artifact_file_name(&registry.route));

    let json = serde_json::to_string_pretty(registry)
        .map_err(|e| RegistryError::parse(&path, e.to_string()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| RegistryError::io(dir, e))?;
    writeln!(tmp, "{json}").map_err(|e| RegistryError::io(tmp.path(), e))?;
    tmp.persist(&path)
        .map_err(|e| RegistryError::io(&path, e.error))?;

    Ok(path)
}

/// Load the artifact for `route` from `dir`.
///
/// # Errors
///
/// [`RegistryError::NotFound`] if no artifact exists for the route, and
/// [`RegistryError::Parse`] if the file is not valid registry JSON.
pub fn load_artifact(dir: &Path, route: &str) -> Result<RouteRegistry> {
    let path = dir.join(artifact_file_name(route));
    if !path.is_file() {
        return Err(RegistryError::NotFound {
            what: "artifact",
            key: route.to_string(),
        });
    }
    read_artifact(&path)
}

pub fn read_artifact(path: &Path) -> Result<RouteRegistry> {
    let raw = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| RegistryError::parse(path, e.to_string()))
}

/// Every artifact in `dir`, in file-name order.
#[derive(Debug, Default)]
pub struct LoadedArtifacts {
    pub registries: Vec<RouteRegistry>,
    pub failures: Vec<(PathBuf, RegistryError)>,
}

/// Load every `*.registry.json` in `dir`. Unreadable or corrupt files are
/// returned in `failures` and do not stop the load.
pub fn load_all(dir: &Path) -> Result<LoadedArtifacts> {
    let entries = std::fs::read_dir(dir).map_err(|e| RegistryError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RegistryError::io(dir, e))?;
        let path = entry.path();
        let is_artifact = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(ARTIFACT_SUFFIX));
        if is_artifact && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut loaded = LoadedArtifacts::default();
    for path in paths {
        match read_artifact(&path) {
            Ok(registry) => loaded.registries.push(registry),
            Err(err) => loaded.failures.push((path, err)),
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use route_registry_core::models::REGISTRY_VERSION;
    use tempfile::TempDir;

    fn registry(route: &str) -> RouteRegistry {
        RouteRegistry {
            route: route.to_string(),
            entry_file: format!("{route}/page.tsx"),
            components: Vec::new(),
            actions: Vec::new(),
            scanned_at: Utc::now(),
            version: REGISTRY_VERSION,
        }
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name("main/match"), "main_match.registry.json");
        assert_eq!(artifact_file_name("a//b\\c"), "a_b_c.registry.json");
        assert_eq!(artifact_file_name("/auth/login/"), "auth_login.registry.json");
        assert_eq!(artifact_file_name(""), "_root.registry.json");
        assert_eq!(artifact_file_name("index"), "index.registry.json");
        assert_eq!(artifact_file_name("_root"), "__root.registry.json");
        assert_eq!(artifact_file_name("_private/x"), "__private_x.registry.json");
        assert_eq!(artifact_file_name("main/match/[id]"), "main_match_[id].registry.json");
    }

    #[test]
    fn test_write_then_load() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("registry");
        let original = registry("a/b");
        let path = write_artifact(&dir, &original).unwrap();
        assert!(path.ends_with("a_b.registry.json"));

        let loaded = load_artifact(&dir, "a/b").unwrap();
        assert!(loaded.same_content(&original));
        assert_eq!(
            loaded.scanned_at.timestamp_millis(),
            original.scanned_at.timestamp_millis()
        );

        // Only the artifact remains; the temp file was renamed away.
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn test_root_and_index_routes_keep_separate_artifacts() {
        let tmp = TempDir::new().unwrap();
        for route in ["", "index", "_root"] {
            write_artifact(tmp.path(), &registry(route)).unwrap();
        }

        let loaded = load_all(tmp.path()).unwrap();
        assert!(loaded.failures.is_empty());
        let mut routes: Vec<&str> = loaded.registries.iter().map(|r| r.route.as_str()).collect();
        routes.sort();
        assert_eq!(routes, vec!["", "_root", "index"]);
        assert_eq!(load_artifact(tmp.path(), "").unwrap().route, "");
        assert_eq!(load_artifact(tmp.path(), "index").unwrap().route, "index");
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = load_artifact(tmp.path(), "nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_corrupt_artifact_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("bad.registry.json"), "{ not json").unwrap();
        let err = load_artifact(tmp.path(), "bad").unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }));
    }

    #[test]
    fn test_load_all_collects_failures() {
        let tmp = TempDir::new().unwrap();
        write_artifact(tmp.path(), &registry("b")).unwrap();
        write_artifact(tmp.path(), &registry("a")).unwrap();
        std::fs::write(tmp.path().join("c.registry.json"), "[]").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_all(tmp.path()).unwrap();
        let routes: Vec<&str> = loaded.registries.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(routes, vec!["a", "b"]);
        assert_eq!(loaded.failures.len(), 1);
        assert!(loaded.failures[0].0.ends_with("c.registry.json"));
    }
}
