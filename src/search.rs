//! Semantic search over stored artifacts.
//!
//! Loads every artifact in the registry directory into a fresh
//! [`RegistryVectorStore`], then ranks components (and actions) or whole
//! routes against the query by cosine similarity.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;

use route_registry_core::search::SearchHit;
use route_registry_core::store::RegistryVectorStore;
use route_registry_core::RegistryError;

use crate::artifact::load_all;
use crate::config::Config;
use crate::embedding::create_vectorizer;
use crate::scan::display_route;

/// Which index a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchTarget {
    /// Component and action entries.
    Components,
    /// One aggregate entry per route.
    Routes,
}

/// A store built from the registry directory, plus anything that could not
/// be loaded or indexed.
pub struct LoadedStore {
    pub store: RegistryVectorStore,
    pub skipped: Vec<(PathBuf, RegistryError)>,
}

/// Build a store from every artifact under the configured registry
/// directory.
pub fn load_store(config: &Config) -> Result<LoadedStore> {
    let vectorizer = create_vectorizer(&config.embedding)?;
    let store = RegistryVectorStore::new(vectorizer);

    let dir = config.project.registry_path();
    let loaded = load_all(&dir)
        .with_context(|| format!("Failed to read registry directory: {}", dir.display()))?;

    let mut skipped = loaded.failures;
    for (path, err) in &skipped {
        tracing::warn!(path = %path.display(), error = %err, "skipping unreadable artifact");
    }

    for registry in &loaded.registries {
        if let Err(err) = store.add_registry(registry) {
            tracing::warn!(route = display_route(&registry.route), error = %err, "failed to index route");
            skipped.push((dir.join(crate::artifact::artifact_file_name(&registry.route)), err));
        }
    }

    tracing::debug!(
        routes = store.route_count(),
        entries = store.component_count(),
        model = store.model_id(),
        "registry store loaded"
    );

    Ok(LoadedStore { store, skipped })
}

pub fn search(config: &Config, query: &str, target: SearchTarget, limit: Option<usize>) -> Result<Vec<SearchHit>> {
    let loaded = load_store(config)?;
    let limit = limit.unwrap_or(config.search.default_limit);
    let hits = match target {
        SearchTarget::Components => loaded.store.find_similar_components(query, limit)?,
        SearchTarget::Routes => loaded.store.find_similar_routes(query, limit)?,
    };
    Ok(hits)
}

pub fn run_search(config: &Config, query: &str, target: SearchTarget, limit: Option<usize>) -> Result<()> {
    let hits = search(config, query, target, limit)?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let route = display_route(hit.source.route());
        match target {
            SearchTarget::Components => println!(
                "{}. [{:.2}] {} / {}",
                i + 1,
                hit.score,
                route,
                hit.source.label()
            ),
            SearchTarget::Routes => println!("{}. [{:.2}] {}", i + 1, hit.score, route),
        }
        println!("    summary: {}", hit.summary);
        println!("    id: {}", hit.owner_id);
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan_routes;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn scanned_project() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.project.root = tmp.path().to_path_buf();
        write(
            tmp.path(),
            "src/app/auth/login/page.tsx",
            r#"
import { LoginForm } from "@/components/login-form";
export default function Login() {
  return <LoginForm title="Sign in with your wallet" aria-label="login form" />;
}
"#,
        );
        write(
            tmp.path(),
            "src/app/main/map/page.tsx",
            r#"
import { TreasureMap } from "@/components/treasure-map";
export default function MapPage() {
  return <TreasureMap zoom={12} showMarkers />;
}
"#,
        );
        scan_routes(&config, None).unwrap();
        (tmp, config)
    }

    #[test]
    fn test_search_components() {
        let (_tmp, config) = scanned_project();
        let hits = search(&config, "treasure map markers", SearchTarget::Components, Some(1)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source.label(), "TreasureMap");
        assert_eq!(hits[0].owner_id, "main/map#c0");
    }

    #[test]
    fn test_search_routes() {
        let (_tmp, config) = scanned_project();
        let hits = search(&config, "login sign in", SearchTarget::Routes, None).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].owner_id, "auth/login");
    }

    #[test]
    fn test_corrupt_artifact_is_skipped() {
        let (tmp, config) = scanned_project();
        fs::write(tmp.path().join("registry/zzz.registry.json"), "{").unwrap();
        let loaded = load_store(&config).unwrap();
        assert_eq!(loaded.store.route_count(), 2);
        assert_eq!(loaded.skipped.len(), 1);
    }

    #[test]
    fn test_missing_registry_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.project.root = tmp.path().to_path_buf();
        assert!(search(&config, "x", SearchTarget::Routes, None).is_err());
    }
}
