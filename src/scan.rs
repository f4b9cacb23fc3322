//! Scan orchestration: discovery → parallel scan → artifact write.
//!
//! Routes are scanned on the rayon pool. Each scan is independent, and
//! results are collected back in discovery order, so output and artifact
//! content do not depend on completion order.
//!
//! A failing route is logged and reported; it never stops the others.
//! Only top-level problems (unreadable app directory, unwritable registry
//! directory, bad exclude globs) fail the command.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::PathBuf;

use route_registry_core::RegistryError;

use crate::config::Config;
use crate::discovery::discover_routes;
use crate::scanner::RegistryScanner;

/// Result of scanning one route.
#[derive(Debug)]
pub struct RouteOutcome {
    pub route: String,
    pub result: std::result::Result<ScannedRoute, RegistryError>,
}

#[derive(Debug, Clone)]
pub struct ScannedRoute {
    pub components: usize,
    pub actions: usize,
    pub artifact: PathBuf,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// One outcome per route, in discovery order.
    pub outcomes: Vec<RouteOutcome>,
    /// Errors hit while walking the app directory.
    pub walk_errors: Vec<RegistryError>,
}

impl ScanReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ScannedRoute> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Route ids as shown to users; the root route is `/`.
pub fn display_route(route: &str) -> &str {
    if route.is_empty() {
        "/"
    } else {
        route
    }
}

/// Discover every route under the configured app directory.
pub fn list_routes(config: &Config) -> Result<(Vec<String>, Vec<RegistryError>)> {
    let app = config.project.app_path();
    let discovery = discover_routes(&app, &config.scanner)
        .with_context(|| format!("Failed to read app directory: {}", app.display()))?;

    let mut routes = Vec::new();
    let mut errors = Vec::new();
    for item in &discovery {
        match item {
            Ok(route) => routes.push(route),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory");
                errors.push(err);
            }
        }
    }
    Ok((routes, errors))
}

/// Scan all discovered routes, or only `only`, and persist artifacts.
pub fn scan_routes(config: &Config, only: Option<&str>) -> Result<ScanReport> {
    let (routes, walk_errors) = match only {
        Some(route) => (vec![route.trim_matches('/').to_string()], Vec::new()),
        None => list_routes(config)?,
    };

    let registry_dir = config.project.registry_path();
    std::fs::create_dir_all(&registry_dir).with_context(|| {
        format!("Failed to create registry directory: {}", registry_dir.display())
    })?;

    let scanner = RegistryScanner::new(config);
    let outcomes: Vec<RouteOutcome> = routes
        .par_iter()
        .map(|route| {
            let result = scanner
                .scan_and_persist(route)
                .map(|(registry, artifact)| ScannedRoute {
                    components: registry.components.len(),
                    actions: registry.actions.len(),
                    artifact,
                });
            if let Err(err) = &result {
                tracing::warn!(route = display_route(route), error = %err, "route scan failed");
            }
            RouteOutcome {
                route: route.clone(),
                result,
            }
        })
        .collect();

    Ok(ScanReport {
        outcomes,
        walk_errors,
    })
}

pub fn run_routes(config: &Config) -> Result<()> {
    let (routes, _) = list_routes(config)?;
    if routes.is_empty() {
        println!("No routes found.");
        return Ok(());
    }
    for route in &routes {
        println!("{}", display_route(route));
    }
    Ok(())
}

pub fn run_scan(config: &Config, only: Option<&str>) -> Result<()> {
    let report = scan_routes(config, only)?;

    if let (Some(route), Some(outcome)) = (only, report.outcomes.first()) {
        if let Err(err) = &outcome.result {
            anyhow::bail!("Failed to scan route '{}': {}", display_route(route), err);
        }
    }

    println!("scan {}", config.project.app_path().display());
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(scanned) => println!(
                "  ✓ {}: {} components, {} actions → {}",
                display_route(&outcome.route),
                scanned.components,
                scanned.actions,
                scanned.artifact.display()
            ),
            Err(err) => println!("  ✗ {}: {}", display_route(&outcome.route), err),
        }
    }

    let components: usize = report.succeeded().map(|s| s.components).sum();
    let actions: usize = report.succeeded().map(|s| s.actions).sum();
    println!("  routes scanned: {}", report.outcomes.len() - report.failed());
    if report.failed() > 0 {
        println!("  routes failed: {}", report.failed());
    }
    if !report.walk_errors.is_empty() {
        println!("  unreadable directories: {}", report.walk_errors.len());
    }
    println!("  components: {}", components);
    println!("  actions: {}", actions);
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn project() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.project.root = tmp.path().to_path_buf();
        let root = tmp.path();
        write(
            root,
            "src/app/page.tsx",
            "import { Hero } from './hero';\nexport default function Home() { return <Hero />; }\n",
        );
        write(
            root,
            "src/app/broken/page.tsx",
            "export default function Broken() { return <div>; }\n",
        );
        write(
            root,
            "src/app/api/chat/route.ts",
            "export async function POST(req: Request) { return new Response(''); }\n",
        );
        (tmp, config)
    }

    #[test]
    fn test_scan_reports_in_discovery_order_and_skips_failures() {
        let (tmp, config) = project();
        let report = scan_routes(&config, None).unwrap();

        let routes: Vec<&str> = report.outcomes.iter().map(|o| o.route.as_str()).collect();
        assert_eq!(routes, vec!["", "api/chat", "broken"]);
        assert_eq!(report.failed(), 1);
        assert!(report.outcomes[2].result.is_err());

        let registry = tmp.path().join("registry");
        assert!(registry.join("_root.registry.json").is_file());
        assert!(registry.join("api_chat.registry.json").is_file());
        assert!(!registry.join("broken.registry.json").exists());
    }

    #[test]
    fn test_scan_single_route() {
        let (_tmp, config) = project();
        let report = scan_routes(&config, Some("/api/chat/")).unwrap();
        assert_eq!(report.outcomes.len(), 1);
        let scanned = report.outcomes[0].result.as_ref().unwrap();
        assert_eq!(scanned.actions, 1);
        assert_eq!(scanned.components, 0);
    }

    #[test]
    fn test_missing_app_dir_is_top_level_error() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.project.root = tmp.path().to_path_buf();
        let err = scan_routes(&config, None).unwrap_err();
        assert!(err.to_string().contains("Failed to read app directory"));
    }

    #[test]
    fn test_root_and_index_routes_both_persist() {
        let (tmp, config) = project();
        write(
            tmp.path(),
            "src/app/index/page.tsx",
            "import { Banner } from './banner';\nexport default function Index() { return <Banner />; }\n",
        );

        let report = scan_routes(&config, None).unwrap();
        let routes: Vec<&str> = report.outcomes.iter().map(|o| o.route.as_str()).collect();
        assert_eq!(routes, vec!["", "api/chat", "broken", "index"]);

        let loaded = crate::artifact::load_all(&tmp.path().join("registry")).unwrap();
        let mut stored: Vec<&str> = loaded.registries.iter().map(|r| r.route.as_str()).collect();
        stored.sort();
        assert_eq!(stored, vec!["", "api/chat", "index"]);
    }

    #[test]
    fn test_display_route() {
        assert_eq!(display_route(""), "/");
        assert_eq!(display_route("a/b"), "a/b");
    }
}
