//! Static route scanner.
//!
//! [`RegistryScanner::scan_route`] resolves a route id to its entry file,
//! parses it with tree-sitter, and extracts:
//!
//! - **components**: JSX elements and `createElement` calls whose tag is
//!   an imported binding, with props inferred from literal or typed
//!   values at the call site (see [`components`]);
//! - **actions**: exported functions, local `handle*` handlers, and
//!   imported GraphQL operations (see [`actions`]).
//!
//! References that cannot be resolved statically are skipped and logged
//! at `debug` level. Only a missing entry file or a syntax error fails the
//! scan.

pub mod actions;
pub mod components;
pub mod imports;
pub mod summary;
pub mod syntax;

use chrono::Utc;
use std::path::{Component, Path, PathBuf};

use route_registry_core::models::{RouteRegistry, REGISTRY_VERSION};
use route_registry_core::{RegistryError, Result};

use crate::artifact::write_artifact;
use crate::config::Config;
use crate::discovery::entry_file_for_route;

use actions::{extract_actions, ActionContext};
use components::extract_components;
use imports::{collect_imports, ModuleResolver};
use syntax::parse_source;

/// Scans routes of one app directory. Holds no per-scan state, so a
/// single scanner can be shared across threads.
#[derive(Debug, Clone)]
pub struct RegistryScanner {
    app_root: PathBuf,
    registry_dir: PathBuf,
    entry_files: Vec<String>,
    resolver: ModuleResolver,
}

impl RegistryScanner {
    pub fn new(config: &Config) -> Self {
        Self {
            app_root: config.project.app_path(),
            registry_dir: config.project.registry_path(),
            entry_files: config.scanner.entry_files.clone(),
            resolver: ModuleResolver::new(&config.project.root, &config.scanner.aliases),
        }
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    pub fn registry_dir(&self) -> &Path {
        &self.registry_dir
    }

    /// Extract the registry for `route`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if the route has no entry file.
    /// - [`RegistryError::Io`] if the entry file cannot be read.
    /// - [`RegistryError::Parse`] if it has syntax errors or is not UTF-8.
    pub fn scan_route(&self, route: &str) -> Result<RouteRegistry> {
        let route = route.trim_matches('/');
        let path = entry_file_for_route(&self.app_root, route, &self.entry_files).ok_or_else(|| {
            RegistryError::NotFound {
                what: "entry file",
                key: if route.is_empty() { "/".to_string() } else { route.to_string() },
            }
        })?;

        let code = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => RegistryError::parse(&path, "entry file is not valid UTF-8"),
            _ => RegistryError::io(&path, e),
        })?;
        let tree = parse_source(&path, &code)?;
        let root = tree.root_node();
        let file = relative_file(&self.app_root, &path);

        let imports = collect_imports(&code, root);
        let components = extract_components(&code, root, &imports, &file);

        let entry_dir = path.parent().unwrap_or(self.app_root.as_path());
        let ctx = ActionContext {
            code: &code,
            file: &file,
            entry_dir,
            imports: &imports,
            resolver: &self.resolver,
        };
        let actions = extract_actions(&ctx, root);

        tracing::debug!(
            route,
            components = components.len(),
            actions = actions.len(),
            "scanned route"
        );

        Ok(RouteRegistry {
            route: route.to_string(),
            entry_file: file,
            components,
            actions,
            scanned_at: Utc::now(),
            version: REGISTRY_VERSION,
        })
    }

    /// Scan `route` and write its artifact into the registry directory.
    /// Returns the registry and the artifact path.
    pub fn scan_and_persist(&self, route: &str) -> Result<(RouteRegistry, PathBuf)> {
        let registry = self.scan_route(route)?;
        let path = write_artifact(&self.registry_dir, &registry)?;
        Ok((registry, path))
    }
}

/// `path` relative to `root`, `/`-separated.
fn relative_file(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
