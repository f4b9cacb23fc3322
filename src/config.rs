use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Project root; `app_dir`, `registry_dir` and alias targets are
    /// resolved against it.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_app_dir")]
    pub app_dir: PathBuf,
    #[serde(default = "default_registry_dir")]
    pub registry_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            app_dir: default_app_dir(),
            registry_dir: default_registry_dir(),
        }
    }
}

impl ProjectConfig {
    pub fn app_path(&self) -> PathBuf {
        self.root.join(&self.app_dir)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry_dir)
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_app_dir() -> PathBuf {
    PathBuf::from("src/app")
}
fn default_registry_dir() -> PathBuf {
    PathBuf::from("registry")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScannerConfig {
    /// Entry file names, in priority order. A directory containing one of
    /// these is a route.
    #[serde(default = "default_entry_files")]
    pub entry_files: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    /// Import prefix → directory (relative to the project root), e.g.
    /// `"@/" = "src/"`.
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            entry_files: default_entry_files(),
            exclude_globs: Vec::new(),
            aliases: default_aliases(),
        }
    }
}

fn default_entry_files() -> Vec<String> {
    ["page.tsx", "page.jsx", "page.ts", "page.js", "route.ts", "route.js"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("@/".to_string(), "src/".to_string())])
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_dims")]
    pub dims: usize,
    /// Hash character trigrams in addition to words (hashing provider).
    #[serde(default = "default_ngrams")]
    pub ngrams: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: default_dims(),
            ngrams: default_ngrams(),
            endpoint: default_endpoint(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "hashing".to_string()
}
fn default_dims() -> usize {
    route_registry_core::embedding::DEFAULT_DIMS
}
fn default_ngrams() -> bool {
    true
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    5
}

impl Config {
    /// Defaults for every section, rooted at the current directory.
    pub fn minimal() -> Self {
        Self {
            project: ProjectConfig::default(),
            scanner: ScannerConfig::default(),
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scanner.entry_files.is_empty() {
            anyhow::bail!("scanner.entry_files must not be empty");
        }

        if self.embedding.dims == 0 {
            anyhow::bail!("embedding.dims must be > 0");
        }

        match self.embedding.provider.as_str() {
            "hashing" => {}
            "openai" => {
                if self.embedding.model.is_none() {
                    anyhow::bail!("embedding.model must be specified when provider is 'openai'");
                }
            }
            other => anyhow::bail!(
                "Unknown embedding provider: '{}'. Must be hashing or openai.",
                other
            ),
        }

        if self.search.default_limit == 0 {
            anyhow::bail!("search.default_limit must be >= 1");
        }

        Ok(())
    }
}

/// Read and validate a TOML config file.
///
/// A relative `project.root` is resolved against the directory holding
/// the config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;
    if config.project.root.is_relative() {
        if let Some(dir) = path.parent() {
            config.project.root = dir.join(&config.project.root);
        }
    }
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.project.app_dir, PathBuf::from("src/app"));
        assert_eq!(cfg.scanner.entry_files[0], "page.tsx");
        assert_eq!(cfg.scanner.aliases.get("@/").unwrap(), "src/");
        assert_eq!(cfg.embedding.provider, "hashing");
        assert_eq!(cfg.search.default_limit, 5);
    }

    #[test]
    fn test_zero_dims_rejected() {
        let err = parse_config("[embedding]\ndims = 0\n").unwrap_err();
        assert!(err.to_string().contains("dims"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = parse_config("[embedding]\nprovider = \"magic\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_openai_requires_model() {
        assert!(parse_config("[embedding]\nprovider = \"openai\"\n").is_err());
        let cfg = parse_config(
            "[embedding]\nprovider = \"openai\"\nmodel = \"text-embedding-3-small\"\ndims = 1536\n",
        )
        .unwrap();
        assert_eq!(cfg.embedding.dims, 1536);
    }

    #[test]
    fn test_relative_root_resolved_against_config_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("registry.toml");
        std::fs::write(&path, "[project]\nroot = \"web\"\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.project.root, tmp.path().join("web"));
        assert_eq!(cfg.project.app_path(), tmp.path().join("web/src/app"));
    }
}
