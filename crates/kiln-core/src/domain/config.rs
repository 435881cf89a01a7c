//! Resolved configuration.
//!
//! Loading and validation happen elsewhere; by the time a value of
//! `ResolvedConfig` reaches the runtime it is complete and never mutated.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_NETWORK: &str = "develop";
pub const DEFAULT_SOLC_VERSION: &str = "0.5.15";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub default_network: String,
    pub networks: HashMap<String, NetworkConfig>,
    #[serde(default)]
    pub solc: SolcConfig,
    #[serde(default)]
    pub paths: ProjectPaths,
}

impl ResolvedConfig {
    pub fn network(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.get(name)
    }

    /// Toolchain version handed to the provider factory.
    pub fn toolchain_version(&self) -> &str {
        &self.solc.version
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let mut networks = HashMap::new();
        networks.insert(DEFAULT_NETWORK.to_string(), NetworkConfig::localhost());
        Self {
            default_network: DEFAULT_NETWORK.to_string(),
            networks,
            solc: SolcConfig::default(),
            paths: ProjectPaths::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// JSON-RPC endpoint. `None` means an in-process network.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl NetworkConfig {
    pub fn localhost() -> Self {
        Self {
            url: Some("http://127.0.0.1:8545".to_string()),
            chain_id: Some(31337),
            accounts: Vec::new(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolcConfig {
    pub version: String,
}

impl Default for SolcConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_SOLC_VERSION.to_string(),
        }
    }
}

/// Project layout. When read from config, missing entries are derived from
/// `root` and relative entries are taken relative to it (entries already
/// under `root` are kept as written).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProjectPaths")]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub sources: PathBuf,
    pub cache: PathBuf,
    pub artifacts: PathBuf,
}

impl ProjectPaths {
    /// Standard layout under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            sources: root.join("contracts"),
            cache: root.join("cache"),
            artifacts: root.join("artifacts"),
            root,
        }
    }
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::under(".")
    }
}

#[derive(Deserialize)]
struct RawProjectPaths {
    #[serde(default)]
    root: Option<PathBuf>,
    #[serde(default)]
    sources: Option<PathBuf>,
    #[serde(default)]
    cache: Option<PathBuf>,
    #[serde(default)]
    artifacts: Option<PathBuf>,
}

impl From<RawProjectPaths> for ProjectPaths {
    fn from(raw: RawProjectPaths) -> Self {
        let layout = ProjectPaths::under(raw.root.unwrap_or_else(|| PathBuf::from(".")));
        let resolve = |given: Option<PathBuf>, derived: PathBuf| match given {
            Some(path) if path.starts_with(&layout.root) => path,
            Some(path) => layout.root.join(path),
            None => derived,
        };

        Self {
            sources: resolve(raw.sources, layout.sources.clone()),
            cache: resolve(raw.cache, layout.cache.clone()),
            artifacts: resolve(raw.artifacts, layout.artifacts.clone()),
            root: layout.root.clone(),
        }
    }
}
