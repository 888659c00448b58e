//! Project configuration and storage tier wiring.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tasklist_store::{FileStore, LatentStore, PersistenceLayer, Tier, TierKind};

const CONFIG_DIR: &str = ".tasklist";
const CONFIG_FILE: &str = "config.toml";

/// Top-level project configuration loaded from `.tasklist/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Storage tiers.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ProjectConfig {
    /// Load configuration from a known working directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed, or validated.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let config_path = workdir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.storage.tier_order()?;
        if self.storage.remote.latency_ms > MAX_LATENCY_MS {
            bail!(
                "remote latency_ms must be at most {MAX_LATENCY_MS}, got {}",
                self.storage.remote.latency_ms
            );
        }
        Ok(())
    }
}

const MAX_LATENCY_MS: u64 = 60_000;

/// Storage tiers and their read priority.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_tier_order")]
    tier_order: Vec<String>,
    /// Local tier settings.
    #[serde(default)]
    pub local: LocalTierConfig,
    /// Remote tier settings.
    #[serde(default)]
    pub remote: RemoteTierConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tier_order: Self::default_tier_order(),
            local: LocalTierConfig::default(),
            remote: RemoteTierConfig::default(),
        }
    }
}

impl StorageConfig {
    fn default_tier_order() -> Vec<String> {
        vec!["remote".into(), "local".into()]
    }

    /// Override the read priority order.
    #[must_use]
    pub fn with_tier_order(mut self, order: &[&str]) -> Self {
        self.tier_order = order.iter().map(|&name| name.to_owned()).collect();
        self
    }

    /// Parsed read priority order; every tier must appear exactly once.
    ///
    /// # Errors
    /// Returns an error for unknown, duplicate, or missing tiers.
    pub fn tier_order(&self) -> Result<Vec<TierKind>> {
        let mut seen = HashSet::new();
        let mut order = Vec::with_capacity(self.tier_order.len());
        for name in &self.tier_order {
            let kind: TierKind = name.parse()?;
            if !seen.insert(kind) {
                bail!("duplicate tier in tier_order: {kind}");
            }
            order.push(kind);
        }
        for kind in [TierKind::Local, TierKind::Remote] {
            if !seen.contains(&kind) {
                bail!("tier_order must list the {kind} tier");
            }
        }
        Ok(order)
    }

    /// Build the persistence layer, resolving relative directories against `workdir`.
    ///
    /// # Errors
    /// Returns an error when the tier order is invalid.
    pub fn persistence(&self, workdir: &Path) -> Result<PersistenceLayer> {
        let tiers = self
            .tier_order()?
            .into_iter()
            .map(|kind| self.build_tier(kind, workdir))
            .collect();
        Ok(PersistenceLayer::new(tiers))
    }

    fn build_tier(&self, kind: TierKind, workdir: &Path) -> Tier {
        match kind {
            TierKind::Local if self.local.enabled => Tier::new(
                kind,
                Arc::new(FileStore::new(resolve(workdir, &self.local.dir))),
            ),
            TierKind::Remote if self.remote.enabled => Tier::new(
                kind,
                Arc::new(LatentStore::new(
                    FileStore::new(resolve(workdir, &self.remote.dir)),
                    Duration::from_millis(self.remote.latency_ms),
                )),
            ),
            _ => Tier::unavailable(kind, format!("{kind} tier disabled in configuration")),
        }
    }
}

fn resolve(workdir: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        workdir.join(dir)
    }
}

/// Local tier settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalTierConfig {
    /// Whether the tier is used at all.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Directory holding the local snapshot files.
    #[serde(default = "LocalTierConfig::default_dir")]
    pub dir: PathBuf,
}

impl Default for LocalTierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: Self::default_dir(),
        }
    }
}

impl LocalTierConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from(CONFIG_DIR).join("data")
    }
}

/// Simulated remote tier settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTierConfig {
    /// Whether the tier is used at all.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Directory standing in for the remote service.
    #[serde(default = "RemoteTierConfig::default_dir")]
    pub dir: PathBuf,
    /// Simulated round-trip delay per call.
    #[serde(default = "RemoteTierConfig::default_latency_ms")]
    pub latency_ms: u64,
}

impl Default for RemoteTierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: Self::default_dir(),
            latency_ms: Self::default_latency_ms(),
        }
    }
}

impl RemoteTierConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from(CONFIG_DIR).join("remote")
    }

    const fn default_latency_ms() -> u64 {
        300
    }
}

const fn enabled_by_default() -> bool {
    true
}
