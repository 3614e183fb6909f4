use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Two instruments whose close ratio is monitored.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InstrumentPair {
    pub name: String,
    pub symbol_a: String,
    pub symbol_b: String,
    pub label_a: Option<String>,
    pub label_b: Option<String>,
}

impl InstrumentPair {
    /// Cache key for the pair.
    pub fn key(&self) -> String {
        format!("{}/{}", self.symbol_a, self.symbol_b)
    }

    pub fn label_a(&self) -> &str {
        self.label_a.as_deref().unwrap_or(&self.symbol_a)
    }

    pub fn label_b(&self) -> &str {
        self.label_b.as_deref().unwrap_or(&self.symbol_b)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Sina,
    Yahoo,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SinaProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub sina: Option<SinaProviderConfig>,
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            sina: Some(SinaProviderConfig {
                base_url: "https://stock2.finance.sina.com.cn".to_string(),
            }),
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_ratio_precision() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub pairs: Vec<InstrumentPair>,
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_ratio_precision")]
    pub ratio_precision: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "ratiowatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            bail!("At least one instrument pair must be configured");
        }
        for pair in &self.pairs {
            if pair.symbol_a.trim().is_empty() || pair.symbol_b.trim().is_empty() {
                bail!("Pair '{}' has an empty symbol", pair.name);
            }
            if pair.symbol_a == pair.symbol_b {
                bail!("Pair '{}' uses {} on both legs", pair.name, pair.symbol_a);
            }
        }
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be positive");
        }
        Ok(())
    }

    pub fn sina_base_url(&self) -> &str {
        self.providers
            .sina
            .as_ref()
            .map_or("https://stock2.finance.sina.com.cn", |p| &p.base_url)
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url)
    }
}
