use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::info;

const DEFAULT_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the copper / aluminium example config to the default location.
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(&path)
}

/// Writes the example config to `path`. An existing file is never replaced.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("Configuration file already exists at {}", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    };
    file.write_all(DEFAULT_CONFIG.as_bytes())
        .with_context(|| format!("Failed to write example config to {}", path.display()))?;

    info!(path = %path.display(), "Wrote example configuration");
    println!(
        "Wrote {}. Edit its pairs and provider, then run `ratiowatch show`.",
        path.display()
    );
    Ok(())
}
