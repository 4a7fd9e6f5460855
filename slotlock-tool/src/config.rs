use std::path::{Path, PathBuf};

use serde::Deserialize;
use slotlock_core::{BitOrder, LockConfig};
use tracing::warn;

use crate::error::ToolError;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub locks: LockConfig,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("slotlock").join("config.toml"))
}

/// Reads a config file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ToolError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => return Err(err.into()),
    };
    Ok(toml::from_str(&content)?)
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    load_config_from(&path).unwrap_or_else(|err| {
        warn!(path = %path.display(), %err, "ignoring unreadable config");
        Config::default()
    })
}

/// Applies command-line overrides on top of the config file.
pub fn resolve_lock_config(
    config: Config,
    cli_tag: Option<String>,
    cli_bit_order: Option<BitOrder>,
    cli_individual_locking: bool,
) -> LockConfig {
    let mut locks = config.locks;
    if let Some(tag) = cli_tag {
        locks.tag = tag;
    }
    if let Some(bit_order) = cli_bit_order {
        locks.bit_order = bit_order;
    }
    locks.individual_locking |= cli_individual_locking;
    locks
}
