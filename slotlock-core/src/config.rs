use serde::{Deserialize, Serialize};

use crate::codec::{BitOrder, DEFAULT_TAG};

/// Settings for the lock subsystem.
///
/// Every field has a default, so a partial (or empty) config file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Namespacing token that marks the lock record in the host's record list.
    pub tag: String,
    /// Bit packing of the persisted payload.
    pub bit_order: BitOrder,
    /// Allow a plain slot press to toggle its lock without the modifier key.
    pub individual_locking: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            bit_order: BitOrder::default(),
            individual_locking: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("record tag must not be empty")]
    EmptyTag,
    #[error("record tag {0:?} must not contain a comma")]
    TagComma(String),
}
