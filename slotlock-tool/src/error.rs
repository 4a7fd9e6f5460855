use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid lock settings: {0}")]
    LockConfig(#[from] slotlock_core::ConfigError),

    #[error("Lock error: {0}")]
    Lock(#[from] slotlock_core::LockError),

    #[error("Controller error: {0}")]
    Controller(#[from] slotlock_core::ControllerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Container snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("Container snapshot already exists: {} (use --force to overwrite)", .0.display())]
    SnapshotExists(PathBuf),

    #[error("Slot {index} out of range for {len} slots")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("Stack of {count} does not fit a max stack size of {max_stack}")]
    OverfullStack { count: u32, max_stack: u32 },
}
