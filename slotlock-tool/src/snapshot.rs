//! Container snapshots kept as JSON files.

use std::path::Path;

use slotlock_core::{ContainerKind, ItemStack, MemoryContainer};

use crate::error::ToolError;

pub type Snapshot = MemoryContainer<ItemStack>;

pub fn create_snapshot(
    path: &Path,
    kind: ContainerKind,
    slots: usize,
    force: bool,
) -> Result<Snapshot, ToolError> {
    if path.exists() && !force {
        return Err(ToolError::SnapshotExists(path.to_path_buf()));
    }
    let snapshot = Snapshot::new(kind, slots);
    write_snapshot(path, &snapshot)?;
    Ok(snapshot)
}

pub fn read_snapshot(path: &Path) -> Result<Snapshot, ToolError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolError::SnapshotNotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_str(&content)?)
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), ToolError> {
    let content = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, content)?;
    Ok(())
}
