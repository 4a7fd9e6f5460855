//! Tool commands run against a container snapshot.
//!
//! Each command returns the lines to print rather than printing them.

use std::path::Path;

use clap::Subcommand;
use slotlock_core::{Container, ItemStack, LockConfig, LockController, MergeByItem, NameContains};

use crate::error::ToolError;
use crate::snapshot::{Snapshot, read_snapshot, write_snapshot};

/// Commands raised as UI events against an attached container.
#[derive(Debug, Subcommand)]
pub enum Event {
    /// Press a slot, toggling its lock
    Lock {
        index: usize,

        /// Hold the lock modifier while pressing
        #[arg(short, long)]
        modifier: bool,
    },

    /// Move the global lock boundary
    Prefix { value: usize },

    /// List the slots matching a search text
    Search { text: String },

    /// Combine and sort the unlocked slots
    Sort,

    /// Print slots, locks and the persisted record
    Show,
}

/// Puts a stack into one slot of the snapshot. A count of 0 empties the slot.
pub fn put_stack(
    path: &Path,
    index: usize,
    item: String,
    count: u32,
    max_stack: u32,
) -> Result<(), ToolError> {
    if count > max_stack {
        return Err(ToolError::OverfullStack { count, max_stack });
    }
    let mut snapshot = read_snapshot(path)?;
    let len = snapshot.slot_count();
    if index >= len {
        return Err(ToolError::SlotOutOfRange { index, len });
    }
    let stack = (count > 0).then(|| ItemStack::new(item, count, max_stack));
    snapshot.update_slot(index, stack);
    write_snapshot(path, &snapshot)
}

/// Attaches the snapshot, raises `event`, and writes the snapshot back unless
/// the event is read-only.
pub fn run_event(
    path: &Path,
    locks: &LockConfig,
    event: Event,
) -> Result<Vec<String>, ToolError> {
    let mut controller = LockController::new(locks)?;
    controller.attach(read_snapshot(path)?)?;

    let lines = match event {
        Event::Lock { index, modifier } => {
            if controller.on_slot_press(index, modifier)? {
                let state = if controller.is_locked(index)? {
                    "locked"
                } else {
                    "unlocked"
                };
                vec![format!("slot {} {}", index, state)]
            } else {
                vec![format!("slot {} unchanged", index)]
            }
        }
        Event::Prefix { value } => {
            let old = controller.ignored_prefix();
            if controller.on_prefix_change(old, value)? {
                vec![format!("global lock moved from {} to {}", old, value)]
            } else {
                vec!["container does not keep lock state".to_string()]
            }
        }
        Event::Search { text } => {
            controller.on_search_text_change(&text, &NameContains)?;
            return Ok(match_lines(&controller));
        }
        Event::Sort => {
            let written = controller.on_sort_requested(&MergeByItem)?;
            vec![format!("sorted, {} slots updated", written)]
        }
        Event::Show => return Ok(slot_lines(&controller)),
    };

    if let Some(snapshot) = controller.detach() {
        write_snapshot(path, &snapshot)?;
    }
    Ok(lines)
}

fn describe(stack: Option<&ItemStack>) -> String {
    match stack {
        Some(stack) => format!("{} x{}", stack.item, stack.count),
        None => "-".to_string(),
    }
}

fn slot_lines(controller: &LockController<Snapshot>) -> Vec<String> {
    let Some(container) = controller.container() else {
        return Vec::new();
    };
    let prefix = controller.ignored_prefix();

    let mut lines = vec![format!("{:>4}  {:<4}  stack", "slot", "lock")];
    for (index, stack) in container.slots().iter().enumerate() {
        let marker = if index < prefix {
            "G"
        } else if controller.is_locked(index).unwrap_or(false) {
            "L"
        } else {
            ""
        };
        lines.push(format!("{:>4}  {:<4}  {}", index, marker, describe(stack.as_ref())));
    }

    lines.push(format!(
        "locked: {} total, {} individual, {} unlocked, global {}",
        controller.total_locked_count(),
        controller.individual_locked_count(),
        controller.unlocked_count(),
        prefix
    ));
    let record = match controller.codec().find(container.records()) {
        Ok(record) => record,
        Err(never) => match never {},
    };
    lines.push(format!("record: {}", record.as_deref().unwrap_or("none")));
    lines
}

fn match_lines(controller: &LockController<Snapshot>) -> Vec<String> {
    let Some(container) = controller.container() else {
        return Vec::new();
    };
    container
        .slots()
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            controller
                .search_flags(*index)
                .is_some_and(|flags| flags.matches)
        })
        .map(|(index, stack)| format!("{:>4}  {}", index, describe(stack.as_ref())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotlock_core::{ContainerKind, DEFAULT_TAG};
    use std::path::PathBuf;

    use crate::snapshot::create_snapshot;

    fn chest(dir: &tempfile::TempDir, kind: ContainerKind, slots: usize) -> PathBuf {
        let path = dir.path().join("chest.json");
        create_snapshot(&path, kind, slots, false).unwrap();
        path
    }

    #[test]
    fn put_then_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::LOOT, 3);

        put_stack(&path, 1, "wood".to_string(), 4, 64).unwrap();
        assert_eq!(
            read_snapshot(&path).unwrap().slots()[1],
            Some(ItemStack::new("wood", 4, 64))
        );

        put_stack(&path, 1, "wood".to_string(), 0, 64).unwrap();
        assert_eq!(read_snapshot(&path).unwrap().slots()[1], None);
    }

    #[test]
    fn put_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::LOOT, 3);
        assert!(matches!(
            put_stack(&path, 3, "wood".to_string(), 4, 64),
            Err(ToolError::SlotOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn put_overfull_stack() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::LOOT, 3);
        assert!(matches!(
            put_stack(&path, 0, "wood".to_string(), 100, 64),
            Err(ToolError::OverfullStack {
                count: 100,
                max_stack: 64
            })
        ));
        assert!(matches!(
            put_stack(&path, 0, "wood".to_string(), 1, 0),
            Err(ToolError::OverfullStack { .. })
        ));
    }

    #[test]
    fn lock_writes_record_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::PLAYER_STORAGE, 8);

        let lines = run_event(
            &path,
            &LockConfig::default(),
            Event::Lock {
                index: 3,
                modifier: true,
            },
        )
        .unwrap();
        assert_eq!(lines, vec!["slot 3 locked"]);

        let snapshot = read_snapshot(&path).unwrap();
        assert_eq!(
            snapshot.records().as_slice(),
            &[format!("{},0,EA==", DEFAULT_TAG)]
        );
    }

    #[test]
    fn sort_writes_slots_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::PLAYER_STORAGE, 3);
        put_stack(&path, 0, "wood".to_string(), 40, 64).unwrap();
        put_stack(&path, 2, "wood".to_string(), 40, 64).unwrap();

        let lines = run_event(&path, &LockConfig::default(), Event::Sort).unwrap();
        assert_eq!(lines, vec!["sorted, 3 slots updated"]);

        let snapshot = read_snapshot(&path).unwrap();
        assert_eq!(
            snapshot.slots(),
            &[
                Some(ItemStack::new("wood", 64, 64)),
                Some(ItemStack::new("wood", 16, 64)),
                None,
            ]
        );
    }

    #[test]
    fn prefix_on_loot_container_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::LOOT, 3);
        let lines = run_event(&path, &LockConfig::default(), Event::Prefix { value: 2 }).unwrap();
        assert_eq!(lines, vec!["container does not keep lock state"]);
    }

    #[test]
    fn search_and_show_leave_snapshot_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::PLAYER_STORAGE, 3);
        put_stack(&path, 1, "Iron Ore".to_string(), 5, 64).unwrap();
        let before = std::fs::read(&path).unwrap();

        let lines = run_event(
            &path,
            &LockConfig::default(),
            Event::Search {
                text: "iron".to_string(),
            },
        )
        .unwrap();
        assert_eq!(lines, vec!["   1  Iron Ore x5"]);

        let lines = run_event(&path, &LockConfig::default(), Event::Show).unwrap();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], "record: none");

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn invalid_tag_is_a_lock_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::PLAYER_STORAGE, 3);
        let locks = LockConfig {
            tag: "a,b".to_string(),
            ..LockConfig::default()
        };
        assert!(matches!(
            run_event(&path, &locks, Event::Show),
            Err(ToolError::LockConfig(_))
        ));
    }

    #[test]
    fn press_out_of_range_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = chest(&dir, ContainerKind::PLAYER_STORAGE, 3);
        assert!(matches!(
            run_event(
                &path,
                &LockConfig::default(),
                Event::Lock {
                    index: 7,
                    modifier: true
                }
            ),
            Err(ToolError::Controller(_))
        ));
    }
}
