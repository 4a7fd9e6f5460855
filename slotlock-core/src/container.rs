use serde::{Deserialize, Serialize};

use crate::store::{MemoryRecords, RecordStore};

/// What kind of storage a container is.
///
/// Only secure player storage carries a persisted lock record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerKind {
    /// The container has an owner list (and therefore a record list).
    pub secure: bool,
    /// The container was placed by a player rather than generated as loot.
    pub player_storage: bool,
}

impl ContainerKind {
    pub const LOOT: ContainerKind = ContainerKind {
        secure: false,
        player_storage: false,
    };

    pub const PLAYER_STORAGE: ContainerKind = ContainerKind {
        secure: true,
        player_storage: true,
    };

    /// Returns true if lock state for this container is read and written.
    pub fn is_persistable(&self) -> bool {
        self.secure && self.player_storage
    }
}

/// The host-side view of a container the lock controller is attached to.
pub trait Container {
    type Stack: Clone + PartialEq;
    type Records: RecordStore;

    fn kind(&self) -> ContainerKind;

    /// Current slot contents; the length is the container's slot count.
    fn slots(&self) -> &[Option<Self::Stack>];

    /// Writes one slot. Hosts hang their per-slot side effects off this call.
    fn update_slot(&mut self, index: usize, stack: Option<Self::Stack>);

    fn records(&self) -> &Self::Records;

    fn records_mut(&mut self) -> &mut Self::Records;

    fn slot_count(&self) -> usize {
        self.slots().len()
    }
}

/// A container held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryContainer<S> {
    kind: ContainerKind,
    slots: Vec<Option<S>>,
    #[serde(default)]
    users: MemoryRecords,
    #[serde(skip)]
    slot_updates: usize,
}

impl<S> MemoryContainer<S> {
    /// Creates a container with `slot_count` empty slots and no records.
    pub fn new(kind: ContainerKind, slot_count: usize) -> Self {
        MemoryContainer {
            kind,
            slots: std::iter::repeat_with(|| None).take(slot_count).collect(),
            users: MemoryRecords::new(),
            slot_updates: 0,
        }
    }

    pub fn with_slots(kind: ContainerKind, slots: Vec<Option<S>>) -> Self {
        MemoryContainer {
            kind,
            slots,
            users: MemoryRecords::new(),
            slot_updates: 0,
        }
    }

    pub fn with_records(mut self, users: MemoryRecords) -> Self {
        self.users = users;
        self
    }

    /// Number of `update_slot` calls since construction.
    pub fn slot_updates(&self) -> usize {
        self.slot_updates
    }
}

impl<S: Clone + PartialEq> Container for MemoryContainer<S> {
    type Stack = S;
    type Records = MemoryRecords;

    fn kind(&self) -> ContainerKind {
        self.kind
    }

    fn slots(&self) -> &[Option<S>] {
        &self.slots
    }

    fn update_slot(&mut self, index: usize, stack: Option<S>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = stack;
            self.slot_updates += 1;
        }
    }

    fn records(&self) -> &MemoryRecords {
        &self.users
    }

    fn records_mut(&mut self) -> &mut MemoryRecords {
        &mut self.users
    }
}
