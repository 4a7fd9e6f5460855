//! Slotlock keeps per-slot lock state for item containers.
//!
//! Core concepts:
//! - **LockBitset**: one lock flag per slot plus the length of the globally
//!   locked leading range (the "ignored prefix")
//! - **LockRecordCodec**: packs the bitset into a `TAG,<prefix>,<base64>` record
//!   and keeps that record inside a host-owned list of opaque strings
//! - **RecordStore**: the host's record list, as seen by the codec
//! - **sort_with_locks**: combines and sorts the movable stacks of a container,
//!   treating locked and prefix slots as fixed obstacles
//! - **LockController**: ties the above to UI events for one attached container
//!
//! # Example
//!
//! ```
//! use slotlock_core::{
//!     Container, ContainerKind, ItemStack, LockConfig, LockController, MemoryContainer,
//!     MergeByItem,
//! };
//!
//! let container = MemoryContainer::with_slots(
//!     ContainerKind::PLAYER_STORAGE,
//!     vec![
//!         Some(ItemStack::new("wood", 4, 64)),
//!         Some(ItemStack::new("torch", 1, 16)),
//!         Some(ItemStack::new("wood", 8, 64)),
//!     ],
//! );
//!
//! let mut controller = LockController::new(&LockConfig::default()).unwrap();
//! controller.attach(container).unwrap();
//!
//! // Keep the torch where it is, then sort everything else.
//! controller.on_slot_press(1, true).unwrap();
//! controller.on_sort_requested(&MergeByItem).unwrap();
//!
//! let container = controller.detach().unwrap();
//! assert_eq!(container.slots()[0], Some(ItemStack::new("wood", 12, 64)));
//! assert_eq!(container.slots()[1], Some(ItemStack::new("torch", 1, 16)));
//! assert_eq!(container.slots()[2], None);
//! ```

mod bitset;
mod codec;
mod config;
mod container;
mod controller;
mod error;
mod sort;
mod stack;
mod store;

pub use bitset::LockBitset;
pub use codec::{BitOrder, DEFAULT_TAG, LockRecordCodec, MalformedRecord};
pub use config::{ConfigError, LockConfig};
pub use container::{Container, ContainerKind, MemoryContainer};
pub use controller::{ControllerError, LockController, SearchFlags};
pub use error::LockError;
pub use sort::{sort_slots, sort_with_locks};
pub use stack::{ItemStack, MergeByItem, NameContains, SearchMatcher, StackCombiner};
pub use store::{MemoryRecords, RecordStore};
