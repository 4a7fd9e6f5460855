use tracing::{debug, instrument, warn};

use crate::bitset::LockBitset;
use crate::codec::LockRecordCodec;
use crate::config::{ConfigError, LockConfig};
use crate::container::Container;
use crate::error::LockError;
use crate::sort::sort_with_locks;
use crate::stack::{SearchMatcher, StackCombiner};

/// Error type for controller operations.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("no container attached")]
    Detached,
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("record store failed: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn store_error<E: std::error::Error + Send + Sync + 'static>(err: E) -> ControllerError {
    ControllerError::Store(Box::new(err))
}

/// Search state of one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFlags {
    /// The slot's stack matches the active search text.
    pub matches: bool,
    /// A search is in progress, so non-matching slots are dimmed.
    pub active: bool,
}

/// Drives the lock state of one attached container from UI events.
///
/// The controller owns the container while it is attached, together with the
/// container's [`LockBitset`]. Every change to the bitset is written straight
/// back to the container's record list, so the persisted record never lags
/// behind the in-memory state.
///
/// Only secure containers accept lock toggles, and only secure player storage
/// accepts prefix changes or reads and writes a record. Other containers start
/// from an unlocked bitset every time they are attached.
pub struct LockController<C: Container> {
    codec: LockRecordCodec,
    individual_locking: bool,
    container: Option<C>,
    bitset: LockBitset,
    search: Option<String>,
    search_flags: Vec<SearchFlags>,
}

impl<C: Container> LockController<C> {
    /// Creates a detached controller.
    pub fn new(config: &LockConfig) -> Result<Self, ConfigError> {
        Ok(LockController {
            codec: LockRecordCodec::from_config(config)?,
            individual_locking: config.individual_locking,
            container: None,
            bitset: LockBitset::new(0),
            search: None,
            search_flags: Vec::new(),
        })
    }

    /// Attaches a container and loads its lock record.
    ///
    /// A missing record leaves every slot unlocked. A malformed one is logged
    /// and treated as missing; the next save overwrites it.
    #[instrument(level = "debug", skip_all, fields(slots = container.slot_count()))]
    pub fn attach(&mut self, container: C) -> Result<(), ControllerError> {
        let len = container.slot_count();
        self.bitset = LockBitset::new(len);
        self.search_flags = vec![SearchFlags::default(); len];
        self.container = Some(container);
        self.load()
    }

    /// Detaches the current container, resetting all lock and search state.
    pub fn detach(&mut self) -> Option<C> {
        self.bitset = LockBitset::new(0);
        self.search = None;
        self.search_flags.clear();
        self.container.take()
    }

    pub fn container(&self) -> Option<&C> {
        self.container.as_ref()
    }

    pub fn bitset(&self) -> &LockBitset {
        &self.bitset
    }

    pub fn codec(&self) -> &LockRecordCodec {
        &self.codec
    }

    pub fn ignored_prefix(&self) -> usize {
        self.bitset.ignored_prefix()
    }

    pub fn is_locked(&self, index: usize) -> Result<bool, LockError> {
        self.bitset.is_locked(index)
    }

    pub fn total_locked_count(&self) -> usize {
        self.bitset.total_locked_count()
    }

    pub fn individual_locked_count(&self) -> usize {
        self.bitset.individual_locked_count()
    }

    pub fn unlocked_count(&self) -> usize {
        self.bitset.unlocked_count()
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn search_flags(&self, index: usize) -> Option<SearchFlags> {
        self.search_flags.get(index).copied()
    }

    /// Handles a press on a slot.
    ///
    /// The lock is toggled when the container is secure, the slot lies beyond
    /// the ignored prefix, and either the lock modifier is held or individual
    /// locking is enabled. Returns true if the lock changed, so the host can
    /// play its feedback.
    #[instrument(level = "debug", skip(self))]
    pub fn on_slot_press(
        &mut self,
        index: usize,
        modifier_held: bool,
    ) -> Result<bool, ControllerError> {
        let container = self.container.as_ref().ok_or(ControllerError::Detached)?;
        if !container.kind().secure || !(modifier_held || self.individual_locking) {
            return Ok(false);
        }

        let locked = self.bitset.is_locked(index)?;
        if index < self.bitset.ignored_prefix() {
            return Ok(false);
        }
        self.bitset.set_locked(index, !locked)?;
        debug!(index, locked = !locked, "toggled slot lock");

        self.save()?;
        Ok(true)
    }

    /// Handles the global lock count moving from `old` to `new`.
    ///
    /// Returns false without touching anything when the container does not
    /// persist lock state.
    #[instrument(level = "debug", skip(self))]
    pub fn on_prefix_change(&mut self, old: usize, new: usize) -> Result<bool, ControllerError> {
        let container = self.container.as_ref().ok_or(ControllerError::Detached)?;
        if !container.kind().is_persistable() {
            return Ok(false);
        }

        self.bitset.grow_prefix(old, new)?;
        self.save()?;
        Ok(true)
    }

    /// Handles a change of the search text, refreshing every slot's flags.
    ///
    /// An empty text ends the search.
    #[instrument(level = "debug", skip(self, matcher))]
    pub fn on_search_text_change<M>(
        &mut self,
        text: &str,
        matcher: &M,
    ) -> Result<(), ControllerError>
    where
        M: SearchMatcher<C::Stack> + ?Sized,
    {
        if self.container.is_none() {
            return Err(ControllerError::Detached);
        }
        self.search = (!text.is_empty()).then(|| text.to_string());
        for index in 0..self.search_flags.len() {
            self.refresh_search(index, matcher)?;
        }
        Ok(())
    }

    /// Handles a write to one slot by refreshing that slot's search flags.
    pub fn on_slot_changed<M>(
        &mut self,
        index: usize,
        matcher: &M,
    ) -> Result<(), ControllerError>
    where
        M: SearchMatcher<C::Stack> + ?Sized,
    {
        self.refresh_search(index, matcher)
    }

    /// Handles the sort button.
    ///
    /// Sorts around locked and prefix slots and writes back only the slots
    /// whose contents changed, one `update_slot` call each. Returns the number
    /// of slots written. Nothing is written if the sort fails.
    #[instrument(level = "debug", skip_all)]
    pub fn on_sort_requested<K>(&mut self, combiner: &K) -> Result<usize, ControllerError>
    where
        K: StackCombiner<C::Stack> + ?Sized,
    {
        let container = self.container.as_mut().ok_or(ControllerError::Detached)?;
        let sorted = sort_with_locks(container.slots(), &self.bitset, combiner)?;

        let mut written = 0;
        for (index, stack) in sorted.into_iter().enumerate() {
            if container.slots()[index] != stack {
                container.update_slot(index, stack);
                written += 1;
            }
        }
        debug!(written, "applied sort");
        Ok(written)
    }

    fn refresh_search<M>(
        &mut self,
        index: usize,
        matcher: &M,
    ) -> Result<(), ControllerError>
    where
        M: SearchMatcher<C::Stack> + ?Sized,
    {
        let container = self.container.as_ref().ok_or(ControllerError::Detached)?;
        let len = self.search_flags.len();
        let flags = self
            .search_flags
            .get_mut(index)
            .ok_or(LockError::OutOfRange { index, len })?;
        *flags = match &self.search {
            Some(text) => SearchFlags {
                matches: container
                    .slots()
                    .get(index)
                    .and_then(Option::as_ref)
                    .is_some_and(|stack| matcher.matches(stack, text)),
                active: true,
            },
            None => SearchFlags::default(),
        };
        Ok(())
    }

    fn load(&mut self) -> Result<(), ControllerError> {
        let Some(container) = self.container.as_ref() else {
            return Ok(());
        };
        if !container.kind().is_persistable() {
            debug!("container does not persist locks, using defaults");
            return Ok(());
        }

        let Some(record) = self.codec.find(container.records()).map_err(store_error)? else {
            debug!("no lock record");
            return Ok(());
        };
        match self.codec.decode(&record, self.bitset.len()) {
            Ok(bitset) => {
                debug!(
                    prefix = bitset.ignored_prefix(),
                    locked = bitset.total_locked_count(),
                    "loaded lock record"
                );
                self.bitset = bitset;
            }
            Err(err) => warn!(%err, %record, "discarding malformed lock record"),
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), ControllerError> {
        let Some(container) = self.container.as_mut() else {
            return Ok(());
        };
        if !container.kind().is_persistable() {
            return Ok(());
        }

        let record = self.codec.encode(&self.bitset);
        debug!(%record, "saving lock record");
        self.codec
            .find_and_replace(container.records_mut(), record)
            .map_err(store_error)
    }
}
