use std::convert::Infallible;

use serde::{Deserialize, Serialize};

/// An ordered list of opaque string records owned by the host.
///
/// The lock codec borrows this list to keep one record of its own in it. It
/// never reorders, removes or interprets the other entries, so a store only
/// has to support locating an entry and rewriting it in place or at the head.
pub trait RecordStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the position and contents of the first record accepted by `matches`.
    fn find(
        &self,
        matches: &dyn Fn(&str) -> bool,
    ) -> Result<Option<(usize, String)>, Self::Error>;

    /// Overwrites the record at `index`, keeping its position.
    fn replace(&mut self, index: usize, record: String) -> Result<(), Self::Error>;

    /// Inserts a record before every existing entry.
    fn insert_front(&mut self, record: String) -> Result<(), Self::Error>;
}

/// An in-memory record list backed by a Vec.
///
/// Useful for testing and as the snapshot representation of a container's
/// user list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryRecords {
    records: Vec<String>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.records
    }
}

impl From<Vec<String>> for MemoryRecords {
    fn from(records: Vec<String>) -> Self {
        MemoryRecords { records }
    }
}

impl RecordStore for MemoryRecords {
    type Error = Infallible;

    fn find(
        &self,
        matches: &dyn Fn(&str) -> bool,
    ) -> Result<Option<(usize, String)>, Self::Error> {
        Ok(self
            .records
            .iter()
            .enumerate()
            .find(|(_, record)| matches(record))
            .map(|(index, record)| (index, record.clone())))
    }

    fn replace(&mut self, index: usize, record: String) -> Result<(), Self::Error> {
        match self.records.get_mut(index) {
            Some(slot) => *slot = record,
            // The index came from a stale lookup; keep the record rather than drop it.
            None => self.records.push(record),
        }
        Ok(())
    }

    fn insert_front(&mut self, record: String) -> Result<(), Self::Error> {
        self.records.insert(0, record);
        Ok(())
    }
}
