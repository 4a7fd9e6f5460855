use crate::error::LockError;

const WORD_BITS: usize = u64::BITS as usize;

/// Per-slot lock flags for a container, plus the length of the globally
/// locked leading range ("ignored prefix").
///
/// The length is fixed at construction. Slots below the ignored prefix are
/// governed by the global lock count and are excluded from the individual
/// counts and from sorting; their bits are still stored so that the whole
/// bitset round-trips through the persisted record.
///
/// Bits are packed into 64-bit words. Bits at positions `>= len` are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockBitset {
    words: Vec<u64>,
    len: usize,
    ignored_prefix: usize,
}

impl LockBitset {
    /// Creates an all-unlocked bitset over `len` slots with an empty prefix.
    pub fn new(len: usize) -> Self {
        LockBitset {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
            ignored_prefix: 0,
        }
    }

    /// Creates a bitset with the given locked slots and prefix length.
    pub fn from_locked(
        len: usize,
        ignored_prefix: usize,
        locked: impl IntoIterator<Item = usize>,
    ) -> Result<Self, LockError> {
        if ignored_prefix > len {
            return Err(LockError::OutOfRange {
                index: ignored_prefix,
                len,
            });
        }
        let mut bitset = Self::new(len);
        bitset.ignored_prefix = ignored_prefix;
        for index in locked {
            bitset.set_locked(index, true)?;
        }
        Ok(bitset)
    }

    /// Returns the number of slots covered.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the bitset covers no slots.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the length of the globally locked leading range.
    pub fn ignored_prefix(&self) -> usize {
        self.ignored_prefix
    }

    /// Sets the lock flag of one slot.
    ///
    /// Prefix slots are not rejected here; excluding them from toggling is the
    /// caller's job.
    pub fn set_locked(&mut self, index: usize, value: bool) -> Result<(), LockError> {
        self.check(index)?;
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        Ok(())
    }

    /// Returns the lock flag of one slot.
    pub fn is_locked(&self, index: usize) -> Result<bool, LockError> {
        self.check(index)?;
        Ok(self.bit(index))
    }

    /// Counts locked slots over the whole range, prefix included.
    pub fn total_locked_count(&self) -> usize {
        self.count_ones_from(0)
    }

    /// Counts locked slots at or beyond the ignored prefix.
    pub fn individual_locked_count(&self) -> usize {
        self.count_ones_from(self.ignored_prefix)
    }

    /// Counts unlocked slots at or beyond the ignored prefix.
    pub fn unlocked_count(&self) -> usize {
        self.len - self.ignored_prefix - self.individual_locked_count()
    }

    /// Moves the prefix boundary from `old` to `new`.
    ///
    /// Slots entering the prefix become locked. Slots leaving it become
    /// unlocked, whatever their state was before they entered.
    pub fn grow_prefix(&mut self, old: usize, new: usize) -> Result<(), LockError> {
        for boundary in [old, new] {
            if boundary > self.len {
                return Err(LockError::OutOfRange {
                    index: boundary,
                    len: self.len,
                });
            }
        }
        for index in old..new {
            self.set_locked(index, true)?;
        }
        for index in new..old {
            self.set_locked(index, false)?;
        }
        self.ignored_prefix = new;
        Ok(())
    }

    /// Unlocks every slot and empties the prefix.
    pub fn reset(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
        self.ignored_prefix = 0;
    }

    /// Iterates over the lock flags in slot order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|index| self.bit(index))
    }

    /// Iterates over the indices of locked slots in ascending order.
    pub fn locked_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&index| self.bit(index))
    }

    fn bit(&self, index: usize) -> bool {
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    fn check(&self, index: usize) -> Result<(), LockError> {
        if index < self.len {
            Ok(())
        } else {
            Err(LockError::OutOfRange {
                index,
                len: self.len,
            })
        }
    }

    fn count_ones_from(&self, start: usize) -> usize {
        if start >= self.len {
            return 0;
        }
        let first = start / WORD_BITS;
        let head = (self.words[first] >> (start % WORD_BITS)).count_ones() as usize;
        let tail: usize = self.words[first + 1..]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();
        head + tail
    }
}
