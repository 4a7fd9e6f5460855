/// Contract violations raised by the bitset and the sorter.
///
/// These indicate a caller bug rather than a recoverable condition, so they are
/// surfaced unchanged instead of being clamped away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    #[error("slot index {index} out of range for {len} slots")]
    OutOfRange { index: usize, len: usize },
    #[error("expected {expected} slots, got {actual}")]
    SlotCountMismatch { expected: usize, actual: usize },
    #[error("combiner produced {produced} stacks for {capacity} movable slots")]
    CombinerOverflow { produced: usize, capacity: usize },
}
