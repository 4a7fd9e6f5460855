use tracing::debug;

use crate::bitset::LockBitset;
use crate::error::LockError;
use crate::stack::StackCombiner;

/// Combines and sorts the movable stacks of a slot array.
///
/// A slot is movable when its index is at or beyond `ignored_prefix` and
/// `is_locked` returns false for it. The non-empty movable stacks are handed to
/// `combiner` in slot order, and the results are written back over the movable
/// slots in ascending order, trailing movable slots cleared. Prefix and locked
/// slots are copied through unchanged.
///
/// The input is never modified; the caller writes the returned array back.
pub fn sort_slots<S, L, C>(
    slots: &[Option<S>],
    is_locked: L,
    ignored_prefix: usize,
    combiner: &C,
) -> Result<Vec<Option<S>>, LockError>
where
    S: Clone,
    L: Fn(usize) -> bool,
    C: StackCombiner<S> + ?Sized,
{
    let start = ignored_prefix.min(slots.len());
    let movable: Vec<usize> = (start..slots.len()).filter(|&i| !is_locked(i)).collect();

    let stacks: Vec<S> = movable.iter().filter_map(|&i| slots[i].clone()).collect();
    let gathered = stacks.len();
    let combined = combiner.combine_and_sort(stacks);
    if combined.len() > movable.len() {
        return Err(LockError::CombinerOverflow {
            produced: combined.len(),
            capacity: movable.len(),
        });
    }
    debug!(
        movable = movable.len(),
        gathered,
        combined = combined.len(),
        "sorted unlocked slots"
    );

    let mut sorted = slots.to_vec();
    let mut combined = combined.into_iter();
    for index in movable {
        sorted[index] = combined.next();
    }
    Ok(sorted)
}

/// Sorts `slots` around the locks and prefix recorded in `bitset`.
///
/// Fails without producing anything when the slot count disagrees with the
/// bitset length.
pub fn sort_with_locks<S, C>(
    slots: &[Option<S>],
    bitset: &LockBitset,
    combiner: &C,
) -> Result<Vec<Option<S>>, LockError>
where
    S: Clone,
    C: StackCombiner<S> + ?Sized,
{
    if slots.len() != bitset.len() {
        return Err(LockError::SlotCountMismatch {
            expected: bitset.len(),
            actual: slots.len(),
        });
    }
    sort_slots(
        slots,
        |index| bitset.is_locked(index).unwrap_or(true),
        bitset.ignored_prefix(),
        combiner,
    )
}
