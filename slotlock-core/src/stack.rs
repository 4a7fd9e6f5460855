//! Host-side stack primitives the lock subsystem delegates to.
//!
//! The subsystem never merges stacks or matches search text itself. Hosts plug
//! in their own rules through [`StackCombiner`] and [`SearchMatcher`];
//! [`ItemStack`] with [`MergeByItem`] and [`NameContains`] is a small reference
//! implementation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Merges a run of stacks and orders the result.
///
/// Implementations must be pure, and must not produce more stacks than they
/// were given.
pub trait StackCombiner<S> {
    fn combine_and_sort(&self, stacks: Vec<S>) -> Vec<S>;
}

impl<S, F> StackCombiner<S> for F
where
    F: Fn(Vec<S>) -> Vec<S>,
{
    fn combine_and_sort(&self, stacks: Vec<S>) -> Vec<S> {
        self(stacks)
    }
}

/// Decides whether a stack matches the current search text.
pub trait SearchMatcher<S> {
    fn matches(&self, stack: &S, text: &str) -> bool;
}

impl<S, F> SearchMatcher<S> for F
where
    F: Fn(&S, &str) -> bool,
{
    fn matches(&self, stack: &S, text: &str) -> bool {
        self(stack, text)
    }
}

/// A count of one item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
    pub max_stack: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32, max_stack: u32) -> Self {
        ItemStack {
            item: item.into(),
            count,
            max_stack,
        }
    }
}

/// Merges stacks of the same item up to their max stack size, drops empty
/// stacks, and orders by item name, fullest stack first.
///
/// An item never comes out in more stacks than it went in. Over-full input
/// (a count above `max_stack`, or a `max_stack` of 0) is spread evenly over
/// at most as many stacks as were given.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeByItem;

#[derive(Default)]
struct ItemTotal {
    count: u64,
    stacks: u64,
    max_stack: u32,
}

impl StackCombiner<ItemStack> for MergeByItem {
    fn combine_and_sort(&self, stacks: Vec<ItemStack>) -> Vec<ItemStack> {
        let mut totals: BTreeMap<String, ItemTotal> = BTreeMap::new();
        for stack in stacks {
            if stack.count == 0 {
                continue;
            }
            let total = totals.entry(stack.item).or_default();
            total.count += u64::from(stack.count);
            total.stacks += 1;
            total.max_stack = total.max_stack.max(stack.max_stack);
        }

        let mut merged = Vec::new();
        for (item, total) in totals {
            // Never below the fullest input stack, so this fits in a u32.
            let size = u64::from(total.max_stack).max(total.count.div_ceil(total.stacks));
            let mut remaining = total.count;
            while remaining > 0 {
                let count = remaining.min(size);
                merged.push(ItemStack::new(item.clone(), count as u32, total.max_stack));
                remaining -= count;
            }
        }
        merged
    }
}

/// Case-insensitive substring match on the item name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameContains;

impl SearchMatcher<ItemStack> for NameContains {
    fn matches(&self, stack: &ItemStack, text: &str) -> bool {
        stack.item.to_lowercase().contains(&text.to_lowercase())
    }
}
