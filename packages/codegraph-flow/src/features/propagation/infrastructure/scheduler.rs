//! Double-buffered work scheduler
//!
//! All new work lands in the `next` bag. A round starts by handing that bag
//! out as the current one, so work produced while draining round N is only
//! visible in round N+1.
//!
//! Token-carrying items keep their delta in a side table keyed by the item
//! itself. Re-adding work for a pending key merges the delta, which
//! collapses repeated edge traversals into one item per node per round.

use super::work_bag::WorkBag;
use crate::config::BagOrder;
use crate::features::propagation::domain::WorkItem;
use crate::features::propagation::ports::TokenSet;
use rustc_hash::FxHashMap;
use std::mem;

#[derive(Debug)]
pub struct Scheduler<T> {
    next: WorkBag<WorkItem>,
    deltas: FxHashMap<WorkItem, T>,
    order: BagOrder,
}

impl<T: TokenSet> Scheduler<T> {
    pub fn new(order: BagOrder) -> Self {
        Self {
            next: WorkBag::new(order),
            deltas: FxHashMap::default(),
            order,
        }
    }

    /// Queue `delta` for `item`, merging into pending work for the same key
    ///
    /// Returns `true` if a new item was queued.
    pub fn absorb(&mut self, item: WorkItem, delta: T) -> bool {
        if delta.is_empty() {
            return false;
        }
        match self.deltas.get_mut(&item) {
            Some(pending) => {
                pending.add_all(&delta);
                false
            }
            None => {
                self.deltas.insert(item, delta);
                self.next.add_work(item);
                true
            }
        }
    }

    /// Queue an item without a delta
    pub fn schedule(&mut self, item: WorkItem) -> bool {
        self.next.add_work(item)
    }

    /// Hand out the accumulated work as the bag for a new round
    pub fn begin_round(&mut self) -> Option<WorkBag<WorkItem>> {
        if self.next.is_empty() {
            return None;
        }
        Some(mem::replace(&mut self.next, WorkBag::new(self.order)))
    }

    /// Return the unexecuted items of an interrupted round to the next bag
    ///
    /// Their deltas never left the table.
    pub fn requeue(&mut self, mut bag: WorkBag<WorkItem>) {
        for item in bag.drain_pending() {
            self.next.add_work(item);
        }
    }

    /// Remove the delta of an item about to execute
    pub fn take_delta(&mut self, item: &WorkItem) -> Option<T> {
        self.deltas.remove(item)
    }

    pub fn pending_delta(&self, item: &WorkItem) -> Option<&T> {
        self.deltas.get(item)
    }

    /// Cancel the pending work of `item`, returning its delta
    pub fn withdraw(&mut self, item: &WorkItem) -> Option<T> {
        let delta = self.deltas.remove(item)?;
        self.next.remove(item);
        Some(delta)
    }

    #[inline]
    pub fn has_work(&self) -> bool {
        self.next.has_work()
    }

    /// Items queued for the next round
    pub fn queued(&self) -> usize {
        self.next.len()
    }

    pub fn clear(&mut self) {
        self.next.clear();
        self.deltas.clear();
    }
}
