//! Work bags
//!
//! Ordered, duplicate-suppressing containers of work items. The pop
//! discipline (LIFO or FIFO) is chosen by the caller.

use crate::config::BagOrder;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::hash::Hash;

/// Duplicate-suppressing work container
#[derive(Debug, Clone)]
pub struct WorkBag<W> {
    items: VecDeque<W>,
    members: FxHashSet<W>,
    order: BagOrder,
}

impl<W> WorkBag<W>
where
    W: Copy + Eq + Hash,
{
    pub fn new(order: BagOrder) -> Self {
        Self {
            items: VecDeque::new(),
            members: FxHashSet::default(),
            order,
        }
    }

    /// Add an item, returns `false` if an equal item is already queued
    pub fn add_work(&mut self, item: W) -> bool {
        if self.members.insert(item) {
            self.items.push_back(item);
            true
        } else {
            false
        }
    }

    /// Next item according to the bag's discipline
    pub fn take_work(&mut self) -> Option<W> {
        loop {
            let item = match self.order {
                BagOrder::Lifo => self.items.pop_back(),
                BagOrder::Fifo => self.items.pop_front(),
            }?;
            // Removed items stay in the queue until popped
            if self.members.remove(&item) {
                return Some(item);
            }
        }
    }

    /// Drop a queued item, returns whether it was present
    pub fn remove(&mut self, item: &W) -> bool {
        self.members.remove(item)
    }

    /// Take every queued item out, in insertion order
    pub fn drain_pending(&mut self) -> Vec<W> {
        let mut pending = Vec::with_capacity(self.members.len());
        for item in self.items.drain(..) {
            if self.members.remove(&item) {
                pending.push(item);
            }
        }
        pending
    }

    pub fn contains(&self, item: &W) -> bool {
        self.members.contains(item)
    }

    #[inline]
    pub fn has_work(&self) -> bool {
        !self.members.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn order(&self) -> BagOrder {
        self.order
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.members.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut bag = WorkBag::new(BagOrder::Lifo);
        bag.add_work(1);
        bag.add_work(2);
        bag.add_work(3);
        assert_eq!(bag.take_work(), Some(3));
        assert_eq!(bag.take_work(), Some(2));
        assert_eq!(bag.take_work(), Some(1));
        assert_eq!(bag.take_work(), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut bag = WorkBag::new(BagOrder::Fifo);
        bag.add_work(1);
        bag.add_work(2);
        assert_eq!(bag.take_work(), Some(1));
        assert_eq!(bag.take_work(), Some(2));
    }

    #[test]
    fn test_duplicate_suppression() {
        let mut bag = WorkBag::new(BagOrder::Fifo);
        assert!(bag.add_work(7));
        assert!(!bag.add_work(7));
        assert_eq!(bag.len(), 1);

        // Re-adding after the item left the bag is allowed
        assert_eq!(bag.take_work(), Some(7));
        assert!(bag.add_work(7));
    }

    #[test]
    fn test_remove() {
        let mut bag = WorkBag::new(BagOrder::Lifo);
        bag.add_work(1);
        bag.add_work(2);
        assert!(bag.remove(&1));
        assert!(!bag.remove(&1));
        assert!(!bag.contains(&1));
        assert_eq!(bag.take_work(), Some(2));
        assert!(!bag.has_work());
    }

    #[test]
    fn test_readd_after_remove_runs_once() {
        let mut bag = WorkBag::new(BagOrder::Fifo);
        bag.add_work(1);
        bag.add_work(2);
        assert!(bag.remove(&1));
        assert!(bag.add_work(1));
        assert_eq!(bag.len(), 2);

        let mut taken = Vec::new();
        while let Some(item) = bag.take_work() {
            taken.push(item);
        }
        taken.sort_unstable();
        assert_eq!(taken, vec![1, 2]);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_drain_pending_skips_removed() {
        let mut bag = WorkBag::new(BagOrder::Lifo);
        bag.add_work(1);
        bag.add_work(2);
        bag.add_work(3);
        bag.remove(&2);
        assert_eq!(bag.drain_pending(), vec![1, 3]);
        assert!(!bag.has_work());
        assert_eq!(bag.take_work(), None);
    }
}
