//! Per-node forward pointers
//!
//! A tower is a fixed array of atomic next-pointers, one slot per level the
//! owning node participates in. All traffic after publication goes through
//! acquire loads, release stores and acquire-release compare-and-swaps;
//! `init` exists only for wiring a node that no other thread can see yet.

use crossbeam::epoch::{Atomic, Guard, Shared};
use std::sync::atomic::Ordering;

use crate::node::Node;

pub(crate) struct Tower<V> {
    slots: Box<[Atomic<Node<V>>]>,
}

impl<V> Tower<V> {
    pub(crate) fn new(height: usize) -> Self {
        let slots = (0..height).map(|_| Atomic::null()).collect();
        Self { slots }
    }

    pub(crate) fn height(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn load<'g>(&self, level: usize, guard: &'g Guard) -> Shared<'g, Node<V>> {
        self.slots[level].load(Ordering::Acquire, guard)
    }

    pub(crate) fn store(&self, level: usize, next: Shared<'_, Node<V>>) {
        self.slots[level].store(next, Ordering::Release);
    }

    /// Unsynchronized store for a node that has not been published yet.
    pub(crate) fn init(&self, level: usize, next: Shared<'_, Node<V>>) {
        self.slots[level].store(next, Ordering::Relaxed);
    }

    pub(crate) fn cas<'g>(
        &self,
        level: usize,
        current: Shared<'g, Node<V>>,
        next: Shared<'g, Node<V>>,
        guard: &'g Guard,
    ) -> bool {
        self.slots[level]
            .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire, guard)
            .is_ok()
    }

    pub(crate) fn swap<'g>(
        &self,
        level: usize,
        next: Shared<'g, Node<V>>,
        guard: &'g Guard,
    ) -> Shared<'g, Node<V>> {
        self.slots[level].swap(next, Ordering::AcqRel, guard)
    }
}
