//! Skip list nodes
//!
//! A node owns its value cell and its tower. The value lives behind an
//! atomic pointer so it can be replaced (or claimed during removal) with a
//! single compare-and-swap; comparison is always by pointer identity of the
//! stored value.

use crossbeam::epoch::{self, Atomic, Guard, Owned, Shared};
use std::mem;
use std::sync::atomic::Ordering;

use crate::tag;
use crate::tower::Tower;

pub(crate) struct Node<V> {
    pub(crate) hash: u64,
    pub(crate) val: Atomic<V>,
    pub(crate) tower: Tower<V>,
}

impl<V> Node<V> {
    pub(crate) fn new(hash: u64, height: usize) -> Self {
        Self {
            hash,
            val: Atomic::null(),
            tower: Tower::new(height),
        }
    }

    /// The sentinel. It carries the full tower and no value, and is never a
    /// traversal target.
    pub(crate) fn head(max_level: usize) -> Self {
        Self::new(0, max_level)
    }

    pub(crate) fn height(&self) -> usize {
        self.tower.height()
    }

    pub(crate) fn value<'g>(&self, guard: &'g Guard) -> Shared<'g, V> {
        self.val.load(Ordering::Acquire, guard)
    }

    /// Takes the value back out of a node that was never published.
    pub(crate) fn take_value(&mut self) -> Option<Owned<V>> {
        let cell = mem::replace(&mut self.val, Atomic::null());
        let guard = unsafe { epoch::unprotected() };
        let value = cell.load(Ordering::Relaxed, guard);
        if value.is_null() {
            None
        } else {
            // No other thread has seen the node, so the cell is exclusively ours.
            Some(unsafe { value.into_owned() })
        }
    }

    /// First successor at `level` whose link is not marked.
    ///
    /// Marked links are skipped by reading through the deleted node's own
    /// slot, which is frozen by the time the mark is visible. When the slot
    /// we loaded from is itself still writable, the marked link is elided in
    /// passing; a failed elision is simply retried from the slot's new
    /// content.
    pub(crate) fn successor<'g>(&self, level: usize, guard: &'g Guard) -> Shared<'g, Node<V>> {
        let mut edge = self.tower.load(level, guard);
        loop {
            if edge.is_null() || !tag::is_marked(edge) {
                return edge.with_tag(0);
            }
            let after = skip_deleted(edge, level, guard);
            if tag::is_frozen(edge) {
                // This slot belongs to a node on its way out; route past the
                // deleted target without touching the slot.
                return after;
            }
            if self.tower.cas(level, edge, after, guard) {
                return after;
            }
            edge = self.tower.load(level, guard);
        }
    }
}

impl<V> Drop for Node<V> {
    fn drop(&mut self) {
        // The tower only borrows its targets; the value is ours to free if a
        // delete did not already detach it.
        let guard = unsafe { epoch::unprotected() };
        let value = self.val.load(Ordering::Relaxed, guard);
        if !value.is_null() {
            drop(unsafe { value.into_owned() });
        }
    }
}

/// Follows the frozen forward chain of the deleted node behind `edge` and
/// returns the first link that is not marked, stripped of its flags.
pub(crate) fn skip_deleted<'g, V>(
    edge: Shared<'g, Node<V>>,
    level: usize,
    guard: &'g Guard,
) -> Shared<'g, Node<V>> {
    let mut node = edge.with_tag(0);
    loop {
        let link = unsafe { node.deref() }.tower.load(level, guard);
        if link.is_null() || !tag::is_marked(link) {
            return link.with_tag(0);
        }
        node = link.with_tag(0);
    }
}
