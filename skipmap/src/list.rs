//! Lock-free skip list keyed by 64-bit hashes
//!
//! This module implements the concurrent core: a multi-level linked list in
//! which every mutation is published by a single compare-and-swap and no
//! operation ever blocks another.
//!
//! # Protocol
//!
//! - **Insert**: find predecessors and successors at every level, pre-wire
//!   the new node's tower, then CAS it into level 0. The level-0 publication
//!   is the linearization point; upper levels are linked afterwards and a
//!   partially linked tower is always valid.
//! - **Delete**: mark the node's incoming links from the top level down,
//!   then CAS the mark into its level-0 link. The successful level-0 mark is
//!   the linearization point; the upper-level marks are advisory and only
//!   speed up bypass.
//! - **Read**: traversals skip marked links by reading through the deleted
//!   node's frozen forward chain, eliding the marked link when the slot is
//!   still writable.
//!
//! # Memory reclamation
//!
//! Nodes and replaced values go through `crossbeam::epoch`. Deletion gains
//! two internal steps the marks alone do not provide: the node's own slots
//! are frozen before any mark is published (so nothing can attach behind a
//! node being spliced out, and its forward chain stays put), and after the
//! level-0 mark the value cell is claimed with a CAS to null to pick the one
//! thread that frees the node. The claiming thread sweeps every level until
//! nothing references the node before deferring destruction, so a thread
//! that entered before the removal can finish its traversal on the frozen
//! links and later threads cannot reach the node at all. None of this moves
//! a linearization point.

use crossbeam::epoch::{self, Atomic, Guard, Owned, Shared};
use crossbeam::utils::Backoff;
use log::{debug, trace};
use std::sync::atomic::{AtomicUsize, Ordering};

use skipmap_core::Error;

use crate::height::{HeightSampler, DEFAULT_P};
use crate::node::{skip_deleted, Node};
use crate::tag;
use crate::CAP_LEVEL;

#[derive(Debug)]
pub(crate) struct SkipList<V> {
    head: Atomic<Node<V>>,
    top_level: AtomicUsize,
    max_level: usize,
    sampler: HeightSampler,
}

/// Snapshot of a traversal: the matched node (if any, taken from the first
/// level the walk landed on it) and, per level, the last node before the
/// target hash and the first at or past it. Entries above the current top
/// level are head/null.
struct FindResult<'g, V> {
    found: Shared<'g, Node<V>>,
    preds: Vec<Shared<'g, Node<V>>>,
    succs: Vec<Shared<'g, Node<V>>>,
}

impl<V> SkipList<V>
where
    V: Send + Sync + 'static,
{
    pub(crate) fn try_new(max_level: usize, p: f64) -> crate::Result<Self> {
        if !(1..=CAP_LEVEL).contains(&max_level) {
            return Err(Error::InvalidMaxLevel(max_level));
        }
        if !(p > 0.0 && p < 1.0) {
            return Err(Error::InvalidProbability(p));
        }
        Ok(Self {
            head: Atomic::new(Node::head(max_level)),
            top_level: AtomicUsize::new(1),
            max_level,
            sampler: HeightSampler::new(max_level, p),
        })
    }

    pub(crate) fn new(max_level: usize) -> Self {
        match Self::try_new(max_level, DEFAULT_P) {
            Ok(list) => list,
            Err(e) => panic!("{e}"),
        }
    }

    pub(crate) fn max_level(&self) -> usize {
        self.max_level
    }

    #[cfg(test)]
    fn current_top_level(&self) -> usize {
        self.top_level.load(Ordering::Acquire)
    }

    /// Returns the value stored under `hash`, if the entry is live.
    pub(crate) fn load(&self, hash: u64) -> Option<V>
    where
        V: Clone,
    {
        let guard = &epoch::pin();
        let node = self.search(hash, guard);
        let node = unsafe { node.as_ref() }?;
        let value = node.value(guard);
        unsafe { value.as_ref() }.cloned()
    }

    /// Sets the value for `hash`, replacing any existing value.
    pub(crate) fn store(&self, hash: u64, value: V) {
        let guard = &epoch::pin();
        let backoff = Backoff::new();
        let mut value = Owned::new(value);
        loop {
            let fr = self.find_full(hash, guard);
            if let Some(node) = unsafe { fr.found.as_ref() } {
                let current = node.value(guard);
                if current.is_null() {
                    // A delete owns this node; help it out of the index and
                    // insert a fresh entry.
                    self.remove_node(fr.found, hash, guard);
                    backoff.spin();
                    continue;
                }
                match node.val.compare_exchange(
                    current,
                    value,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    guard,
                ) {
                    Ok(_) => {
                        unsafe { guard.defer_destroy(current) };
                        return;
                    }
                    Err(e) => {
                        value = e.new;
                        backoff.spin();
                    }
                }
            } else {
                match self.try_insert(hash, value, fr, guard) {
                    Ok(()) => return,
                    Err(v) => {
                        value = v;
                        backoff.spin();
                    }
                }
            }
        }
    }

    /// Replaces the value for `hash` and returns the previous one, or
    /// inserts and returns `None` when the entry is missing.
    pub(crate) fn swap(&self, hash: u64, value: V) -> Option<V>
    where
        V: Clone,
    {
        let guard = &epoch::pin();
        let backoff = Backoff::new();
        let mut value = Owned::new(value);
        loop {
            let fr = self.find_full(hash, guard);
            if let Some(node) = unsafe { fr.found.as_ref() } {
                let current = node.value(guard);
                if current.is_null() {
                    self.remove_node(fr.found, hash, guard);
                    backoff.spin();
                    continue;
                }
                match node.val.compare_exchange(
                    current,
                    value,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    guard,
                ) {
                    Ok(_) => {
                        let previous = unsafe { current.deref() }.clone();
                        unsafe { guard.defer_destroy(current) };
                        return Some(previous);
                    }
                    Err(e) => {
                        value = e.new;
                        backoff.spin();
                    }
                }
            } else {
                match self.try_insert(hash, value, fr, guard) {
                    Ok(()) => return None,
                    Err(v) => {
                        value = v;
                        backoff.spin();
                    }
                }
            }
        }
    }

    /// Swaps in `new` if the current value equals `old`.
    ///
    /// Equality is decided on the values; the swap itself is a CAS on the
    /// stored pointer. Retries while the cell keeps holding a value equal to
    /// `old`, so a false return means the entry was missing, deleted, or
    /// moved away from `old`.
    pub(crate) fn compare_and_swap(&self, hash: u64, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        let guard = &epoch::pin();
        let backoff = Backoff::new();
        let mut new = Owned::new(new);
        loop {
            let node = self.search(hash, guard);
            let Some(node_ref) = (unsafe { node.as_ref() }) else {
                return false;
            };
            let current = node_ref.value(guard);
            let Some(current_ref) = (unsafe { current.as_ref() }) else {
                return false;
            };
            if current_ref != old {
                return false;
            }
            match node_ref.val.compare_exchange(
                current,
                new,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    unsafe { guard.defer_destroy(current) };
                    return true;
                }
                Err(e) => {
                    new = e.new;
                    backoff.spin();
                }
            }
        }
    }

    /// Deletes the entry for `hash` if its value equals `old`.
    ///
    /// The comparison and the delete are separate steps: the current value
    /// is read, compared, and the entry then removed, so a write landing in
    /// between is removed with it.
    pub(crate) fn compare_and_delete(&self, hash: u64, old: &V) -> bool
    where
        V: PartialEq,
    {
        let guard = &epoch::pin();
        let node = self.search(hash, guard);
        let Some(node_ref) = (unsafe { node.as_ref() }) else {
            return false;
        };
        let current = node_ref.value(guard);
        let Some(current_ref) = (unsafe { current.as_ref() }) else {
            return false;
        };
        if current_ref != old {
            return false;
        }
        let _ = self.delete_inner(hash, guard);
        true
    }

    /// Returns the existing value for `hash`, or stores `value` and returns
    /// it. The boolean reports whether the value was loaded rather than
    /// stored; exactly one of any set of concurrent callers on an empty
    /// entry observes `false`.
    pub(crate) fn load_or_store(&self, hash: u64, value: V) -> (V, bool)
    where
        V: Clone,
    {
        let guard = &epoch::pin();
        let backoff = Backoff::new();
        let stored = value.clone();
        let mut value = Owned::new(value);
        loop {
            let fr = self.find_full(hash, guard);
            if let Some(node) = unsafe { fr.found.as_ref() } {
                let current = node.value(guard);
                if current.is_null() {
                    self.remove_node(fr.found, hash, guard);
                    backoff.spin();
                    continue;
                }
                return (unsafe { current.deref() }.clone(), true);
            }
            match self.try_insert(hash, value, fr, guard) {
                Ok(()) => return (stored, false),
                Err(v) => {
                    value = v;
                    backoff.spin();
                }
            }
        }
    }

    /// Deletes the entry for `hash` and returns the value it held when the
    /// delete took effect.
    pub(crate) fn delete(&self, hash: u64) -> Option<V>
    where
        V: Clone,
    {
        let guard = &epoch::pin();
        let previous = self.delete_inner(hash, guard)?;
        unsafe { previous.as_ref() }.cloned()
    }

    /// Runs the removal protocol for `hash` and returns the value the entry
    /// held at the linearization point, or `None` when there is no entry
    /// left to delete (a match only reachable through upper levels is
    /// already marked at level 0 and belongs to another delete).
    fn delete_inner<'g>(&self, hash: u64, guard: &'g Guard) -> Option<Shared<'g, V>> {
        let backoff = Backoff::new();
        loop {
            let fr = self.find_full(hash, guard);
            let node = fr.found;
            let node_ref = unsafe { node.as_ref() }?;
            if !tag::same_node(fr.succs[0], node) {
                return None;
            }
            // Pin the node's forward chain before publishing any mark, so
            // nothing can attach behind it while it is spliced out.
            self.freeze_tower(node_ref, guard);

            // Advisory marks from the top down, each followed by a
            // best-effort unlink. Failures here are tolerated.
            let top = self.top_level.load(Ordering::Acquire);
            for level in (1..top).rev() {
                let pred = unsafe { fr.preds[level].deref() };
                let edge = pred.tower.load(level, guard);
                if !tag::same_node(edge, node) || edge.tag() != 0 {
                    continue;
                }
                let marked = edge.with_tag(tag::MARK);
                if pred.tower.cas(level, edge, marked, guard) {
                    let next = skip_deleted(marked, level, guard);
                    let _ = pred.tower.cas(level, marked, next, guard);
                }
            }

            // The level-0 mark decides the delete.
            let pred = unsafe { fr.preds[0].deref() };
            let edge = pred.tower.load(0, guard);
            if !tag::same_node(edge, node)
                || edge.tag() != 0
                || !pred.tower.cas(0, edge, edge.with_tag(tag::MARK), guard)
            {
                // The neighborhood moved; refresh the predecessors and
                // retry the marking pass.
                backoff.spin();
                continue;
            }

            let previous = node_ref.value(guard);

            // Claim the value cell: whoever nulls it frees the node. A
            // racing clear may take the claim instead.
            let mut claimed = false;
            loop {
                let value = node_ref.value(guard);
                if value.is_null() {
                    break;
                }
                if node_ref
                    .val
                    .compare_exchange(
                        value,
                        Shared::null(),
                        Ordering::AcqRel,
                        Ordering::Acquire,
                        guard,
                    )
                    .is_ok()
                {
                    unsafe { guard.defer_destroy(value) };
                    claimed = true;
                    break;
                }
            }
            if claimed {
                for level in (0..node_ref.height()).rev() {
                    self.unlink_level(node, hash, level, guard);
                }
                unsafe { guard.defer_destroy(node) };
            }
            return Some(previous);
        }
    }

    /// Calls `f` for every live entry in ascending hash order until it
    /// returns false. Entries inserted or deleted during the walk may or may
    /// not be observed.
    pub(crate) fn range<F>(&self, mut f: F)
    where
        F: FnMut(u64, &V) -> bool,
    {
        let guard = &epoch::pin();
        let head = unsafe { self.head.load(Ordering::Acquire, guard).deref() };
        let mut next = head.successor(0, guard);
        while let Some(node) = unsafe { next.as_ref() } {
            let value = node.value(guard);
            if let Some(value) = unsafe { value.as_ref() } {
                if !f(node.hash, value) {
                    return;
                }
            }
            next = node.successor(0, guard);
        }
    }

    /// Counts live entries with a level-0 walk. O(n), eventually consistent.
    pub(crate) fn len(&self) -> usize {
        let mut count = 0;
        self.range(|_, _| {
            count += 1;
            true
        });
        count
    }

    pub(crate) fn is_empty(&self) -> bool {
        let mut empty = true;
        self.range(|_, _| {
            empty = false;
            false
        });
        empty
    }

    /// Detaches every entry at once by nulling the head's slots from the top
    /// level down, then reclaims the detached chain.
    ///
    /// A store racing with `clear` may end up on the detached chain and be
    /// reclaimed with it. The top level is not lowered; that only costs a
    /// constant traversal factor.
    pub(crate) fn clear(&self) {
        let guard = &epoch::pin();
        let head = unsafe { self.head.load(Ordering::Acquire, guard).deref() };
        let top = self.top_level.load(Ordering::Acquire);
        for level in (1..top).rev() {
            head.tower.store(level, Shared::null());
        }
        let mut next = head.tower.swap(0, Shared::null(), guard);

        // Reclaim the old chain. Winning the value-cell CAS doubles as the
        // ownership handshake with any concurrent delete of the same node.
        let mut reclaimed = 0usize;
        while let Some(node) = unsafe { next.with_tag(0).as_ref() } {
            let current = next.with_tag(0);
            next = node.tower.load(0, guard);
            loop {
                let value = node.value(guard);
                if value.is_null() {
                    break;
                }
                if node
                    .val
                    .compare_exchange(
                        value,
                        Shared::null(),
                        Ordering::AcqRel,
                        Ordering::Acquire,
                        guard,
                    )
                    .is_ok()
                {
                    unsafe {
                        guard.defer_destroy(value);
                        guard.defer_destroy(current);
                    }
                    reclaimed += 1;
                    break;
                }
            }
        }
        debug!("cleared {reclaimed} entries");
    }

    /// Locates `hash` without recording predecessors, returning as soon as
    /// the top-down walk lands on a matching node at any level.
    fn search<'g>(&self, hash: u64, guard: &'g Guard) -> Shared<'g, Node<V>> {
        let head = self.head.load(Ordering::Acquire, guard);
        let top = self.top_level.load(Ordering::Acquire);
        let mut pred = head;
        for level in (0..top).rev() {
            let (next_pred, next) = self.walk_level(pred, level, hash, guard);
            pred = next_pred;
            if let Some(n) = unsafe { next.as_ref() } {
                if n.hash == hash {
                    return next;
                }
            }
        }
        Shared::null()
    }

    /// Full traversal recording predecessors and successors at every level.
    fn find_full<'g>(&self, hash: u64, guard: &'g Guard) -> FindResult<'g, V> {
        let head = self.head.load(Ordering::Acquire, guard);
        let top = self.top_level.load(Ordering::Acquire);
        let mut preds = vec![head; self.max_level];
        let mut succs = vec![Shared::null(); self.max_level];
        let mut found = Shared::null();
        let mut pred = head;
        for level in (0..top).rev() {
            let (next_pred, next) = self.walk_level(pred, level, hash, guard);
            pred = next_pred;
            preds[level] = pred;
            succs[level] = next;
            if let Some(n) = unsafe { next.as_ref() } {
                if n.hash == hash {
                    found = next;
                }
            }
        }
        FindResult { found, preds, succs }
    }

    /// Advances along one level until the next live node's hash is at or
    /// past `hash`. Returns the final predecessor and its successor.
    fn walk_level<'g>(
        &self,
        mut pred: Shared<'g, Node<V>>,
        level: usize,
        hash: u64,
        guard: &'g Guard,
    ) -> (Shared<'g, Node<V>>, Shared<'g, Node<V>>) {
        loop {
            let next = unsafe { pred.deref() }.successor(level, guard);
            match unsafe { next.as_ref() } {
                Some(n) if n.hash < hash => pred = next,
                _ => return (pred, next),
            }
        }
    }

    /// Allocates a node for `hash` and publishes it at level 0. On success
    /// the upper levels are linked best-effort; on a lost level-0 race the
    /// value is handed back so the caller can retry against fresh state.
    fn try_insert<'g>(
        &self,
        hash: u64,
        value: Owned<V>,
        mut fr: FindResult<'g, V>,
        guard: &'g Guard,
    ) -> Result<(), Owned<V>> {
        let height = self.sampler.sample();
        let mut node = Owned::new(Node::new(hash, height));
        node.val = Atomic::from(value);
        for level in 0..height {
            node.tower.init(level, fr.succs[level]);
        }
        let node = node.into_shared(guard);
        let pred = unsafe { fr.preds[0].deref() };
        if !pred.tower.cas(0, fr.succs[0], node, guard) {
            // Never published; take the allocation apart again.
            let mut node = unsafe { node.into_owned() };
            let value = node.take_value().expect("unpublished node lost its value");
            return Err(value);
        }
        self.update_top_level(height);
        fr.found = node;
        self.link_upper(hash, node, height, fr, guard);
        Ok(())
    }

    /// Links a freshly published node into levels `1..height`.
    ///
    /// Failures refresh the traversal and retry the remaining levels; the
    /// loop stops early if the node's own slot froze (a delete caught up
    /// with it) or the node is no longer the one found under its hash. A
    /// tower that never finishes linking is still a valid subsequence.
    fn link_upper<'g>(
        &self,
        hash: u64,
        node: Shared<'g, Node<V>>,
        height: usize,
        mut fr: FindResult<'g, V>,
        guard: &'g Guard,
    ) {
        let node_ref = unsafe { node.deref() };
        'levels: for level in 1..height {
            loop {
                if !tag::same_node(fr.found, node) {
                    return;
                }
                // A refreshed traversal that already walks onto the node at
                // this level reports it as its own successor entry.
                if tag::same_node(fr.succs[level], node) {
                    continue 'levels;
                }
                let pred = unsafe { fr.preds[level].deref() };
                let succ = fr.succs[level];
                let link = node_ref.tower.load(level, guard);
                if tag::is_frozen(link) {
                    return;
                }
                // Point the node at the successor it is about to precede.
                // Until this level is linked nobody else writes this slot,
                // so a failure can only mean a freeze won the race.
                if link != succ && !node_ref.tower.cas(level, link, succ, guard) {
                    return;
                }
                if pred.tower.cas(level, succ, node, guard) {
                    continue 'levels;
                }
                fr = self.find_full(hash, guard);
            }
        }
    }

    /// Raises the top level to at least `height`.
    fn update_top_level(&self, height: usize) {
        assert!(
            height <= self.max_level,
            "tower height {height} above max level {}",
            self.max_level
        );
        let mut current = self.top_level.load(Ordering::Relaxed);
        while height > current {
            match self.top_level.compare_exchange_weak(
                current,
                height,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    trace!("top level raised to {height}");
                    break;
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Physically removes a node whose value cell was already claimed:
    /// freezes its links, then takes it out of every level. Callable by any
    /// thread; only the claim winner hands the node to the collector.
    fn remove_node<'g>(&self, node: Shared<'g, Node<V>>, hash: u64, guard: &'g Guard) {
        let node_ref = unsafe { node.deref() };
        self.freeze_tower(node_ref, guard);
        for level in (0..node_ref.height()).rev() {
            self.unlink_level(node, hash, level, guard);
        }
    }

    /// Makes every slot of `node`'s tower immutable. After this no insert
    /// can attach behind the node and its forward chain is stable.
    fn freeze_tower(&self, node: &Node<V>, guard: &Guard) {
        for level in (0..node.height()).rev() {
            loop {
                let link = node.tower.load(level, guard);
                if tag::is_frozen(link) {
                    break;
                }
                if node
                    .tower
                    .cas(level, link, link.with_tag(link.tag() | tag::FROZEN), guard)
                {
                    break;
                }
            }
        }
    }

    /// Takes every link to `node` out of `level`. Traversals that raced the
    /// removal may have copied the link into another slot, so the level is
    /// rescanned from the head until a full pass sees no reference.
    fn unlink_level<'g>(
        &self,
        node: Shared<'g, Node<V>>,
        hash: u64,
        level: usize,
        guard: &'g Guard,
    ) {
        let backoff = Backoff::new();
        'rescan: loop {
            let mut pred = self.head.load(Ordering::Acquire, guard);
            loop {
                let pred_ref = unsafe { pred.deref() };
                let edge = pred_ref.tower.load(level, guard);
                let target = edge.with_tag(0);
                let Some(target_ref) = (unsafe { target.as_ref() }) else {
                    return;
                };
                if tag::is_frozen(edge) {
                    if tag::same_node(target, node) {
                        // Our link sits in a slot that is itself being
                        // removed; rescan once that removal gets it out.
                        backoff.snooze();
                        continue 'rescan;
                    }
                    if target_ref.hash >= hash {
                        return;
                    }
                    pred = target;
                    continue;
                }
                if tag::is_marked(edge) || target_ref.value(guard).is_null() {
                    if !tag::is_marked(edge) {
                        // Claimed but not yet frozen; freeze on its owner's
                        // behalf so the edge can come out now.
                        self.freeze_tower(target_ref, guard);
                    }
                    if self.retire_edge(pred_ref, level, edge, guard) {
                        continue;
                    }
                    backoff.spin();
                    continue 'rescan;
                }
                if target_ref.hash >= hash {
                    return;
                }
                pred = target;
            }
        }
    }

    /// Retires one link to a deleted node: publishes the mark if it is not
    /// set yet, then replaces the link with the node's forward pointer.
    fn retire_edge<'g>(
        &self,
        pred: &Node<V>,
        level: usize,
        edge: Shared<'g, Node<V>>,
        guard: &'g Guard,
    ) -> bool {
        let after = skip_deleted(edge, level, guard);
        let marked = if tag::is_marked(edge) {
            edge
        } else {
            let marked = edge.with_tag(edge.tag() | tag::MARK);
            if !pred.tower.cas(level, edge, marked, guard) {
                return false;
            }
            marked
        };
        pred.tower.cas(level, marked, after, guard)
    }
}

impl<V> Drop for SkipList<V> {
    fn drop(&mut self) {
        // Exclusive access: walk level 0 and free whatever is still linked.
        // Nodes already handed to the collector were unlinked first, so they
        // do not appear here.
        let guard = unsafe { epoch::unprotected() };
        let head = self.head.load(Ordering::Relaxed, guard);
        let mut next = unsafe { head.deref() }.tower.load(0, guard);
        while !next.with_tag(0).is_null() {
            let node = next.with_tag(0);
            next = unsafe { node.deref() }.tower.load(0, guard);
            drop(unsafe { node.into_owned() });
        }
        drop(unsafe { head.into_owned() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashes_at_level(list: &SkipList<i32>, level: usize) -> Vec<u64> {
        let guard = &epoch::pin();
        let head = unsafe { list.head.load(Ordering::Acquire, guard).deref() };
        let mut out = Vec::new();
        let mut next = head.successor(level, guard);
        while let Some(node) = unsafe { next.as_ref() } {
            if !node.value(guard).is_null() {
                out.push(node.hash);
            }
            next = node.successor(level, guard);
        }
        out
    }

    #[test]
    fn store_load_delete_roundtrip() {
        let list = SkipList::new(16);
        list.store(3, 9876);
        list.store(5, 9877);
        list.store(345, 9878);
        list.store(77, 9879);
        list.store(342, 9880);

        assert_eq!(list.len(), 5);
        assert_eq!(list.load(77), Some(9879));

        assert_eq!(list.delete(77), Some(9879));
        assert_eq!(list.delete(77), None);
        assert_eq!(list.load(77), None);
        assert_eq!(list.len(), 4);

        list.clear();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn store_updates_in_place() {
        let list = SkipList::new(16);
        list.store(5, 1);
        list.store(5, 2);
        assert_eq!(list.load(5), Some(2));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn levels_stay_sorted_and_nested() {
        let list = SkipList::new(12);
        let mut keys: Vec<u64> = (0..1000).map(|i| i * 31 % 4099).collect();
        for &k in &keys {
            list.store(k, k as i32);
        }
        keys.sort_unstable();
        keys.dedup();

        let bottom = hashes_at_level(&list, 0);
        assert_eq!(bottom, keys);

        for level in 1..list.current_top_level() {
            let this = hashes_at_level(&list, level);
            let mut sorted = this.clone();
            sorted.sort_unstable();
            assert_eq!(this, sorted, "level {level} out of order");
            for h in &this {
                assert!(bottom.binary_search(h).is_ok(), "level {level} holds {h} missing below");
            }
        }
    }

    #[test]
    fn delete_erases_from_every_level() {
        let list = SkipList::new(12);
        for k in 0..500u64 {
            list.store(k, k as i32);
        }
        for k in (0..500u64).step_by(2) {
            assert_eq!(list.delete(k), Some(k as i32));
        }
        for level in 0..list.current_top_level() {
            for h in hashes_at_level(&list, level) {
                assert_eq!(h % 2, 1, "deleted hash {h} still linked at level {level}");
            }
        }
        assert_eq!(list.len(), 250);
    }

    #[test]
    fn top_level_is_bounded() {
        let list = SkipList::new(4);
        for k in 0..2000u64 {
            list.store(k, 0);
        }
        let top = list.current_top_level();
        assert!((1..=4).contains(&top));
    }

    #[test]
    fn single_level_degenerates_to_a_sorted_list() {
        let list = SkipList::new(1);
        for k in [9u64, 3, 7, 1, 5] {
            list.store(k, k as i32);
        }
        assert_eq!(hashes_at_level(&list, 0), vec![1, 3, 5, 7, 9]);
        assert_eq!(list.delete(7), Some(7));
        assert_eq!(list.load(7), None);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn range_stops_when_asked() {
        let list = SkipList::new(16);
        for k in 0..10u64 {
            list.store(k, k as i32);
        }
        let mut seen = Vec::new();
        list.range(|h, _| {
            seen.push(h);
            seen.len() < 3
        });
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn invalid_construction_is_rejected() {
        assert_eq!(
            SkipList::<i32>::try_new(0, 0.5).unwrap_err(),
            Error::InvalidMaxLevel(0)
        );
        assert_eq!(
            SkipList::<i32>::try_new(65, 0.5).unwrap_err(),
            Error::InvalidMaxLevel(65)
        );
        assert_eq!(
            SkipList::<i32>::try_new(16, 1.0).unwrap_err(),
            Error::InvalidProbability(1.0)
        );
        assert!(SkipList::<i32>::try_new(64, 0.25).is_ok());
    }

    #[test]
    #[should_panic(expected = "max level")]
    fn out_of_range_max_level_panics() {
        let _ = SkipList::<i32>::new(0);
    }
}
