//! Tag bits carried in next-pointers
//!
//! Every next-pointer in a tower can carry flags in its low alignment bits,
//! so one compare-and-swap publishes both a pointer and a deletion flag.

use crossbeam::epoch::Shared;

/// The pointed-to node is logically deleted at this level. Once set on a
/// slot the flag never comes off; the slot is later replaced wholesale by an
/// unmarked pointer past the deleted node.
pub(crate) const MARK: usize = 0b10;

/// The slot's owner is being deleted and the slot content is immutable.
/// Set on a node's own slots before any of its incoming links are marked,
/// so the forward chain read while bypassing the node can no longer change.
pub(crate) const FROZEN: usize = 0b01;

pub(crate) fn is_marked<T>(p: Shared<'_, T>) -> bool {
    p.tag() & MARK != 0
}

pub(crate) fn is_frozen<T>(p: Shared<'_, T>) -> bool {
    p.tag() & FROZEN != 0
}

/// Pointer equality ignoring tag bits.
pub(crate) fn same_node<T>(a: Shared<'_, T>, b: Shared<'_, T>) -> bool {
    a.with_tag(0).as_raw() == b.with_tag(0).as_raw()
}
