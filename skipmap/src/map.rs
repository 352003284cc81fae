//! Hash-map-shaped façade over the skip list
//!
//! [`SkipMap`] adapts arbitrary user keys to the engine's `u64` key space
//! through [`HashKey`] and exposes the concurrent map surface. Keys are not
//! stored; two keys with the same hash name the same entry, and iteration
//! order is hash order (numeric order when integer keys are used, since
//! integers are their own hash).

use std::marker::PhantomData;

use skipmap_core::HashKey;

use crate::height::DEFAULT_P;
use crate::list::SkipList;
use crate::DEFAULT_MAX_LEVEL;

/// A lock-free concurrent map over 64-bit hashed keys.
///
/// All operations take `&self` and are safe to call from any number of
/// threads. Values are stored behind atomic pointers; methods that return a
/// value clone it out, so cheap-to-clone payloads (or `Arc`s) work best.
///
/// # Example
///
/// ```
/// use skipmap::SkipMap;
/// use std::sync::Arc;
/// use std::thread;
///
/// let map: Arc<SkipMap<u64, u64>> = Arc::new(SkipMap::new(16));
/// let mut handles = Vec::new();
/// for t in 0..4 {
///     let map = Arc::clone(&map);
///     handles.push(thread::spawn(move || {
///         for i in 0..100 {
///             map.store(&(t * 100 + i), i);
///         }
///     }));
/// }
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(map.len(), 400);
/// ```
pub struct SkipMap<K: ?Sized, V> {
    list: SkipList<V>,
    _key: PhantomData<fn(&K)>,
}

impl<K, V> SkipMap<K, V>
where
    K: HashKey + ?Sized,
    V: Send + Sync + 'static,
{
    /// Creates an empty map whose towers grow up to `max_level` levels.
    ///
    /// Heights around `log2(expected entries)` work well; 16 covers tens of
    /// thousands of entries comfortably.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is outside `1..=64`.
    pub fn new(max_level: usize) -> Self {
        match Self::try_new(max_level) {
            Ok(map) => map,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible variant of [`new`](Self::new).
    pub fn try_new(max_level: usize) -> crate::Result<Self> {
        Self::with_probability(max_level, DEFAULT_P)
    }

    /// Creates an empty map with a custom level probability in `(0, 1)`.
    /// Lower values make tall towers rarer.
    pub fn with_probability(max_level: usize, p: f64) -> crate::Result<Self> {
        Ok(Self {
            list: SkipList::try_new(max_level, p)?,
            _key: PhantomData,
        })
    }

    /// Returns the value stored for `key`, or `None` if no entry is present.
    pub fn load(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.list.load(key.hash64())
    }

    /// Sets the value for `key`, replacing any previous value.
    pub fn store(&self, key: &K, value: V) {
        self.list.store(key.hash64(), value)
    }

    /// Deletes the entry for `key`, returning the value it held.
    pub fn delete(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.list.delete(key.hash64())
    }

    /// Stores `value` and returns the previous value, or `None` if the entry
    /// was missing (in which case the value is inserted).
    pub fn swap(&self, key: &K, value: V) -> Option<V>
    where
        V: Clone,
    {
        self.list.swap(key.hash64(), value)
    }

    /// Swaps in `new` if the value currently stored for `key` equals `old`.
    ///
    /// Returns false when the entry is missing or holds a different value.
    /// While the stored value keeps comparing equal to `old`, a lost swap
    /// race is retried.
    pub fn compare_and_swap(&self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        self.list.compare_and_swap(key.hash64(), old, new)
    }

    /// Deletes the entry for `key` if its value equals `old`.
    ///
    /// Returns false when the entry is missing, even if `old` is the value
    /// the entry last held. The check and the removal are separate steps;
    /// a write racing between them is removed as well.
    pub fn compare_and_delete(&self, key: &K, old: &V) -> bool
    where
        V: PartialEq,
    {
        self.list.compare_and_delete(key.hash64(), old)
    }

    /// Returns the existing value for `key` if present; otherwise stores
    /// `value` and returns it. The boolean is true when the value was
    /// loaded, false when it was stored. Among concurrent callers on an
    /// empty entry exactly one stores.
    pub fn load_or_store(&self, key: &K, value: V) -> (V, bool)
    where
        V: Clone,
    {
        self.list.load_or_store(key.hash64(), value)
    }

    /// Calls `f` with each entry's hash and value in ascending hash order,
    /// stopping when `f` returns false.
    ///
    /// There is no snapshot: entries inserted or deleted while the walk runs
    /// may or may not be observed.
    pub fn range<F>(&self, f: F)
    where
        F: FnMut(u64, &V) -> bool,
    {
        self.list.range(f)
    }

    /// Counts the entries with a full walk. O(n), eventually consistent.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Reports whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Deletes every entry at once.
    ///
    /// Stores racing with `clear` may land on either side of the cut.
    pub fn clear(&self) {
        self.list.clear()
    }

    /// The configured maximum tower height.
    pub fn max_level(&self) -> usize {
        self.list.max_level()
    }
}

impl<K, V> Default for SkipMap<K, V>
where
    K: HashKey + ?Sized,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_keys_share_entries_with_str() {
        let map: SkipMap<str, u32> = SkipMap::new(8);
        map.store("alpha", 1);
        assert_eq!(map.load("alpha"), Some(1));
        assert_eq!(map.delete("alpha"), Some(1));
        assert!(map.is_empty());
    }

    #[test]
    fn integer_keys_iterate_in_numeric_order() {
        let map: SkipMap<u64, u32> = SkipMap::default();
        for k in [5u64, 1, 9, 3] {
            map.store(&k, k as u32);
        }
        let mut keys = Vec::new();
        map.range(|h, _| {
            keys.push(h);
            true
        });
        assert_eq!(keys, vec![1, 3, 5, 9]);
    }

    #[test]
    #[should_panic(expected = "max level")]
    fn zero_max_level_panics() {
        let _: SkipMap<u64, u32> = SkipMap::new(0);
    }
}
