//! A chained hash table keyed by caller-supplied handles.
//!
//! Keys are compared and hashed with the [`KeyOps`] given at construction
//! rather than through `Eq`/`Hash`, so the same key type can be indexed in
//! different ways by different tables.  Collisions are resolved by chaining:
//! every bucket holds a singly-linked list of boxed entries.
//!
//! The bucket count is always prime.  Growth and shrinkage happen lazily, on
//! the mutating call that crosses a load-factor threshold:
//!
//! - [`HashTable::put`] grows to `next_prime(2 * capacity)` when the load
//!   factor exceeds [`GROW_THRESHOLD`].
//! - [`HashTable::remove`] shrinks to `next_prime(capacity / 2)` when the load
//!   factor drops below [`SHRINK_THRESHOLD`], as long as the halved capacity
//!   stays at or above [`INITIAL_CAPACITY`].
//!
//! A resize relinks the existing entries into the new bucket array; no entry
//! is copied or reallocated.

use std::{
    fmt::{self, Debug},
    mem,
};

use crate::{
    error::HashTableError,
    key_ops::{CompareFn, HashFn, KeyOps},
    prime::next_prime,
    tracing_support::{debug, warn},
};

pub use self::iter::{Iter, IterMut, Keys};

mod iter;

/// Base capacity of a new table.  The actual capacity is the next prime, 17.
pub const INITIAL_CAPACITY: usize = 16;

/// Load factor above which `put` grows the table.
pub const GROW_THRESHOLD: f64 = 0.7;

/// Load factor below which `remove` shrinks the table.
pub const SHRINK_THRESHOLD: f64 = 0.2;

/// Load factor up to which `put` keeps inserting after a failed growth.
pub const GROW_FAILURE_TOLERANCE: f64 = 1.0;

type Link<K, V> = Option<Box<Entry<K, V>>>;

struct Entry<K, V> {
    key: K,
    value: V,
    next: Link<K, V>,
}

/// A chained hash map with prime capacity.  See the [module
/// documentation](self) for the resize policy.
pub struct HashTable<K, V> {
    buckets: Vec<Link<K, V>>,
    size: usize,
    ops: KeyOps<K>,
}

impl<K: Debug, V: Debug> Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
thread_local! {
    static BUCKET_LIMIT: std::cell::Cell<Option<usize>> = const { std::cell::Cell::new(None) };
}

/// Makes every bucket array larger than `max` buckets fail to allocate on the
/// current thread until the returned guard is dropped.
#[cfg(test)]
pub(crate) fn limit_bucket_allocations(max: usize) -> BucketLimitGuard {
    BUCKET_LIMIT.with(|limit| limit.set(Some(max)));
    BucketLimitGuard
}

#[cfg(test)]
pub(crate) struct BucketLimitGuard;

#[cfg(test)]
impl Drop for BucketLimitGuard {
    fn drop(&mut self) {
        BUCKET_LIMIT.with(|limit| limit.set(None));
    }
}

/// Allocates `capacity` empty buckets, reporting allocation failure instead of
/// aborting.
fn allocate_buckets<K, V>(capacity: usize) -> Result<Vec<Link<K, V>>, HashTableError> {
    #[cfg(test)]
    {
        if BUCKET_LIMIT.with(|limit| limit.get().is_some_and(|max| capacity > max)) {
            return Err(HashTableError::OutOfMemory {
                requested: capacity,
            });
        }
    }

    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(capacity)
        .map_err(|_| HashTableError::OutOfMemory {
            requested: capacity,
        })?;
    buckets.resize_with(capacity, || None);
    Ok(buckets)
}

/// Collects exactly `len` items into a vector allocated up front.
pub(crate) fn collect_exact<T>(
    items: impl IntoIterator<Item = T>,
    len: usize,
) -> Result<Vec<T>, HashTableError> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| HashTableError::OutOfMemory { requested: len })?;
    out.extend(items);
    debug_assert_eq!(out.len(), len);
    Ok(out)
}

impl<K, V> HashTable<K, V> {
    /// Creates an empty table with capacity `next_prime(INITIAL_CAPACITY)`.
    pub fn new(compare: CompareFn<K>, hash: HashFn<K>) -> Result<Self, HashTableError> {
        Self::with_ops(KeyOps::new(compare, hash))
    }

    pub fn with_ops(ops: KeyOps<K>) -> Result<Self, HashTableError> {
        Self::with_capacity(ops, INITIAL_CAPACITY)
    }

    /// Creates an empty table whose capacity is the next prime above
    /// `base_capacity`, or above [`INITIAL_CAPACITY`] if that is larger.
    pub fn with_capacity(ops: KeyOps<K>, base_capacity: usize) -> Result<Self, HashTableError> {
        let capacity = next_prime(base_capacity.max(INITIAL_CAPACITY));
        Ok(Self {
            buckets: allocate_buckets(capacity)?,
            size: 0,
            ops,
        })
    }

    pub fn ops(&self) -> KeyOps<K> {
        self.ops
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of buckets.  Always prime.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    fn bucket_index(&self, key: &K) -> usize {
        (self.ops.hash(key) % self.capacity() as u64) as usize
    }

    fn find(&self, key: &K) -> Option<&Entry<K, V>> {
        let mut cursor = self.buckets[self.bucket_index(key)].as_deref();
        while let Some(entry) = cursor {
            if self.ops.equals(&entry.key, key) {
                return Some(entry);
            }
            cursor = entry.next.as_deref();
        }
        None
    }

    fn find_mut(&mut self, key: &K) -> Option<&mut Entry<K, V>> {
        let index = self.bucket_index(key);
        let ops = self.ops;
        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(entry) = cursor {
            if ops.equals(&entry.key, key) {
                return Some(entry);
            }
            cursor = entry.next.as_deref_mut();
        }
        None
    }

    /// Inserts `value` under `key`.  If an equal key is already present its
    /// value is replaced and the old value returned; the stored key is kept.
    ///
    /// Fails only if the table is past [`GROW_FAILURE_TOLERANCE`] and cannot
    /// grow, in which case the table is left unchanged.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, HashTableError> {
        if let Some(entry) = self.find_mut(&key) {
            return Ok(Some(mem::replace(&mut entry.value, value)));
        }

        if self.load_factor() > GROW_THRESHOLD {
            let new_capacity = next_prime(2 * self.capacity());
            if let Err(err) = self.resize(new_capacity) {
                if self.load_factor() > GROW_FAILURE_TOLERANCE {
                    return Err(err);
                }
                warn!(
                    size = self.size,
                    capacity = self.capacity(),
                    "hash table growth failed; inserting at elevated load factor"
                );
            }
        }

        let index = self.bucket_index(&key);
        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Entry { key, value, next }));
        self.size += 1;
        Ok(None)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_mut(key).map(|entry| &mut entry.value)
    }

    /// Gets the stored key equal to `key` together with its value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find(key).map(|entry| (&entry.key, &entry.value))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Replaces the value of an existing key, returning the old value.  Does
    /// nothing if the key is absent.
    pub fn replace(&mut self, key: &K, value: V) -> Option<V> {
        self.find_mut(key)
            .map(|entry| mem::replace(&mut entry.value, value))
    }

    /// Removes the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key`, returning the stored key and its value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.bucket_index(key);

        // Rebuild the chain without the matching entry.  Chain order is not
        // significant.
        let mut chain = self.buckets[index].take();
        let mut kept: Link<K, V> = None;
        let mut removed = None;
        while let Some(mut entry) = chain {
            chain = entry.next.take();
            if removed.is_none() && self.ops.equals(&entry.key, key) {
                removed = Some(entry);
            } else {
                entry.next = kept;
                kept = Some(entry);
            }
        }
        self.buckets[index] = kept;

        let removed = removed?;
        self.size -= 1;

        let half = self.capacity() / 2;
        if self.load_factor() < SHRINK_THRESHOLD && half >= INITIAL_CAPACITY {
            // A failed shrink only leaves the table sparser than intended.
            let _ = self.resize(next_prime(half));
        }

        let Entry { key, value, .. } = *removed;
        Some((key, value))
    }

    /// Moves every entry into a new bucket array of `new_capacity` buckets.
    fn resize(&mut self, new_capacity: usize) -> Result<(), HashTableError> {
        let new_buckets = allocate_buckets(new_capacity)?;
        let old_buckets = mem::replace(&mut self.buckets, new_buckets);
        debug!(
            size = self.size,
            old_capacity = old_buckets.len(),
            new_capacity,
            "resizing hash table"
        );
        for mut chain in old_buckets {
            while let Some(mut entry) = chain {
                chain = entry.next.take();
                let index = self.bucket_index(&entry.key);
                entry.next = self.buckets[index].take();
                self.buckets[index] = Some(entry);
            }
        }
        Ok(())
    }

    /// Drops every entry.  The bucket array keeps its capacity.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            // Unlink iteratively so long chains don't recurse in `Drop`.
            let mut chain = bucket.take();
            while let Some(mut entry) = chain {
                chain = entry.next.take();
            }
        }
        self.size = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.buckets, self.size)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.buckets, self.size)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns every key in bucket-traversal order.  The vector belongs to the
    /// caller; the keys remain owned by the table.
    pub fn keyset(&self) -> Result<Vec<&K>, HashTableError> {
        collect_exact(self.keys(), self.size)
    }

    /// Returns every value in bucket-traversal order.
    pub fn values(&self) -> Result<Vec<&V>, HashTableError> {
        collect_exact(self.iter().map(|(_, value)| value), self.size)
    }

    /// Applies `f` to every entry.
    pub fn map(&self, mut f: impl FnMut(&K, &V)) {
        for (key, value) in self.iter() {
            f(key, value);
        }
    }

    /// Returns true if both tables have the same keys (according to this
    /// table's key ops) and `value_eq` holds for every pair of values.
    pub fn equals(&self, other: &HashTable<K, V>, value_eq: impl Fn(&V, &V) -> bool) -> bool {
        self.size == other.size
            && self.iter().all(|(key, value)| {
                other
                    .get(key)
                    .is_some_and(|other_value| value_eq(value, other_value))
            })
    }

    /// Puts every entry of `source` into this table.  Values from `source`
    /// win on conflicting keys.
    pub fn merge(&mut self, source: &HashTable<K, V>) -> Result<(), HashTableError>
    where
        K: Clone,
        V: Clone,
    {
        for (key, value) in source.iter() {
            self.put(key.clone(), value.clone())?;
        }
        Ok(())
    }

    /// Creates a new table with the same key ops and entries.
    pub fn copy(&self) -> Result<Self, HashTableError>
    where
        K: Clone,
        V: Clone,
    {
        let mut copy = Self::with_ops(self.ops)?;
        copy.merge(self)?;
        Ok(copy)
    }
}

impl<K, V> Drop for HashTable<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, K, V> IntoIterator for &'a HashTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut HashTable<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
