use std::{
    cmp::Ordering,
    hash::{DefaultHasher, Hash, Hasher},
};

use derivative::Derivative;

/// Caller-supplied comparison function.  Keys are equal when it returns
/// [`Ordering::Equal`]; undirected graphs also use it as a total order.
pub type CompareFn<K> = fn(&K, &K) -> Ordering;

/// Caller-supplied hash function.
pub type HashFn<K> = fn(&K) -> u64;

/// The `{compare, hash}` capability pair a [`HashTable`](crate::HashTable)
/// or [`Graph`](crate::Graph) is built with.
///
/// The two functions must agree: keys that compare equal must hash equally.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Copy(bound = ""), Debug(bound = ""))]
pub struct KeyOps<K> {
    #[derivative(Debug = "ignore")]
    compare: CompareFn<K>,
    #[derivative(Debug = "ignore")]
    hash: HashFn<K>,
}

impl<K> KeyOps<K> {
    pub fn new(compare: CompareFn<K>, hash: HashFn<K>) -> Self {
        Self { compare, hash }
    }

    /// Key ops derived from `K`'s own `Ord` and `Hash` implementations.
    pub fn natural() -> Self
    where
        K: Ord + Hash,
    {
        Self::new(K::cmp, default_hash::<K>)
    }

    pub fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.compare)(a, b)
    }

    pub fn equals(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    pub fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }
}

/// Hashes a key with the standard library's default hasher.
pub fn default_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}
