use std::{iter::FusedIterator, slice};

use super::{Entry, Link};

/// Iterator over the entries of a [`HashTable`](super::HashTable), in
/// bucket-traversal order.
pub struct Iter<'a, K, V> {
    buckets: slice::Iter<'a, Link<K, V>>,
    chain: Option<&'a Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(buckets: &'a [Link<K, V>], len: usize) -> Self {
        Self {
            buckets: buckets.iter(),
            chain: None,
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain {
                self.chain = entry.next.as_deref();
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
            self.chain = self.buckets.next()?.as_deref();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over the entries of a [`HashTable`](super::HashTable) with
/// mutable access to the values.
pub struct IterMut<'a, K, V> {
    buckets: slice::IterMut<'a, Link<K, V>>,
    chain: Option<&'a mut Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(super) fn new(buckets: &'a mut [Link<K, V>], len: usize) -> Self {
        Self {
            buckets: buckets.iter_mut(),
            chain: None,
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.take() {
                let Entry { key, value, next } = entry;
                self.chain = next.as_deref_mut();
                self.remaining -= 1;
                return Some((&*key, value));
            }
            self.chain = self.buckets.next()?.as_deref_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Iterator over the keys of a [`HashTable`](super::HashTable).
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(super) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}
