//! Collection seams used by set and map patches.
//!
//! Patches never depend on a concrete collection. Anything that can test
//! membership, insert, remove and fold over its contents can be diffed and
//! patched. Implementations are provided for the persistent collections in
//! [`im`] (where cloning a snapshot is O(1) and structure is shared) and for
//! the standard library collections.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{BuildHasher, Hash};

/// An unordered collection of distinct elements.
pub trait SetSnapshot: Clone {
    type Elem;

    /// Returns `true` if `elem` is a member.
    fn has(&self, elem: &Self::Elem) -> bool;

    /// Insert `elem`. Returns `true` if it was not already a member.
    fn add(&mut self, elem: Self::Elem) -> bool;

    /// Remove `elem`. Returns `true` if it was a member.
    fn remove(&mut self, elem: &Self::Elem) -> bool;

    /// Fold over every element in unspecified order.
    fn fold<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, &Self::Elem) -> A;

    /// Number of elements.
    fn size(&self) -> usize;
}

/// A collection of key-value entries with distinct keys.
pub trait MapSnapshot: Clone {
    type Key;
    type Value;

    /// The value stored under `key`, if any.
    fn lookup(&self, key: &Self::Key) -> Option<&Self::Value>;

    /// Store `value` under `key`, returning the value it replaced.
    fn set(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    /// Remove `key`, returning its value if it was present.
    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Fold over every entry in unspecified order.
    fn fold<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, &Self::Key, &Self::Value) -> A;

    /// Number of entries.
    fn size(&self) -> usize;

    /// Returns `true` if `key` is present.
    fn has(&self, key: &Self::Key) -> bool {
        self.lookup(key).is_some()
    }
}

// ---------------------------------------------------------------
// im
// ---------------------------------------------------------------

impl<A, S> SetSnapshot for im::HashSet<A, S>
where
    A: Hash + Eq + Clone,
    S: BuildHasher,
{
    type Elem = A;

    fn has(&self, elem: &A) -> bool {
        self.contains(elem)
    }

    fn add(&mut self, elem: A) -> bool {
        self.insert(elem).is_none()
    }

    fn remove(&mut self, elem: &A) -> bool {
        im::HashSet::remove(self, elem).is_some()
    }

    fn fold<B, F>(&self, init: B, f: F) -> B
    where
        F: FnMut(B, &A) -> B,
    {
        self.iter().fold(init, f)
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<A> SetSnapshot for im::OrdSet<A>
where
    A: Ord + Clone,
{
    type Elem = A;

    fn has(&self, elem: &A) -> bool {
        self.contains(elem)
    }

    fn add(&mut self, elem: A) -> bool {
        self.insert(elem).is_none()
    }

    fn remove(&mut self, elem: &A) -> bool {
        im::OrdSet::remove(self, elem).is_some()
    }

    fn fold<B, F>(&self, init: B, f: F) -> B
    where
        F: FnMut(B, &A) -> B,
    {
        self.iter().fold(init, f)
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> MapSnapshot for im::HashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn set(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        im::HashMap::remove(self, key)
    }

    fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter().fold(init, |acc, (k, v)| f(acc, k, v))
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<K, V> MapSnapshot for im::OrdMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn set(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        im::OrdMap::remove(self, key)
    }

    fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter().fold(init, |acc, (k, v)| f(acc, k, v))
    }

    fn size(&self) -> usize {
        self.len()
    }
}

// ---------------------------------------------------------------
// std
// ---------------------------------------------------------------

impl<A, S> SetSnapshot for std::collections::HashSet<A, S>
where
    A: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    type Elem = A;

    fn has(&self, elem: &A) -> bool {
        self.contains(elem)
    }

    fn add(&mut self, elem: A) -> bool {
        self.insert(elem)
    }

    fn remove(&mut self, elem: &A) -> bool {
        std::collections::HashSet::remove(self, elem)
    }

    fn fold<B, F>(&self, init: B, f: F) -> B
    where
        F: FnMut(B, &A) -> B,
    {
        self.iter().fold(init, f)
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<A> SetSnapshot for BTreeSet<A>
where
    A: Ord + Clone,
{
    type Elem = A;

    fn has(&self, elem: &A) -> bool {
        self.contains(elem)
    }

    fn add(&mut self, elem: A) -> bool {
        self.insert(elem)
    }

    fn remove(&mut self, elem: &A) -> bool {
        BTreeSet::remove(self, elem)
    }

    fn fold<B, F>(&self, init: B, f: F) -> B
    where
        F: FnMut(B, &A) -> B,
    {
        self.iter().fold(init, f)
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> MapSnapshot for std::collections::HashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn set(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        std::collections::HashMap::remove(self, key)
    }

    fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter().fold(init, |acc, (k, v)| f(acc, k, v))
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<K, V> MapSnapshot for BTreeMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn set(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        BTreeMap::remove(self, key)
    }

    fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter().fold(init, |acc, (k, v)| f(acc, k, v))
    }

    fn size(&self) -> usize {
        self.len()
    }
}
