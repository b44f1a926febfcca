//! # Recency Store
//!
//! A bounded ordered map where order means recency: the oldest entry sits at
//! the front, the most recently touched entry at the back.
//!
//! Both trackers in pagemark are instances of this one type:
//! - document positions (`RecencyStore<String, PositionEntry>`, capacity 100)
//! - recent folders (`RecencyStore<String, ()>`, capacity 10)
//!
//! ## Touch Semantics
//!
//! [`RecencyStore::touch`] is insert-or-update-and-promote. Re-touching a key
//! refreshes its position, so eviction is true LRU-by-last-touch: the documents
//! that survive are the ones most recently *viewed*, not most recently first
//! opened.
//!
//! ## Layout
//!
//! Entries live in a slot arena linked as a doubly-linked list, with a
//! `HashMap` from key to slot. Touch, evict and remove are all O(1); freed
//! slots are recycled so a long session never grows the arena past
//! `capacity + 1` slots.

use crate::error::{PagemarkError, Result};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Clone)]
pub struct RecencyStore<K, V> {
    capacity: usize,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    index: HashMap<K, usize>,
    /// Oldest entry.
    head: Option<usize>,
    /// Newest entry.
    tail: Option<usize>,
}

impl<K, V> RecencyStore<K, V> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Entries in recency order, oldest first. Reverse it for most-recent-first.
    pub fn entries(&self) -> Iter<'_, K, V> {
        Iter {
            store: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.entries().map(|(k, _)| k)
    }

    pub fn oldest(&self) -> Option<(&K, &V)> {
        self.head.map(|idx| {
            let node = self.node(idx);
            (&node.key, &node.value)
        })
    }

    pub fn newest(&self) -> Option<(&K, &V)> {
        self.tail.map(|idx| {
            let node = self.node(idx);
            (&node.key, &node.value)
        })
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        self.slots[idx]
            .as_ref()
            .expect("linked slot must be occupied")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        self.slots[idx]
            .as_mut()
            .expect("linked slot must be occupied")
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let node = self.node_mut(idx);
        node.prev = None;
        node.next = None;
    }

    fn link_newest(&mut self, idx: usize) {
        let tail = self.tail;
        {
            let node = self.node_mut(idx);
            node.prev = tail;
            node.next = None;
        }
        match tail {
            Some(t) => self.node_mut(t).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Detach a slot from the list and hand its node back.
    fn release(&mut self, idx: usize) -> Option<Node<K, V>> {
        self.unlink(idx);
        let node = self.slots[idx].take()?;
        self.free.push(idx);
        Some(node)
    }
}

impl<K: Hash + Eq + Clone, V> RecencyStore<K, V> {
    /// Create an empty store. A capacity of zero is a configuration error.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PagemarkError::Configuration(
                "recency store capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            capacity,
            slots: Vec::with_capacity(capacity + 1),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity + 1),
            head: None,
            tail: None,
        })
    }

    /// Insert or replace `key`, making it the newest entry.
    ///
    /// When a new key pushes the size past capacity the single oldest entry is
    /// evicted and returned. Re-touching an existing key never evicts.
    pub fn touch(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            self.unlink(idx);
            self.node_mut(idx).value = value;
            self.link_newest(idx);
            return None;
        }

        let idx = self.alloc(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.index.insert(key, idx);
        self.link_newest(idx);

        if self.index.len() > self.capacity {
            self.pop_oldest()
        } else {
            None
        }
    }

    /// Read without changing order.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&idx| &self.node(idx).value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.release(idx).map(|node| node.value)
    }

    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let idx = self.head?;
        let node = self.release(idx)?;
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RecencyStore<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity
            && self.len() == other.len()
            && self.entries().eq(other.entries())
    }
}

impl<K: Eq, V: Eq> Eq for RecencyStore<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RecencyStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a RecencyStore<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// Recency-ordered iterator over a [`RecencyStore`].
pub struct Iter<'a, K, V> {
    store: &'a RecencyStore<K, V>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.store.node(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.store.node(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(store: &RecencyStore<String, u32>) -> Vec<&str> {
        store.keys().map(String::as_str).collect()
    }

    #[test]
    fn zero_capacity_is_a_configuration_error() {
        let result = RecencyStore::<String, ()>::new(0);
        assert!(matches!(result, Err(PagemarkError::Configuration(_))));
    }

    #[test]
    fn touch_appends_in_recency_order() {
        let mut store = RecencyStore::new(3).unwrap();
        store.touch("a".to_string(), 1);
        store.touch("b".to_string(), 2);

        assert_eq!(keys(&store), vec!["a", "b"]);
        assert_eq!(store.oldest(), Some((&"a".to_string(), &1)));
        assert_eq!(store.newest(), Some((&"b".to_string(), &2)));
    }

    #[test]
    fn retouch_moves_to_newest_without_growing() {
        let mut store = RecencyStore::new(5).unwrap();
        for (i, key) in ["a", "b", "c"].iter().enumerate() {
            store.touch(key.to_string(), i as u32);
        }

        let evicted = store.touch("a".to_string(), 42);

        assert!(evicted.is_none());
        assert_eq!(store.len(), 3);
        assert_eq!(keys(&store), vec!["b", "c", "a"]);
        assert_eq!(store.get("a"), Some(&42));
    }

    #[test]
    fn overflow_evicts_exactly_the_oldest() {
        let mut store = RecencyStore::new(3).unwrap();
        for (i, key) in ["a", "b", "c"].iter().enumerate() {
            store.touch(key.to_string(), i as u32);
        }

        let evicted = store.touch("d".to_string(), 3);

        assert_eq!(evicted, Some(("a".to_string(), 0)));
        assert_eq!(keys(&store), vec!["b", "c", "d"]);
    }

    #[test]
    fn retouch_protects_from_eviction() {
        let mut store = RecencyStore::new(2).unwrap();
        store.touch("a".to_string(), 0);
        store.touch("b".to_string(), 0);
        store.touch("a".to_string(), 1);

        let evicted = store.touch("c".to_string(), 0);

        assert_eq!(evicted.map(|(k, _)| k), Some("b".to_string()));
        assert_eq!(keys(&store), vec!["a", "c"]);
    }

    #[test]
    fn get_does_not_change_order() {
        let mut store = RecencyStore::new(2).unwrap();
        store.touch("a".to_string(), 0);
        store.touch("b".to_string(), 0);

        assert_eq!(store.get("a"), Some(&0));
        store.touch("c".to_string(), 0);

        assert!(!store.contains_key("a"));
    }

    #[test]
    fn remove_unlinks_from_any_position() {
        let mut store = RecencyStore::new(4).unwrap();
        for key in ["a", "b", "c", "d"] {
            store.touch(key.to_string(), 0);
        }

        assert_eq!(store.remove("b"), Some(0));
        assert_eq!(store.remove("b"), None);
        assert_eq!(store.remove("d"), Some(0));
        assert_eq!(keys(&store), vec!["a", "c"]);
        assert_eq!(store.newest().map(|(k, _)| k.as_str()), Some("c"));

        assert_eq!(store.remove("a"), Some(0));
        assert_eq!(store.remove("c"), Some(0));
        assert!(store.is_empty());
        assert!(store.oldest().is_none());
        assert!(store.newest().is_none());
    }

    #[test]
    fn entries_are_restartable_and_reversible() {
        let mut store = RecencyStore::new(3).unwrap();
        for key in ["a", "b", "c"] {
            store.touch(key.to_string(), 0);
        }

        let first: Vec<_> = store.keys().collect();
        let second: Vec<_> = store.keys().collect();
        let reversed: Vec<_> = store.keys().rev().map(String::as_str).collect();

        assert_eq!(first, second);
        assert_eq!(reversed, vec!["c", "b", "a"]);
        assert_eq!(store.entries().len(), 3);
    }

    #[test]
    fn mixed_front_and_back_iteration_meets_in_the_middle() {
        let mut store = RecencyStore::new(3).unwrap();
        for key in ["a", "b", "c"] {
            store.touch(key.to_string(), 0);
        }

        let mut iter = store.keys();
        assert_eq!(iter.next().map(String::as_str), Some("a"));
        assert_eq!(iter.next_back().map(String::as_str), Some("c"));
        assert_eq!(iter.next().map(String::as_str), Some("b"));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn size_never_exceeds_capacity() {
        // Deterministic LCG so the key sequence mixes new keys and re-touches.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for capacity in 1..=12 {
            let mut store: RecencyStore<String, u32> = RecencyStore::new(capacity).unwrap();
            for step in 0..400u32 {
                seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let key = format!("k{}", (seed >> 33) % 20);
                let before = store.len();
                let existed = store.contains_key(key.as_str());
                let oldest = store.oldest().map(|(k, _)| k.clone());

                let evicted = store.touch(key.clone(), step);

                assert!(store.len() <= capacity);
                assert_eq!(store.newest().map(|(k, _)| k), Some(&key));
                if existed {
                    assert_eq!(store.len(), before);
                    assert!(evicted.is_none());
                } else if before == capacity {
                    assert_eq!(evicted.map(|(k, _)| k), oldest);
                    assert_eq!(store.len(), capacity);
                } else {
                    assert!(evicted.is_none());
                    assert_eq!(store.len(), before + 1);
                }
            }
        }
    }

    #[test]
    fn arena_recycles_freed_slots() {
        let mut store = RecencyStore::new(2).unwrap();
        for i in 0..50u32 {
            store.touch(format!("doc{}", i), i);
        }
        assert_eq!(store.len(), 2);
        assert!(store.slots.len() <= 3);
    }

    #[test]
    fn hundred_documents_then_retouch_first() {
        let mut store = RecencyStore::new(100).unwrap();
        for i in 0..100u32 {
            store.touch(format!("/docs/{}.pdf", i), i);
        }

        store.touch("/docs/0.pdf".to_string(), 5);

        assert_eq!(store.len(), 100);
        assert_eq!(store.get("/docs/0.pdf"), Some(&5));
        assert_eq!(store.newest().map(|(k, _)| k.as_str()), Some("/docs/0.pdf"));
    }

    #[test]
    fn hundred_fifty_documents_keep_the_newest_hundred() {
        let mut store = RecencyStore::new(100).unwrap();
        for i in 0..150u32 {
            store.touch(format!("/docs/{}.pdf", i), i);
        }

        assert_eq!(store.len(), 100);
        for i in 0..50 {
            assert!(!store.contains_key(format!("/docs/{}.pdf", i).as_str()));
        }
        for i in 100..150 {
            assert!(store.contains_key(format!("/docs/{}.pdf", i).as_str()));
        }
    }

    #[test]
    fn equality_follows_order() {
        let mut left = RecencyStore::new(3).unwrap();
        let mut right = RecencyStore::new(3).unwrap();
        left.touch("a".to_string(), 0);
        left.touch("b".to_string(), 0);
        right.touch("b".to_string(), 0);
        right.touch("a".to_string(), 0);

        assert_ne!(left, right);
        right.touch("b".to_string(), 0);
        assert_eq!(left, right);
    }
}
