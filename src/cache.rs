//! A bounded cache of compiled regexes, keyed by pattern and flags.

use crate::api::{Flags, Regex};
use crate::parse::Error;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// The capacity of a cache built with `RegexCache::default()`.
pub const DEFAULT_CAPACITY: usize = 15;

type Key = (Box<str>, Flags);

/// A most-recently-used cache of compiled regexes.
///
/// When full, compiling a new pattern evicts the least recently used entry.
/// A capacity of 0 disables caching: every lookup compiles afresh.
///
/// ```rust
/// use relinear::RegexCache;
/// let mut cache = RegexCache::new(2);
/// let a = cache.get_or_compile(r"\d+", "").unwrap();
/// let b = cache.get_or_compile(r"\d+", "").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Clone)]
pub struct RegexCache {
    capacity: usize,
    map: HashMap<Key, Arc<Regex>>,

    /// Keys from least to most recently used.
    order: VecDeque<Key>,
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RegexCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Change the capacity, evicting the oldest entries if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict_to(capacity);
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    fn evict_to(&mut self, len: usize) {
        while self.order.len() > len {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
    }

    /// Move \p key to the most recently used position.
    fn touch(&mut self, key: &Key) {
        if self.order.back() == Some(key) {
            return;
        }
        if let Some(idx) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(idx) {
                self.order.push_back(k);
            }
        }
    }

    /// Return the cached regex for `pattern` and `flags`, compiling and
    /// caching it if it is not present. Compilation errors are not cached.
    pub fn get_or_compile<F>(&mut self, pattern: &str, flags: F) -> Result<Arc<Regex>, Error>
    where
        F: Into<Flags>,
    {
        let key: Key = (pattern.into(), flags.into());
        if let Some(re) = self.map.get(&key) {
            let re = Arc::clone(re);
            self.touch(&key);
            return Ok(re);
        }
        let re = Arc::new(Regex::with_flags(pattern, key.1)?);
        if self.capacity > 0 {
            self.evict_to(self.capacity - 1);
            self.order.push_back(key.clone());
            self.map.insert(key, Arc::clone(&re));
        }
        Ok(re)
    }
}
