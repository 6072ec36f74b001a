//! A set of instruction pointers with constant-time clearing.
//! See https://research.swtch.com/sparse

/// A set of IPs below a fixed capacity, iterated in insertion order.
/// An IP is in the set iff sparse[ip] < len && dense[sparse[ip]] == ip.
#[derive(Debug, Clone)]
pub struct SparseSet {
    len: usize,
    dense: Vec<usize>,
    sparse: Vec<usize>,
}

impl SparseSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            len: 0,
            dense: vec![0; capacity],
            sparse: vec![0; capacity],
        }
    }

    /// Grow or shrink to a new capacity. This clears the set.
    pub fn resize(&mut self, capacity: usize) {
        self.clear();
        self.dense.resize(capacity, 0);
        self.sparse.resize(capacity, 0);
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert an IP, returning false if it was already present.
    #[inline]
    pub fn insert(&mut self, ip: usize) -> bool {
        if self.contains(ip) {
            return false;
        }
        debug_assert!(self.len < self.capacity(), "SparseSet overflow");
        self.dense[self.len] = ip;
        self.sparse[ip] = self.len;
        self.len += 1;
        true
    }

    #[inline]
    pub fn contains(&self, ip: usize) -> bool {
        let idx = self.sparse[ip];
        idx < self.len && self.dense[idx] == ip
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// \return the IP inserted at position \p idx.
    #[inline]
    pub fn get(&self, idx: usize) -> usize {
        debug_assert!(idx < self.len);
        self.dense[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.dense[..self.len].iter().copied()
    }
}
