//! Indexed binary min-heap with decrease-key
//!
//! Elements live in an array-backed binary tree. Every element is addressed
//! by a `HeapKey` handed out at insertion; a key-to-position table gives O(1)
//! lookup so `decrease` can restore heap order without scanning. Keys of
//! extracted elements go to a free list and are handed out again by later
//! inserts.
//!
//! Misuse is silent: `decrease` with a larger value, or with a key that is not
//! live, does nothing.

/// Stable handle to an element held by an [`IndexedHeap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapKey(usize);

impl HeapKey {
    /// Raw slot number of this key
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct HeapNode<T> {
    element: T,
    key: HeapKey,
}

/// Binary min-heap over comparable elements, addressable by key
#[derive(Debug, Clone)]
pub struct IndexedHeap<T> {
    nodes: Vec<HeapNode<T>>,
    /// Current array position for each key slot, `None` when the slot is free
    positions: Vec<Option<usize>>,
    free_keys: Vec<HeapKey>,
}

impl<T> Default for IndexedHeap<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            positions: Vec::new(),
            free_keys: Vec::new(),
        }
    }
}

impl<T: PartialOrd> IndexedHeap<T> {
    /// Create an empty heap
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty heap with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
            free_keys: Vec::new(),
        }
    }

    /// Number of elements currently held
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether `key` identifies a live element
    pub fn contains(&self, key: HeapKey) -> bool {
        self.position(key).is_some()
    }

    /// Element currently stored under `key`
    pub fn get(&self, key: HeapKey) -> Option<&T> {
        self.position(key).map(|pos| &self.nodes[pos].element)
    }

    /// Insert an element and return its handle.
    ///
    /// The handle is either fresh or recycled from an earlier extraction.
    pub fn insert(&mut self, element: T) -> HeapKey {
        let key = match self.free_keys.pop() {
            Some(key) => key,
            None => {
                self.positions.push(None);
                HeapKey(self.positions.len() - 1)
            }
        };

        let pos = self.nodes.len();
        self.nodes.push(HeapNode { element, key });
        self.positions[key.0] = Some(pos);
        self.sift_up(pos);
        key
    }

    /// Smallest element and its key, without removing it
    pub fn minimum(&self) -> Option<(&T, HeapKey)> {
        self.nodes.first().map(|node| (&node.element, node.key))
    }

    /// Lower the element stored under `key` to `value`.
    ///
    /// Returns false (and leaves the heap untouched) when the key is not
    /// live or `value` is not less than or equal to the current element.
    pub fn decrease(&mut self, key: HeapKey, value: T) -> bool {
        let Some(pos) = self.position(key) else {
            return false;
        };
        if !(value <= self.nodes[pos].element) {
            return false;
        }
        self.nodes[pos].element = value;
        self.sift_up(pos);
        true
    }

    /// Remove and return the smallest element with its key.
    ///
    /// The returned key goes back to the free list and may be reused by a
    /// later `insert`.
    pub fn extract(&mut self) -> Option<(T, HeapKey)> {
        if self.nodes.is_empty() {
            return None;
        }
        let last = self.nodes.len() - 1;
        self.swap(0, last);
        let node = self.nodes.pop()?;
        self.positions[node.key.0] = None;
        self.free_keys.push(node.key);
        if !self.nodes.is_empty() {
            self.sift_down(0);
        }
        Some((node.element, node.key))
    }

    /// Drop every element; all keys become free.
    pub fn clear(&mut self) {
        for node in self.nodes.drain(..) {
            self.positions[node.key.0] = None;
            self.free_keys.push(node.key);
        }
    }

    fn position(&self, key: HeapKey) -> Option<usize> {
        self.positions.get(key.0).copied().flatten()
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.nodes.swap(a, b);
        self.positions[self.nodes[a].key.0] = Some(a);
        self.positions[self.nodes[b].key.0] = Some(b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.nodes[pos].element < self.nodes[parent].element {
                self.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;

            if left < len && self.nodes[left].element < self.nodes[smallest].element {
                smallest = left;
            }
            if right < len && self.nodes[right].element < self.nodes[smallest].element {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }
}
