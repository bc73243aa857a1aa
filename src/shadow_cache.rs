use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

// Internal node structure for the doubly linked list
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }
}

// Doubly linked list threaded through a slab of slots. Links are slot
// indices, so a slot index stays valid until its node is removed.
#[derive(Debug)]
struct DoublyLinkedList<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K, V> DoublyLinkedList<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        match self.slots[idx].as_ref() {
            Some(node) => node,
            None => unreachable!("slot {idx} is vacant"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        match self.slots[idx].as_mut() {
            Some(node) => node,
            None => unreachable!("slot {idx} is vacant"),
        }
    }

    // Allocate a slot for a new node and link it at the front
    fn push_front(&mut self, key: K, value: V) -> usize {
        let node = Some(Node::new(key, value));
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = node;
                idx
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        };
        self.link_front(idx);
        idx
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.node_mut(head).prev = Some(idx),
            // Empty list case
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
    }

    // Detach a node from its neighbours, keeping its slot
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node_mut(idx);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }

        self.len -= 1;
    }

    // Remove specified node and release its slot
    fn remove(&mut self, idx: usize) -> Node<K, V> {
        self.unlink(idx);
        let node = match self.slots[idx].take() {
            Some(node) => node,
            None => unreachable!("slot {idx} is vacant"),
        };
        self.free.push(idx);
        node
    }

    // Remove node from the back
    fn pop_back(&mut self) -> Option<Node<K, V>> {
        let tail = self.tail?;
        Some(self.remove(tail))
    }

    // Reinsert node at the front of the list
    fn reinsert_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }
}

/// Iterator over a [`ShadowCache`] from the most to the least recently used entry.
pub struct Iter<'a, K, V> {
    list: &'a DoublyLinkedList<K, V>,
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?);
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}

/// A recency-ordered mirror of a hot subset of the primary store.
///
/// Entries live in a doubly linked list (most recently used at the head)
/// indexed by a `HashMap` from key to list slot, which makes promotion,
/// insertion and eviction O(1). Once `capacity` entries are held, inserting a
/// new key first evicts the tail of the list.
///
/// The cache is not synchronized; [`Storage`](crate::Storage) guards it with a
/// mutex since every lookup reorders the list.
///
/// # Type Parameters
///
/// * `K` - The type of keys. Must implement `Clone + Debug + Hash + Eq`
/// * `V` - The type of the mirrored values. Must implement `Clone`
///
/// # Examples
///
/// ```rust
/// use shadow_store::ShadowCache;
///
/// let mut cache = ShadowCache::new(2);
/// cache.touch_or_insert("a", 1);
/// cache.touch_or_insert("b", 2);
/// assert_eq!(cache.peek_and_promote(&"a"), Some(1));
///
/// // "b" is now the least recently used entry
/// assert_eq!(cache.touch_or_insert("c", 3), Some(("b", 2)));
/// assert!(!cache.contains(&"b"));
/// ```
#[derive(Debug)]
pub struct ShadowCache<K, V> {
    cap: usize,
    list: DoublyLinkedList<K, V>,
    index: HashMap<K, usize>,
}

impl<K, V> ShadowCache<K, V>
where
    K: Clone + Debug + Hash + Eq,
    V: Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// The cache is normally built by [`Storage::new`](crate::Storage::new),
    /// which validates the capacity and reports
    /// [`StorageError::InvalidConfiguration`](crate::StorageError::InvalidConfiguration)
    /// instead of panicking.
    ///
    /// # Panics
    ///
    /// Panics if capacity is 0
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be positive");
        Self {
            cap: capacity,
            list: DoublyLinkedList::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Mirrors `value` under `key` and marks it as most recently used.
    ///
    /// An existing entry is overwritten in place. A new entry evicts the least
    /// recently used one when the cache is full; the evicted pair is returned.
    pub fn touch_or_insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            self.list.node_mut(idx).value = value;
            self.list.reinsert_front(idx);
            return None;
        }

        let evicted = if self.index.len() >= self.cap {
            self.list.pop_back().map(|node| {
                self.index.remove(&node.key);
                (node.key, node.value)
            })
        } else {
            None
        };

        let idx = self.list.push_front(key.clone(), value);
        self.index.insert(key, idx);
        evicted
    }

    /// Returns the mirrored value and marks the entry as most recently used.
    ///
    /// `None` is a plain miss, not an error.
    pub fn peek_and_promote(&mut self, key: &K) -> Option<V> {
        let idx = *self.index.get(key)?;
        self.list.reinsert_front(idx);
        Some(self.list.node(idx).value.clone())
    }

    /// Drops `key` from the cache, returning its mirrored value if it was held.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        Some(self.list.remove(idx).value)
    }

    /// Membership check. Does not affect recency order.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Iterates entries from the most to the least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: &self.list,
            cursor: self.list.head,
        }
    }
}
