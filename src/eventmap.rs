use crate::event::Event;
use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::iter::{Iter, RangeIter};
use crate::node::Node;
use std::cmp::Ordering;

/// An AVL tree indexing events by start time, which supports point lookup by
/// id and range query over start times.
#[derive(Debug)]
pub struct EventMap<T, Ix = DefaultIx> {
    /// Vector that stores nodes
    pub(crate) nodes: Vec<Node<T, Ix>>,
    /// Root of the tree
    pub(crate) root: NodeIndex<Ix>,
    /// Slots of removed nodes, recycled on insert
    free: Vec<NodeIndex<Ix>>,
    /// Number of events in the map
    len: usize,
}

impl<T, Ix> EventMap<T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Creates a new `EventMap` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = vec![Self::new_sentinel()];
        nodes.reserve(capacity);
        EventMap {
            nodes,
            root: Self::sentinel(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Insert an event into the map.
    ///
    /// Events with equal start times are kept; id uniqueness is a
    /// precondition enforced by the caller, not here.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    ///
    /// # Example
    /// ```rust
    /// use avl_event_map::{Event, EventMap};
    ///
    /// let mut map = EventMap::new();
    /// map.insert(Event::new(1, 10, 20, "standup"));
    /// map.insert(Event::new(2, 5, 8, "prep"));
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    pub fn insert(&mut self, event: Event<T>) {
        let z = self.new_node(event);
        self.root = self.insert_at(self.root, z);
        self.len = self.len.wrapping_add(1);
    }

    /// Remove the event whose start time equals the given key, returning it
    /// if one was found. Removing an absent key is a no-op.
    ///
    /// When several events share the start time, the one reached first by
    /// the key descent is removed.
    ///
    /// # Example
    /// ```rust
    /// use avl_event_map::{Event, EventMap};
    ///
    /// let mut map = EventMap::new();
    /// map.insert(Event::new(1, 10, 20, "standup"));
    /// assert_eq!(map.remove_by_start(&7), None);
    /// assert_eq!(map.remove_by_start(&10).map(|e| e.id), Some(1));
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub fn remove_by_start(&mut self, start: &T) -> Option<Event<T>> {
        let (new_root, removed) = self.remove_at(self.root, start);
        self.root = new_root;
        let idx = removed?;
        self.len = self.len.wrapping_sub(1);
        let event = self.node_mut(idx, Node::take_event);
        self.free.push(idx);
        Some(event)
    }

    /// Return a reference to the event with the given id.
    ///
    /// The tree is ordered by start time, not id, so this is a full
    /// left-first traversal with `O(n)` time complexity.
    ///
    /// # Example
    /// ```rust
    /// use avl_event_map::{Event, EventMap};
    ///
    /// let mut map = EventMap::new();
    /// map.insert(Event::new(1, 10, 20, "standup"));
    /// assert_eq!(map.get_by_id(1).map(|e| e.name.as_str()), Some("standup"));
    /// assert_eq!(map.get_by_id(2), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn get_by_id(&self, id: u64) -> Option<&Event<T>> {
        self.get_by_id_at(self.root, id)
    }

    /// Collect all events whose start time lies in `[lo, hi]` inclusive.
    ///
    /// Results come back in traversal order, which is not sorted; callers
    /// that need an ordering must sort, or use [`EventMap::range_iter`].
    ///
    /// # Example
    /// ```rust
    /// use avl_event_map::{Event, EventMap};
    ///
    /// let mut map = EventMap::new();
    /// map.insert(Event::new(1, 10, 20, "standup"));
    /// map.insert(Event::new(2, 5, 8, "prep"));
    /// map.insert(Event::new(3, 30, 40, "retro"));
    /// assert_eq!(map.range_search(&0, &15).len(), 2);
    /// assert_eq!(map.range_search(&11, &12).len(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub fn range_search(&self, lo: &T, hi: &T) -> Vec<&Event<T>> {
        let mut results = Vec::new();
        self.range_search_at(self.root, lo, hi, &mut results);
        results
    }

    /// Get an iterator over the events of the map, sorted by start time.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, Ix> {
        Iter::new(self)
    }

    /// Get an iterator over the events with start time in `[lo, hi]`
    /// inclusive, sorted by start time.
    #[inline]
    #[must_use]
    pub fn range_iter<'a>(&'a self, lo: &'a T, hi: &'a T) -> RangeIter<'a, T, Ix> {
        RangeIter::new(self, lo, hi)
    }

    /// Remove all events from the map
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Self::new_sentinel());
        self.root = Self::sentinel();
        self.free.clear();
        self.len = 0;
    }

    /// Return the number of events in the map.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` if the map contains no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the height of the tree; an empty tree has height 0.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.node_ref(self.root, Node::height)
    }
}

impl<T> EventMap<T>
where
    T: Ord,
{
    /// Create an empty `EventMap`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Self::new_sentinel()],
            root: Self::sentinel(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Default for EventMap<T>
where
    T: Ord,
{
    #[inline]
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T, Ix> EventMap<T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Create a new sentinel node
    fn new_sentinel() -> Node<T, Ix> {
        Node {
            left: None,
            right: None,
            height: 0,
            event: None,
        }
    }

    /// Allocate a new leaf node, recycling a freed slot when one exists
    fn new_node(&mut self, event: Event<T>) -> NodeIndex<Ix> {
        let node = Node {
            left: Some(Self::sentinel()),
            right: Some(Self::sentinel()),
            height: 1,
            event: Some(event),
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx.index()] = node;
            return idx;
        }
        let idx = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != idx,
            "Reached maximum number of nodes"
        );
        self.nodes.push(node);
        idx
    }

    /// Get the sentinel node index
    fn sentinel() -> NodeIndex<Ix> {
        NodeIndex::new(0)
    }
}

impl<T, Ix> EventMap<T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Insert node `z` into the subtree rooted at `x`, returning the new
    /// subtree root. Equal start times descend right, so events inserted
    /// later under the same key end up after earlier ones.
    fn insert_at(&mut self, x: NodeIndex<Ix>, z: NodeIndex<Ix>) -> NodeIndex<Ix> {
        if self.node_ref(x, Node::is_sentinel) {
            return z;
        }
        if self.start_lt(z, x) {
            let new_left = self.insert_at(self.node_ref(x, Node::left), z);
            self.node_mut(x, Node::set_left(new_left));
        } else {
            let new_right = self.insert_at(self.node_ref(x, Node::right), z);
            self.node_mut(x, Node::set_right(new_right));
        }
        self.update_height(x);
        self.rebalance_after_insert(x, z)
    }

    /// Restore the AVL balance at `x` on the way back up an insertion,
    /// choosing the rotation by comparing the inserted key with the
    /// children's keys. An inserted key equal to a child's descended right
    /// of it, so ties take the right-leaning case.
    fn rebalance_after_insert(&mut self, x: NodeIndex<Ix>, z: NodeIndex<Ix>) -> NodeIndex<Ix> {
        let balance = self.balance(x);
        if balance > 1 {
            let l = self.node_ref(x, Node::left);
            if self.start_lt(z, l) {
                return self.rotate_right(x);
            }
            let new_left = self.rotate_left(l);
            self.node_mut(x, Node::set_left(new_left));
            return self.rotate_right(x);
        }
        if balance < -1 {
            let r = self.node_ref(x, Node::right);
            if self.start_lt(z, r) {
                let new_right = self.rotate_right(r);
                self.node_mut(x, Node::set_right(new_right));
                return self.rotate_left(x);
            }
            return self.rotate_left(x);
        }
        x
    }

    /// Remove the node keyed `start` from the subtree rooted at `x`.
    ///
    /// Returns the new subtree root and the arena slot that was spliced out
    /// of the tree, if any. For a node with two children the in-order
    /// successor's payload is lifted into its slot and the successor's
    /// original position is the one physically removed.
    fn remove_at(
        &mut self,
        x: NodeIndex<Ix>,
        start: &T,
    ) -> (NodeIndex<Ix>, Option<NodeIndex<Ix>>) {
        if self.node_ref(x, Node::is_sentinel) {
            return (x, None);
        }
        let removed;
        match start.cmp(self.node_ref(x, Node::start)) {
            Ordering::Less => {
                let (new_left, r) = self.remove_at(self.node_ref(x, Node::left), start);
                self.node_mut(x, Node::set_left(new_left));
                removed = r;
            }
            Ordering::Greater => {
                let (new_right, r) = self.remove_at(self.node_ref(x, Node::right), start);
                self.node_mut(x, Node::set_right(new_right));
                removed = r;
            }
            Ordering::Equal => {
                let left = self.node_ref(x, Node::left);
                let right = self.node_ref(x, Node::right);
                if self.node_ref(left, Node::is_sentinel) {
                    return (right, Some(x));
                }
                if self.node_ref(right, Node::is_sentinel) {
                    return (left, Some(x));
                }
                let (new_right, succ) = self.remove_min(right);
                // the successor slot now carries the removed payload
                self.swap_events(x, succ);
                self.node_mut(x, Node::set_right(new_right));
                removed = Some(succ);
            }
        }
        if removed.is_none() {
            return (x, None);
        }
        self.update_height(x);
        (self.rebalance_after_remove(x), removed)
    }

    /// Splice the leftmost node out of the subtree rooted at `x`, returning
    /// the rebalanced subtree root and the spliced node.
    fn remove_min(&mut self, x: NodeIndex<Ix>) -> (NodeIndex<Ix>, NodeIndex<Ix>) {
        if self.left_ref(x, Node::is_sentinel) {
            return (self.node_ref(x, Node::right), x);
        }
        let (new_left, min) = self.remove_min(self.node_ref(x, Node::left));
        self.node_mut(x, Node::set_left(new_left));
        self.update_height(x);
        (self.rebalance_after_remove(x), min)
    }

    /// Restore the AVL balance at `x` on the way back up a removal. The
    /// removed key is gone, so the rotation is chosen by the child balance
    /// factors instead of a key comparison.
    fn rebalance_after_remove(&mut self, x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        let balance = self.balance(x);
        if balance > 1 {
            let l = self.node_ref(x, Node::left);
            if self.balance(l) >= 0 {
                return self.rotate_right(x);
            }
            let new_left = self.rotate_left(l);
            self.node_mut(x, Node::set_left(new_left));
            return self.rotate_right(x);
        }
        if balance < -1 {
            let r = self.node_ref(x, Node::right);
            if self.balance(r) <= 0 {
                return self.rotate_left(x);
            }
            let new_right = self.rotate_right(r);
            self.node_mut(x, Node::set_right(new_right));
            return self.rotate_left(x);
        }
        x
    }

    /// Unordered left-first search by id.
    fn get_by_id_at(&self, x: NodeIndex<Ix>, id: u64) -> Option<&Event<T>> {
        let node = &self.nodes[x.index()];
        let event = node.event.as_ref()?;
        if event.id == id {
            return Some(event);
        }
        let (left, right) = (node.left(), node.right());
        self.get_by_id_at(left, id)
            .or_else(|| self.get_by_id_at(right, id))
    }

    /// Collect events with start in `[lo, hi]`, pruning subtrees the BST
    /// order proves empty: left only when `start >= lo`, right only when
    /// `start <= hi`. Both bounds stay inclusive because equal starts may
    /// sit on either side of a node after rotations.
    fn range_search_at<'a>(
        &'a self,
        x: NodeIndex<Ix>,
        lo: &T,
        hi: &T,
        results: &mut Vec<&'a Event<T>>,
    ) {
        let node = &self.nodes[x.index()];
        let Some(event) = node.event.as_ref() else {
            return;
        };
        let (left, right) = (node.left(), node.right());
        if lo <= &event.start && &event.start <= hi {
            results.push(event);
        }
        if &event.start >= lo {
            self.range_search_at(left, lo, hi, results);
        }
        if &event.start <= hi {
            self.range_search_at(right, lo, hi, results);
        }
    }

    /// Binary tree left rotate.
    fn rotate_left(&mut self, x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        let y = self.node_ref(x, Node::right);
        let t2 = self.node_ref(y, Node::left);
        self.node_mut(y, Node::set_left(x));
        self.node_mut(x, Node::set_right(t2));
        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Binary tree right rotate.
    fn rotate_right(&mut self, y: NodeIndex<Ix>) -> NodeIndex<Ix> {
        let x = self.node_ref(y, Node::left);
        let t2 = self.node_ref(x, Node::right);
        self.node_mut(x, Node::set_right(y));
        self.node_mut(y, Node::set_left(t2));
        self.update_height(y);
        self.update_height(x);
        x
    }

    /// Recompute the height of `x` from its children.
    fn update_height(&mut self, x: NodeIndex<Ix>) {
        let height = 1 + self
            .left_ref(x, Node::height)
            .max(self.right_ref(x, Node::height));
        self.node_mut(x, Node::set_height(height));
    }

    /// Balance factor of `x`: height(left) - height(right).
    fn balance(&self, x: NodeIndex<Ix>) -> i64 {
        i64::from(self.left_ref(x, Node::height)) - i64::from(self.right_ref(x, Node::height))
    }

    /// Compare two nodes by start time.
    fn start_lt(&self, a: NodeIndex<Ix>, b: NodeIndex<Ix>) -> bool {
        self.nodes[a.index()].start() < self.nodes[b.index()].start()
    }

    /// Swap the event payloads of two distinct arena slots, leaving the
    /// links and heights in place.
    fn swap_events(&mut self, a: NodeIndex<Ix>, b: NodeIndex<Ix>) {
        let (a, b) = (a.index(), b.index());
        debug_assert_ne!(a, b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        std::mem::swap(&mut head[lo].event, &mut tail[0].event);
    }
}

// Convenient methods for reference or mutate current/left/right node
impl<'a, T, Ix> EventMap<T, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, Ix>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    pub(crate) fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, Ix>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }

    pub(crate) fn left_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&self.nodes[idx])
    }

    pub(crate) fn right_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&self.nodes[idx])
    }
}
