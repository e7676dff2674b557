use crate::event::Event;
use crate::eventmap::EventMap;
use crate::index::{IndexType, NodeIndex};
use crate::node::Node;

/// Pushes a link of nodes on the left to stack.
fn left_link<T, Ix>(map_ref: &EventMap<T, Ix>, mut x: NodeIndex<Ix>) -> Vec<NodeIndex<Ix>>
where
    T: Ord,
    Ix: IndexType,
{
    let mut nodes = vec![];
    while !map_ref.node_ref(x, Node::is_sentinel) {
        nodes.push(x);
        x = map_ref.node_ref(x, Node::left);
    }
    nodes
}

/// An iterator over the events of an `EventMap`, sorted by start time.
#[derive(Debug)]
pub struct Iter<'a, T, Ix>
where
    T: Ord,
{
    /// Reference to the map
    map_ref: &'a EventMap<T, Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
}

impl<'a, T, Ix> Iter<'a, T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    pub(crate) fn new(map_ref: &'a EventMap<T, Ix>) -> Self {
        Iter {
            map_ref,
            stack: left_link(map_ref, map_ref.root),
        }
    }
}

impl<'a, T, Ix> Iterator for Iter<'a, T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    type Item = &'a Event<T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        self.stack.extend(left_link(
            self.map_ref,
            self.map_ref.node_ref(x, Node::right),
        ));
        Some(self.map_ref.node_ref(x, Node::event))
    }
}

/// Pushes the link of nodes toward the smallest start time not below `lo`,
/// skipping subtrees the BST order proves out of range.
fn left_link_from<'a, T, Ix>(
    map_ref: &EventMap<T, Ix>,
    mut x: NodeIndex<Ix>,
    lo: &'a T,
) -> Vec<NodeIndex<Ix>>
where
    T: Ord,
    Ix: IndexType,
{
    let mut nodes = vec![];
    while !map_ref.node_ref(x, Node::is_sentinel) {
        if map_ref.node_ref(x, Node::start) >= lo {
            nodes.push(x);
            x = map_ref.node_ref(x, Node::left);
        } else {
            x = map_ref.node_ref(x, Node::right);
        }
    }
    nodes
}

/// An iterator over the events with start time in `[lo, hi]` inclusive,
/// sorted by start time. It's equal to `iter().filter()` but prunes the
/// walk instead of visiting every node.
#[derive(Debug)]
pub struct RangeIter<'a, T, Ix>
where
    T: Ord,
{
    /// Reference to the map
    map_ref: &'a EventMap<T, Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
    /// Inclusive lower bound on start time
    lo: &'a T,
    /// Inclusive upper bound on start time
    hi: &'a T,
}

impl<'a, T, Ix> RangeIter<'a, T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    pub(crate) fn new(map_ref: &'a EventMap<T, Ix>, lo: &'a T, hi: &'a T) -> Self {
        RangeIter {
            map_ref,
            stack: left_link_from(map_ref, map_ref.root, lo),
            lo,
            hi,
        }
    }
}

impl<'a, T, Ix> Iterator for RangeIter<'a, T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    type Item = &'a Event<T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        let event = self.map_ref.node_ref(x, Node::event);
        if &event.start > self.hi {
            // in-order from here on every start is larger still
            self.stack.clear();
            return None;
        }
        self.stack.extend(left_link_from(
            self.map_ref,
            self.map_ref.node_ref(x, Node::right),
            self.lo,
        ));
        Some(event)
    }
}
