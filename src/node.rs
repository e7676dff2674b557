use crate::event::Event;

use crate::index::{IndexType, NodeIndex};

/// Node of the start-time tree
#[derive(Debug)]
pub struct Node<T, Ix> {
    /// Left children
    pub left: Option<NodeIndex<Ix>>,
    /// Right children
    pub right: Option<NodeIndex<Ix>>,
    /// Height of the subtree rooted here; the sentinel has height 0
    pub height: u32,

    /// Event payload of the node
    pub event: Option<Event<T>>,
}

// Convenient getter/setter methods
impl<T, Ix> Node<T, Ix>
where
    Ix: IndexType,
{
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn event(&self) -> &Event<T> {
        self.event.as_ref().unwrap()
    }

    pub fn start(&self) -> &T {
        &self.event().start
    }

    pub fn left(&self) -> NodeIndex<Ix> {
        self.left.unwrap()
    }

    pub fn right(&self) -> NodeIndex<Ix> {
        self.right.unwrap()
    }

    pub fn is_sentinel(&self) -> bool {
        self.event.is_none()
    }

    pub fn take_event(&mut self) -> Event<T> {
        self.event.take().unwrap()
    }

    pub fn set_height(height: u32) -> impl FnOnce(&mut Node<T, Ix>) {
        move |node: &mut Node<T, Ix>| {
            node.height = height;
        }
    }

    pub fn set_left(left: NodeIndex<Ix>) -> impl FnOnce(&mut Node<T, Ix>) {
        move |node: &mut Node<T, Ix>| {
            let _ignore = node.left.replace(left);
        }
    }

    pub fn set_right(right: NodeIndex<Ix>) -> impl FnOnce(&mut Node<T, Ix>) {
        move |node: &mut Node<T, Ix>| {
            let _ignore = node.right.replace(right);
        }
    }
}
