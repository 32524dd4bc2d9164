//! Ordered queue of in-flight messages on one connection.
//!
//! An HTTP/1.1 client may pipeline several requests before reading any response, and the
//! responses must go out in request order even when they are produced out of order.
//! [`Pipeline`] keeps the pending messages in a FIFO linked through slot indices of an arena,
//! so a message can be removed from the middle in O(1) and a stale [`MessageId`] is detected
//! instead of dangling.
//!
//! # Example
//!
//! ```
//! use micro_http_core::pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::new();
//! let first = pipeline.push_back("GET /a");
//! let second = pipeline.push_back("GET /b");
//!
//! // the second response is ready first, but must wait for the first one
//! pipeline.mark_complete(second);
//! assert_eq!(pipeline.pop_completed(), None);
//!
//! pipeline.mark_complete(first);
//! assert_eq!(pipeline.pop_completed(), Some("GET /a"));
//! assert_eq!(pipeline.pop_completed(), Some("GET /b"));
//! ```

use std::fmt;
use std::iter::FusedIterator;

/// Handle to a message queued in a [`Pipeline`].
///
/// Ids carry the generation of their slot, so an id whose message was removed never resolves
/// to a message queued later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId {
    index: usize,
    generation: u32,
}

struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
    complete: bool,
}

struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
    next_free: Option<usize>,
}

/// A FIFO queue with O(1) removal by id and ordered completion.
pub struct Pipeline<T> {
    slots: Vec<Slot<T>>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Option<usize>,
    len: usize,
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity), head: None, tail: None, free: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Queues `value` behind every message already in the pipeline.
    pub fn push_back(&mut self, value: T) -> MessageId {
        let node = Node { value, prev: self.tail, next: None, complete: false };

        let index = if let Some(index) = self.free {
            let slot = &mut self.slots[index];
            self.free = slot.next_free.take();
            slot.node = Some(node);
            index
        } else {
            self.slots.push(Slot { generation: 0, node: Some(node), next_free: None });
            self.slots.len() - 1
        };

        match self.tail.and_then(|tail| self.slots[tail].node.as_mut()) {
            Some(tail) => tail.next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        MessageId { index, generation: self.slots[index].generation }
    }

    /// Id of the oldest queued message.
    pub fn front_id(&self) -> Option<MessageId> {
        self.head.map(|index| MessageId { index, generation: self.slots[index].generation })
    }

    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|index| self.slots[index].node.as_ref()).map(|node| &node.value)
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.head.and_then(|index| self.slots[index].node.as_mut()).map(|node| &mut node.value)
    }

    /// Removes the oldest message, complete or not.
    pub fn pop_front(&mut self) -> Option<T> {
        let index = self.head?;
        self.unlink(index)
    }

    /// Removes the oldest message only if it has been marked complete.
    ///
    /// Calling this in a loop yields finished messages in request order and stops at the first
    /// one still in progress.
    pub fn pop_completed(&mut self) -> Option<T> {
        let index = self.head?;
        if self.slots[index].node.as_ref().is_some_and(|node| node.complete) { self.unlink(index) } else { None }
    }

    /// Flags the message as ready to leave the pipeline. Returns `false` for a stale id.
    pub fn mark_complete(&mut self, id: MessageId) -> bool {
        match self.resolve(id).and_then(|index| self.slots[index].node.as_mut()) {
            Some(node) => {
                node.complete = true;
                true
            }
            None => false,
        }
    }

    pub fn is_complete(&self, id: MessageId) -> Option<bool> {
        self.node(id).map(|node| node.complete)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.resolve(id).is_some()
    }

    pub fn get(&self, id: MessageId) -> Option<&T> {
        self.node(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut T> {
        let index = self.resolve(id)?;
        self.slots[index].node.as_mut().map(|node| &mut node.value)
    }

    /// Takes the message out of the pipeline wherever it is queued.
    pub fn remove(&mut self, id: MessageId) -> Option<T> {
        let index = self.resolve(id)?;
        self.unlink(index)
    }

    /// Iterates the queued messages oldest first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { pipeline: self, next: self.head, remaining: self.len }
    }

    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    fn resolve(&self, id: MessageId) -> Option<usize> {
        let slot = self.slots.get(id.index)?;
        (slot.generation == id.generation && slot.node.is_some()).then_some(id.index)
    }

    fn node(&self, id: MessageId) -> Option<&Node<T>> {
        self.resolve(id).and_then(|index| self.slots[index].node.as_ref())
    }

    fn unlink(&mut self, index: usize) -> Option<T> {
        let free = self.free;
        let slot = &mut self.slots[index];
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = free;
        self.free = Some(index);

        match node.prev.and_then(|prev| self.slots[prev].node.as_mut()) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|next| self.slots[next].node.as_mut()) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }

        self.len -= 1;
        Some(node.value)
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|(_, value)| value)).finish()
    }
}

/// Iterator over `(id, message)` pairs of a [`Pipeline`], oldest first.
pub struct Iter<'a, T> {
    pipeline: &'a Pipeline<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (MessageId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let slot = &self.pipeline.slots[index];
        let node = slot.node.as_ref()?;
        self.next = node.next;
        self.remaining -= 1;
        Some((MessageId { index, generation: slot.generation }, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}
