//! Request Scheduler
//!
//! Priority queue of matched-but-unconsumed command requests, each with a
//! time-to-live. Entries expire from anywhere in the queue, so it is a
//! doubly linked list (index based) rather than a heap:
//!
//! ```text
//!   head ─► [p0 ttl3] ◄─► [p2 ttl1] ◄─► [p2 ttl9] ◄─ tail
//!                            │ expires on next tick
//!                            ▼
//!                     free list (reused slots)
//! ```
//!
//! Ordering is ascending priority, stable among equal priorities (first
//! enqueued stays ahead). Slots are recycled through a free list, so the
//! arena stops growing once it reaches the peak number of live requests.

use std::fmt;

#[cfg(feature = "debug-tracing")]
use tracing::trace;

/// Queue entry with a priority and time-to-live.
pub trait Prioritized {
    /// Lower is more urgent.
    fn priority(&self) -> u32;
    /// Ticks the entry survives once enqueued.
    fn lifetime(&self) -> u32;
}

/// Request produced by a matched command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    /// Index into the command catalog
    pub command: usize,
    /// Command name, for diagnostics
    pub name: String,
    /// Lower is more urgent
    pub priority: u32,
    /// Ticks the request survives
    pub lifetime: u32,
}

impl Prioritized for PendingRequest {
    fn priority(&self) -> u32 {
        self.priority
    }

    fn lifetime(&self) -> u32 {
        self.lifetime
    }
}

impl fmt::Display for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Clone, Debug)]
struct Node<R> {
    request: Option<R>,
    remaining: u32,
    prev: Option<usize>,
    next: Option<usize>,
}

/// One row of a [`SchedulerSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotEntry {
    /// Request label
    pub name: String,
    /// Priority
    pub priority: u32,
    /// Ticks left
    pub remaining: u32,
}

/// Diagnostic view of the queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerSnapshot {
    /// Live entries in queue order
    pub entries: Vec<SnapshotEntry>,
    /// Live slot count
    pub active: usize,
    /// Recycled slot count
    pub pooled: usize,
}

/// Pooled, priority-ordered, expiring request queue.
#[derive(Clone, Debug)]
pub struct RequestScheduler<R> {
    nodes: Vec<Node<R>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<R> Default for RequestScheduler<R> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }
}

impl<R: Prioritized> RequestScheduler<R> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Insert after every entry with priority <= the new one's.
    ///
    /// A zero lifetime is still dequeueable until the next [`tick`](Self::tick).
    pub fn enqueue(&mut self, request: R) {
        let priority = request.priority();
        let remaining = request.lifetime();
        let slot = self.alloc(request, remaining);

        let mut cursor = self.head;
        while let Some(index) = cursor {
            if self.priority_at(index) > priority {
                break;
            }
            cursor = self.nodes[index].next;
        }
        self.link_before(cursor, slot);
        self.len += 1;
    }

    /// Age every entry by one tick, releasing those that reach zero.
    ///
    /// Returns how many expired.
    pub fn tick(&mut self) -> usize {
        let mut expired = 0;
        let mut cursor = self.head;

        while let Some(index) = cursor {
            cursor = self.nodes[index].next;
            let node = &mut self.nodes[index];
            node.remaining = node.remaining.saturating_sub(1);
            if node.remaining == 0 {
                self.remove(index);
                expired += 1;
            }
        }

        expired
    }

    /// Remove and return the first entry (in queue order) accepted by
    /// `accept`, together with what `accept` produced.
    pub fn dequeue_first_matching<T>(&mut self, mut accept: impl FnMut(&R) -> Option<T>) -> Option<(R, T)> {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            cursor = self.nodes[index].next;
            let accepted = self.nodes[index].request.as_ref().and_then(&mut accept);
            if let Some(value) = accepted {
                return self.remove(index).map(|request| (request, value));
            }
        }
        None
    }

    /// Remove and return the head entry.
    pub fn try_dequeue(&mut self) -> Option<R> {
        let head = self.head?;
        self.remove(head)
    }

    /// Live entries in queue order.
    pub fn iter(&self) -> impl Iterator<Item = (&R, u32)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let index = cursor?;
            let node = &self.nodes[index];
            cursor = node.next;
            node.request.as_ref().map(|r| (r, node.remaining))
        })
    }

    /// Drop every live entry, keeping the slots pooled.
    pub fn clear(&mut self) {
        while self.try_dequeue().is_some() {}
    }

    fn priority_at(&self, index: usize) -> u32 {
        self.nodes[index].request.as_ref().map_or(u32::MAX, Prioritized::priority)
    }

    fn alloc(&mut self, request: R, remaining: u32) -> usize {
        let node = Node {
            request: Some(request),
            remaining,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn link_before(&mut self, target: Option<usize>, slot: usize) {
        match target {
            None => {
                self.nodes[slot].prev = self.tail;
                match self.tail {
                    Some(tail) => self.nodes[tail].next = Some(slot),
                    None => self.head = Some(slot),
                }
                self.tail = Some(slot);
            }
            Some(target) => {
                let prev = self.nodes[target].prev;
                self.nodes[slot].prev = prev;
                self.nodes[slot].next = Some(target);
                match prev {
                    Some(prev) => self.nodes[prev].next = Some(slot),
                    None => self.head = Some(slot),
                }
                self.nodes[target].prev = Some(slot);
            }
        }
    }

    fn remove(&mut self, index: usize) -> Option<R> {
        let (prev, next) = (self.nodes[index].prev, self.nodes[index].next);
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.nodes[index];
        node.prev = None;
        node.next = None;
        node.remaining = 0;
        self.free.push(index);
        self.len -= 1;
        node.request.take()
    }
}

impl<R: Prioritized + fmt::Display> RequestScheduler<R> {
    /// Diagnostic view of the queue.
    pub fn snapshot(&self) -> SchedulerSnapshot {
        let entries = self
            .iter()
            .map(|(request, remaining)| SnapshotEntry {
                name: request.to_string(),
                priority: request.priority(),
                remaining,
            })
            .collect();
        let snapshot = SchedulerSnapshot {
            entries,
            active: self.len,
            pooled: self.free.len(),
        };

        #[cfg(feature = "debug-tracing")]
        trace!(?snapshot, "request queue");

        snapshot
    }
}

// =============================================================================
// TESTS
// =============================================================================
