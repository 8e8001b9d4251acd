#![forbid(unsafe_code)]

//! Linear undo/redo history stored in an arena.
//!
//! Each node records the transition that leads *into* it from its `prev`
//! neighbor (`forward`) and the transition back out (`inverse`). The oldest
//! node has no `prev`; it stands for the pristine state and its `forward` is
//! never applied.
//!
//! ```text
//!            forward(n1)       forward(n2)       forward(n3)
//!   [n0] ───────────────► [n1] ───────────────► [n2] ───────────────► [n3]
//!        ◄───────────────      ◄───────────────      ◄───────────────
//!            inverse(n1)       inverse(n2)       inverse(n3)
//!                                 ▲
//!                              current
//! ```
//!
//! Nodes reference neighbors by [`NodeId`] instead of owning/weak pointer
//! pairs. Slots of discarded nodes go on a free list and are reused.
//!
//! # Invariants
//!
//! 1. Exactly one node (the oldest) has no `prev`; exactly one (the newest)
//!    has no `next`.
//! 2. For every live node `n` with `n.next == Some(m)`: `m.prev == Some(n)`.
//! 3. `current` always names a live node of the chain.
//! 4. `live` equals the number of occupied slots, which equals the number of
//!    nodes reachable from `oldest`.

use std::fmt;
use std::sync::Arc;

use crate::behavior::OperationBehavior;

/// A whole-object transition stored in history.
pub type Action<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// Index of a node in the history arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

struct Node<T> {
    prev: Option<NodeId>,
    next: Option<NodeId>,
    forward: Option<Action<T>>,
    inverse: Option<Action<T>>,
}

impl<T> Node<T> {
    fn boundary() -> Self {
        Self {
            prev: None,
            next: None,
            forward: None,
            inverse: None,
        }
    }
}

/// Arena-backed linear history with a movable cursor.
pub(crate) struct History<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    oldest: NodeId,
    current: NodeId,
    live: usize,
}

impl<T> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("current", &self.current)
            .field("oldest", &self.oldest)
            .field("live", &self.live)
            .field("free", &self.free.len())
            .finish()
    }
}

impl<T: 'static> History<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![Some(Node::boundary())],
            free: Vec::new(),
            oldest: NodeId(0),
            current: NodeId(0),
            live: 1,
        }
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => unreachable!("history node {id:?} is not live"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => unreachable!("history node {id:?} is not live"),
        }
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(node);
            NodeId(index)
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    fn release(&mut self, id: NodeId) -> Node<T> {
        let node = self.slots[id.0]
            .take()
            .unwrap_or_else(|| unreachable!("history node {id:?} released twice"));
        self.free.push(id.0);
        self.live -= 1;
        node
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    pub(crate) fn current(&self) -> NodeId {
        self.current
    }

    pub(crate) fn has_prev(&self) -> bool {
        self.node(self.current).prev.is_some()
    }

    pub(crate) fn has_next(&self) -> bool {
        self.node(self.current).next.is_some()
    }

    /// Apply the current node's inverse and move to `prev`.
    ///
    /// Returns `false` (and touches nothing) at the oldest boundary.
    pub(crate) fn step_back(&mut self, value: &mut T) -> bool {
        let node = self.node(self.current);
        let Some(prev) = node.prev else {
            return false;
        };
        if let Some(inverse) = node.inverse.clone() {
            inverse(value);
        }
        self.current = prev;
        true
    }

    /// Apply the next node's forward and move to it.
    ///
    /// Returns `false` (and touches nothing) at the newest boundary.
    pub(crate) fn step_forward(&mut self, value: &mut T) -> bool {
        let Some(next) = self.node(self.current).next else {
            return false;
        };
        if let Some(forward) = self.node(next).forward.clone() {
            forward(value);
        }
        self.current = next;
        true
    }

    /// Apply the current node's inverse without moving.
    ///
    /// Used by `Amend` to get back to the state before the edit it replaces.
    pub(crate) fn revert_current(&self, value: &mut T) {
        if let Some(inverse) = self.node(self.current).inverse.clone() {
            inverse(value);
        }
    }

    /// Apply the transition into the current node without moving.
    ///
    /// Inverse of [`revert_current`](Self::revert_current); used when an
    /// amend is abandoned after the revert.
    pub(crate) fn reapply_current(&self, value: &mut T) {
        let node = self.node(self.current);
        if node.prev.is_none() {
            return;
        }
        if let Some(forward) = node.forward.clone() {
            forward(value);
        }
    }

    /// Number of transitions between the oldest node and `current`.
    pub(crate) fn undo_depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.node(self.current).prev;
        while let Some(id) = cursor {
            depth += 1;
            cursor = self.node(id).prev;
        }
        depth
    }

    /// Number of transitions between `current` and the newest node.
    pub(crate) fn redo_depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.node(self.current).next;
        while let Some(id) = cursor {
            depth += 1;
            cursor = self.node(id).next;
        }
        depth
    }

    /// Total number of transitions in the chain.
    pub(crate) fn len(&self) -> usize {
        self.live - 1
    }

    // ========================================================================
    // Threading
    // ========================================================================

    /// Record a transition that has already been applied to the value.
    ///
    /// `behavior` must already be resolved: `Amend` is only valid when the
    /// current node has a `prev`. Returns the number of nodes discarded from
    /// the old future (only `Default` discards).
    pub(crate) fn record(
        &mut self,
        behavior: OperationBehavior,
        forward: Action<T>,
        inverse: Action<T>,
    ) -> usize {
        match behavior {
            OperationBehavior::Default => {
                let discarded = self.discard_future();
                let id = self.alloc(Node {
                    prev: Some(self.current),
                    next: None,
                    forward: Some(forward),
                    inverse: Some(inverse),
                });
                self.node_mut(self.current).next = Some(id);
                self.current = id;
                discarded
            }
            OperationBehavior::Insert => {
                let following = self.node(self.current).next;
                let id = self.alloc(Node {
                    prev: Some(self.current),
                    next: following,
                    forward: Some(forward),
                    inverse: Some(inverse),
                });
                if let Some(following) = following {
                    self.node_mut(following).prev = Some(id);
                }
                self.node_mut(self.current).next = Some(id);
                self.current = id;
                0
            }
            OperationBehavior::Amend => {
                let node = self.node_mut(self.current);
                debug_assert!(node.prev.is_some(), "amend requires an edit to replace");
                node.forward = Some(forward);
                node.inverse = Some(inverse);
                0
            }
            OperationBehavior::Inject => {
                let node = self.node_mut(self.current);
                let inverse = match node.inverse.take() {
                    Some(previous) => compose(inverse, previous),
                    None => inverse,
                };
                node.inverse = Some(inverse);
                if node.prev.is_some() {
                    let forward = match node.forward.take() {
                        Some(previous) => compose(previous, forward),
                        None => forward,
                    };
                    node.forward = Some(forward);
                }
                0
            }
        }
    }

    /// Drop every node after `current`.
    fn discard_future(&mut self) -> usize {
        let mut discarded = 0;
        let mut cursor = self.node_mut(self.current).next.take();
        while let Some(id) = cursor {
            cursor = self.release(id).next;
            discarded += 1;
        }
        discarded
    }

    /// Trim the chain to at most `max_depth` transitions.
    ///
    /// Evicts from the oldest end first, never past `current`; then drops
    /// newest future nodes. Returns the number of evicted nodes.
    pub(crate) fn enforce_depth(&mut self, max_depth: usize) -> usize {
        let max_depth = max_depth.max(1);
        let mut evicted = 0;

        while self.len() > max_depth && self.oldest != self.current {
            let old = self.release(self.oldest);
            let Some(next) = old.next else {
                unreachable!("oldest node differs from current but has no next");
            };
            let node = self.node_mut(next);
            node.prev = None;
            node.forward = None;
            node.inverse = None;
            self.oldest = next;
            evicted += 1;
        }

        while self.len() > max_depth {
            let mut newest = self.current;
            while let Some(next) = self.node(newest).next {
                newest = next;
            }
            if newest == self.current {
                break;
            }
            let removed = self.release(newest);
            if let Some(prev) = removed.prev {
                self.node_mut(prev).next = None;
            }
            evicted += 1;
        }

        evicted
    }

    /// Forget all history; the current node becomes the only (oldest) node.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.slots.push(Some(Node::boundary()));
        self.oldest = NodeId(0);
        self.current = NodeId(0);
        self.live = 1;
    }
}

/// `first` then `second`.
fn compose<T: 'static>(first: Action<T>, second: Action<T>) -> Action<T> {
    Arc::new(move |value: &mut T| {
        first(value);
        second(value);
    })
}

// ============================================================================
// Tests
// ============================================================================
