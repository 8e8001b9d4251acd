#![forbid(unsafe_code)]

//! The [`Resettable`] container.
//!
//! A `Resettable<T>` owns a value and a linear history of the modifications
//! applied to it. Every modification is stored as a pair of whole-object
//! closures (forward and inverse); path-scoped modifications are lifted to
//! whole-object closures through their [`KeyPath`] before they are stored.
//!
//! # Modification flow
//!
//! ```text
//! modify_at(path, behavior, action)
//!   │
//!   ├─ begin     resolve behavior; Amend reverts the current edit first
//!   ├─ snapshot  extract path (snapshot-default inverse only)
//!   ├─ lift      action/undo on V  ─►  forward/inverse on T
//!   ├─ apply     forward(value)
//!   └─ record    thread the pair into history per behavior
//! ```
//!
//! # Boundaries
//!
//! `undo` at the oldest node and `redo` at the newest node are no-ops; they
//! never fail and never touch the value.

use std::fmt;
use std::sync::Arc;

use resettable_keypath::KeyPath;

use crate::behavior::OperationBehavior;
use crate::collection::Collection;
use crate::config::HistoryConfig;
use crate::field::Field;
use crate::history::{Action, History, NodeId};
use crate::value::ValueSemantic;

/// A value with structural undo/redo history.
pub struct Resettable<T: 'static> {
    pub(crate) value: T,
    pub(crate) history: History<T>,
    config: HistoryConfig,
}

/// A modification that has been started but not yet recorded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pending {
    behavior: OperationBehavior,
    reverted: bool,
}

impl<T: fmt::Debug + 'static> fmt::Debug for Resettable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resettable")
            .field("value", &self.value)
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Default + 'static> Default for Resettable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Resettable<T> {
    /// Wrap `value` with an empty, unlimited history.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with_config(value, HistoryConfig::default())
    }

    /// Wrap `value` with an empty history governed by `config`.
    #[must_use]
    pub fn with_config(value: T, config: HistoryConfig) -> Self {
        Self {
            value,
            history: History::new(),
            config,
        }
    }

    /// The current value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consume the container, returning the current value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Identity of the current history node.
    ///
    /// Stable while the node is alive; ids of discarded nodes are reused.
    #[must_use]
    pub fn position(&self) -> NodeId {
        self.history.current()
    }

    // ========================================================================
    // Modification
    // ========================================================================

    /// Modify the sub-value at `path`, undoing by restoring a snapshot.
    ///
    /// The sub-value is cloned before `action` runs; undo writes the clone
    /// back. With [`OperationBehavior::Amend`] the snapshot is taken after the
    /// amended edit has been reverted.
    pub fn modify_at<V, F>(
        &mut self,
        path: &KeyPath<T, V>,
        operation: OperationBehavior,
        action: F,
    ) -> &mut Self
    where
        V: ValueSemantic,
        F: Fn(&mut V) + Send + Sync + 'static,
    {
        let pending = self.begin(operation);
        let snapshot = path.extract(&self.value);
        self.commit_at(path, pending, action, move |value: &mut V| {
            *value = snapshot.clone();
        })
    }

    /// Modify the sub-value at `path` with an explicit inverse.
    ///
    /// Required when restoring the previous sub-value is not a correct undo:
    /// shared or interior-mutable sub-values, or structural edits whose
    /// inverse is a different kind of operation.
    pub fn modify_at_with_undo<V, F, U>(
        &mut self,
        path: &KeyPath<T, V>,
        operation: OperationBehavior,
        action: F,
        undo: U,
    ) -> &mut Self
    where
        V: 'static,
        F: Fn(&mut V) + Send + Sync + 'static,
        U: Fn(&mut V) + Send + Sync + 'static,
    {
        let pending = self.begin(operation);
        self.commit_at(path, pending, action, undo)
    }

    /// Modify the whole value with an explicit inverse.
    pub fn modify<F, U>(&mut self, operation: OperationBehavior, action: F, undo: U) -> &mut Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
        U: Fn(&mut T) + Send + Sync + 'static,
    {
        let pending = self.begin(operation);
        self.commit(pending, Arc::new(action), Arc::new(undo))
    }

    /// Handle to the sub-value at `path`.
    pub fn at<V: 'static>(&mut self, path: KeyPath<T, V>) -> Field<'_, T, V> {
        Field::new(self, path)
    }

    /// Handle to the collection at `path`.
    pub fn collection_at<E>(&mut self, path: KeyPath<T, Vec<E>>) -> Collection<'_, T, E>
    where
        E: Clone + Send + Sync + 'static,
    {
        Collection::new(self, path)
    }

    /// Resolve `operation` and, for `Amend`, revert the edit being replaced.
    pub(crate) fn begin(&mut self, operation: OperationBehavior) -> Pending {
        let behavior = if operation == OperationBehavior::Amend && !self.history.has_prev() {
            tracing::debug!(
                target: "resettable.history",
                node = self.history.current().index(),
                "amend at oldest boundary recorded as a new step"
            );
            OperationBehavior::Default
        } else {
            operation
        };

        let reverted = behavior == OperationBehavior::Amend;
        if reverted {
            self.history.revert_current(&mut self.value);
        }
        Pending { behavior, reverted }
    }

    /// Undo the effect of [`begin`](Self::begin) without recording anything.
    pub(crate) fn abort(&mut self, pending: Pending) {
        if pending.reverted {
            self.history.reapply_current(&mut self.value);
        }
        tracing::trace!(
            target: "resettable.history",
            behavior = %pending.behavior,
            "modification aborted"
        );
    }

    /// Lift a path-scoped action/undo pair and record it.
    pub(crate) fn commit_at<V, F, U>(
        &mut self,
        path: &KeyPath<T, V>,
        pending: Pending,
        action: F,
        undo: U,
    ) -> &mut Self
    where
        V: 'static,
        F: Fn(&mut V) + Send + Sync + 'static,
        U: Fn(&mut V) + Send + Sync + 'static,
    {
        let forward = lift(path, action);
        let inverse = lift(path, undo);
        self.commit(pending, forward, inverse)
    }

    fn commit(&mut self, pending: Pending, forward: Action<T>, inverse: Action<T>) -> &mut Self {
        forward(&mut self.value);
        let discarded = self.history.record(pending.behavior, forward, inverse);
        let evicted = if pending.behavior.creates_node() && self.config.is_bounded() {
            self.history.enforce_depth(self.config.max_depth)
        } else {
            0
        };

        tracing::debug!(
            target: "resettable.history",
            behavior = %pending.behavior,
            node = self.history.current().index(),
            transitions = self.history.len(),
            discarded,
            evicted,
            "modification recorded"
        );
        self
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Step back one transition. No-op at the oldest boundary.
    pub fn undo(&mut self) -> &mut Self {
        if !self.history.step_back(&mut self.value) {
            tracing::trace!(target: "resettable.history", "undo at oldest boundary");
        }
        self
    }

    /// Step forward one transition. No-op at the newest boundary.
    pub fn redo(&mut self) -> &mut Self {
        if !self.history.step_forward(&mut self.value) {
            tracing::trace!(target: "resettable.history", "redo at newest boundary");
        }
        self
    }

    /// Step back up to `count` transitions.
    pub fn undo_n(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            if !self.history.step_back(&mut self.value) {
                break;
            }
        }
        self
    }

    /// Step forward up to `count` transitions.
    pub fn redo_n(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            if !self.history.step_forward(&mut self.value) {
                break;
            }
        }
        self
    }

    /// Step back to the oldest boundary.
    pub fn reset(&mut self) -> &mut Self {
        while self.history.step_back(&mut self.value) {}
        self
    }

    /// Step forward to the newest boundary.
    pub fn restore(&mut self) -> &mut Self {
        while self.history.step_forward(&mut self.value) {}
        self
    }

    /// Move to the node `target`, which must be part of the chain.
    ///
    /// Returns `false` (after walking to the oldest boundary and back) if the
    /// node is not reachable.
    pub(crate) fn seek(&mut self, target: NodeId) -> bool {
        let start = self.history.current();
        while self.history.current() != target {
            if !self.history.step_forward(&mut self.value) {
                break;
            }
        }
        if self.history.current() == target {
            return true;
        }
        while self.history.current() != target {
            if !self.history.step_back(&mut self.value) {
                break;
            }
        }
        if self.history.current() == target {
            return true;
        }
        // Unreachable target: return to where we started.
        while self.history.current() != start && self.history.step_forward(&mut self.value) {}
        false
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether [`undo`](Self::undo) would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.has_prev()
    }

    /// Whether [`redo`](Self::redo) would change anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.has_next()
    }

    /// Number of transitions that can be undone.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Number of transitions that can be redone.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Total number of transitions in history.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether history holds no transitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.len() == 0
    }

    /// Drop all history. The current value becomes the pristine state.
    pub fn clear_history(&mut self) -> &mut Self {
        let dropped = self.history.len();
        self.history.clear();
        tracing::debug!(target: "resettable.history", dropped, "history cleared");
        self
    }
}

impl<E: Clone + Send + Sync + 'static> Resettable<Vec<E>> {
    /// Handle to the wrapped collection itself.
    pub fn collection(&mut self) -> Collection<'_, Vec<E>, E> {
        Collection::new(self, KeyPath::identity())
    }
}

/// Turn a sub-value action into a whole-object action.
fn lift<T, V, F>(path: &KeyPath<T, V>, action: F) -> Action<T>
where
    T: 'static,
    V: 'static,
    F: Fn(&mut V) + Send + Sync + 'static,
{
    let path = path.clone();
    Arc::new(move |object: &mut T| path.modify(object, |value| action(value)))
}

// ============================================================================
// Tests
// ============================================================================
