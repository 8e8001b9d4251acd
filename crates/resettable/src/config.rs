#![forbid(unsafe_code)]

//! Configuration for a [`Resettable`](crate::Resettable) container.

/// Limits applied to a container's history.
///
/// The default is unlimited: every recorded step stays reachable until a
/// `Default` modification discards the future it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of transitions kept in history.
    ///
    /// When a new step pushes the chain past this limit, the oldest steps are
    /// folded into the pristine state (they can no longer be undone). If the
    /// current position is itself the oldest node, the newest redoable steps
    /// are dropped instead. Values below 1 are treated as 1.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl HistoryConfig {
    /// Create a configuration with the given depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create a configuration without a depth limit.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    /// Set the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether a depth limit is in effect.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.max_depth != usize::MAX
    }
}
