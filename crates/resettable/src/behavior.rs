#![forbid(unsafe_code)]

//! How a new modification is threaded into history.

use std::fmt;

/// Placement of a modification relative to the current history position.
///
/// ```text
/// before:           n0 ── n1 ── n2 ── n3        (current = n1)
///
/// Default:          n0 ── n1 ── m               (n2, n3 discarded; current = m)
/// Amend:            n0 ── n1' ── n2 ── n3       (n1 edit replaced; current = n1')
/// Insert:           n0 ── n1 ── m ── n2 ── n3   (future kept; current = m)
/// Inject:           n0 ── n1* ── n2 ── n3       (n1 edit extended; current = n1*)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OperationBehavior {
    /// Record a new step and discard any redoable future.
    #[default]
    Default,
    /// Replace the edit that led to the current position.
    ///
    /// At the oldest boundary there is no edit to replace, so the
    /// modification is recorded as a [`Default`](Self::Default) step.
    Amend,
    /// Record a new step in front of the redoable future, keeping it.
    Insert,
    /// Fold the modification into the edit that led to the current position
    /// without moving.
    Inject,
}

impl OperationBehavior {
    /// Stable lowercase name, used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Amend => "amend",
            Self::Insert => "insert",
            Self::Inject => "inject",
        }
    }

    /// Whether this behavior creates a new history node.
    #[must_use]
    pub const fn creates_node(self) -> bool {
        matches!(self, Self::Default | Self::Insert)
    }
}

impl fmt::Display for OperationBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
