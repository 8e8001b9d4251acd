#![forbid(unsafe_code)]

//! Whole-history rendering.
//!
//! [`Resettable::dump`] walks the chain from the oldest boundary to the
//! newest node and prints the pristine value followed by one diff block per
//! transition. The block of the transition leading into the node that was
//! current when the dump started is marked with `>>>`:
//!
//! ```text
//! """
//!   0
//!
//! >>> - 0
//! + 1
//!
//! - 1
//! + 2
//! """
//! ```
//!
//! The walk moves the container, so both entry points take `&mut self`;
//! position and value are back where they were when they return.

use std::fmt;

use crate::diff::{self, DiffLine};
use crate::history::NodeId;
use crate::resettable::Resettable;

const FENCE: &str = "\"\"\"";
const MARKER: &str = ">>> ";
const NO_CHANGES: &str = "  No state changes";

/// Every value in the chain, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuesDump<T> {
    /// Reconstructed values; `items[0]` is the pristine value.
    pub items: Vec<T>,
    /// Index into `items` of the value that was current.
    pub current_index: usize,
}

impl<T> ValuesDump<T> {
    /// The value that was current.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.items.get(self.current_index)
    }
}

impl<T: fmt::Debug + 'static> Resettable<T> {
    /// Render the whole history as text.
    pub fn dump(&mut self) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.dump_to(&mut out);
        out
    }

    /// Render the whole history into `out`.
    ///
    /// The container is returned to its starting node even if `out` fails.
    pub fn dump_to<W: fmt::Write>(&mut self, out: &mut W) -> fmt::Result {
        let span = tracing::debug_span!(
            "resettable.dump",
            transitions = self.len(),
            current = self.position().index()
        );
        let _guard = span.enter();

        let marked = self.position();
        self.reset();
        let result = self.write_chain(marked, out);
        self.return_to(marked);
        result
    }

    fn write_chain<W: fmt::Write>(&mut self, marked: NodeId, out: &mut W) -> fmt::Result {
        writeln!(out, "{FENCE}")?;

        let mut previous = diff::render(&self.value);
        for (i, line) in previous.lines().enumerate() {
            let prefix = if i == 0 && self.position() == marked {
                MARKER
            } else {
                ""
            };
            writeln!(out, "{prefix}  {line}")?;
        }

        let mut step = 0usize;
        while self.history.step_forward(&mut self.value) {
            step += 1;
            let rendered = diff::render(&self.value);
            let is_marked = self.position() == marked;
            out.write_char('\n')?;
            match diff::diff_text(&previous, &rendered) {
                Some(lines) => write_block(out, &lines, is_marked)?,
                None => {
                    let prefix = if is_marked { MARKER } else { "" };
                    writeln!(out, "{prefix}{NO_CHANGES}")?;
                }
            }
            previous = rendered;
        }

        tracing::trace!(target: "resettable.history", steps = step, "dump walk finished");
        out.write_str(FENCE)
    }
}

impl<T: 'static> Resettable<T> {
    fn return_to(&mut self, target: NodeId) {
        if !self.seek(target) {
            tracing::warn!(
                target: "resettable.history",
                node = target.index(),
                "walk could not return to its starting node"
            );
        }
    }
}

fn write_block<W: fmt::Write>(out: &mut W, lines: &[DiffLine], marked: bool) -> fmt::Result {
    for (i, line) in lines.iter().enumerate() {
        if i == 0 && marked {
            out.write_str(MARKER)?;
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

impl<T: Clone + 'static> Resettable<T> {
    /// Collect every value in the chain, oldest first.
    pub fn values_dump(&mut self) -> ValuesDump<T> {
        let marked = self.position();
        self.reset();

        let mut items = vec![self.value.clone()];
        let mut current_index = 0;
        while self.history.step_forward(&mut self.value) {
            if self.position() == marked {
                current_index = items.len();
            }
            items.push(self.value.clone());
        }

        self.return_to(marked);
        ValuesDump {
            items,
            current_index,
        }
    }
}
