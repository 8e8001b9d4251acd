#![forbid(unsafe_code)]

//! Line-oriented structural diff of `Debug` renderings.
//!
//! Values are rendered with the pretty `{:#?}` formatter, one field per line,
//! and the renderings are compared line by line using a longest common
//! subsequence. Unchanged leading and trailing lines are matched up front and
//! the middle is aligned in linear space, so a one-line change in a large
//! value costs time proportional to its size and no quadratic table. The result is a list of [`DiffLine`]s that the dump formatter
//! prints with a two-column gutter:
//!
//! ```text
//!   Settings {
//!       theme: "dark",
//! -     volume: 3,
//! +     volume: 4,
//!   }
//! ```

use std::cmp::Reverse;
use std::fmt;
use std::mem;

/// One line of a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Present on both sides.
    Same(String),
    /// Only in the old rendering.
    Removed(String),
    /// Only in the new rendering.
    Added(String),
}

impl DiffLine {
    /// Gutter marker for this line kind.
    #[must_use]
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Same(_) => "  ",
            Self::Removed(_) => "- ",
            Self::Added(_) => "+ ",
        }
    }

    /// Line content without the gutter.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Same(text) | Self::Removed(text) | Self::Added(text) => text,
        }
    }

    /// Whether the line is a change.
    #[must_use]
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Same(_))
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.marker(), self.text())
    }
}

/// Render a value the way the diff sees it.
#[must_use]
pub fn render<T: fmt::Debug + ?Sized>(value: &T) -> String {
    format!("{value:#?}")
}

/// Diff two values' renderings.
///
/// Returns `None` when the renderings are identical.
#[must_use]
pub fn diff<T: fmt::Debug + ?Sized>(old: &T, new: &T) -> Option<Vec<DiffLine>> {
    diff_text(&render(old), &render(new))
}

/// Diff two pre-rendered texts line by line.
///
/// Returns `None` when the texts are identical. Within each run of changes,
/// removed lines precede added lines.
#[must_use]
pub fn diff_text(old: &str, new: &str) -> Option<Vec<DiffLine>> {
    if old == new {
        return None;
    }
    let old: Vec<&str> = old.lines().collect();
    let new: Vec<&str> = new.lines().collect();

    let mut lines = Vec::with_capacity(old.len().max(new.len()));
    diff_lines(&old, &new, TABLE_CELLS, &mut lines);
    Some(removals_first(lines))
}

// ============================================================================
// Line alignment
// ============================================================================

/// Largest middle section aligned with a full LCS table.
const TABLE_CELLS: usize = 1 << 16;

/// Align `old` against `new`, appending the result to `out`.
///
/// Common leading and trailing lines are emitted directly. The remaining
/// middle is aligned with a full table when it has at most `table_cells`
/// cells and split in half (Hirschberg) otherwise, so memory stays linear in
/// the input.
fn diff_lines(old: &[&str], new: &[&str], table_cells: usize, out: &mut Vec<DiffLine>) {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    out.extend(old[..prefix].iter().map(|line| same(line)));
    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    if old_mid.is_empty() || new_mid.is_empty() {
        out.extend(old_mid.iter().map(|line| removed(line)));
        out.extend(new_mid.iter().map(|line| added(line)));
    } else if old_mid.len().saturating_mul(new_mid.len()) <= table_cells {
        table_diff(old_mid, new_mid, out);
    } else if old_mid.len() == 1 {
        single_line_diff(old_mid[0], new_mid, out);
    } else {
        let half = old_mid.len() / 2;
        let split = split_point(&old_mid[..half], &old_mid[half..], new_mid);
        diff_lines(&old_mid[..half], &new_mid[..split], table_cells, out);
        diff_lines(&old_mid[half..], &new_mid[split..], table_cells, out);
    }

    out.extend(old[old.len() - suffix..].iter().map(|line| same(line)));
}

fn table_diff(old: &[&str], new: &[&str], out: &mut Vec<DiffLine>) {
    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            out.push(same(old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(removed(old[i]));
            i += 1;
        } else {
            out.push(added(new[j]));
            j += 1;
        }
    }
    out.extend(old[i..].iter().map(|line| removed(line)));
    out.extend(new[j..].iter().map(|line| added(line)));
}

fn single_line_diff(line: &str, new: &[&str], out: &mut Vec<DiffLine>) {
    match new.iter().position(|candidate| *candidate == line) {
        Some(at) => {
            out.extend(new[..at].iter().map(|line| added(line)));
            out.push(same(line));
            out.extend(new[at + 1..].iter().map(|line| added(line)));
        }
        None => {
            out.push(removed(line));
            out.extend(new.iter().map(|line| added(line)));
        }
    }
}

/// Position in `new` where an optimal alignment of `upper ++ lower` crosses
/// from `upper` into `lower`.
fn split_point(upper: &[&str], lower: &[&str], new: &[&str]) -> usize {
    let forward = lcs_row(upper.iter(), new.iter());
    let backward = lcs_row(lower.iter().rev(), new.iter().rev());

    // backward[t] covers the last t lines of `new`.
    (0..=new.len())
        .max_by_key(|&j| (forward[j] + backward[new.len() - j], Reverse(j)))
        .unwrap_or(0)
}

/// Last row of the LCS table of `old` against every prefix of `new`.
fn lcs_row<A, B, I, J>(old: I, new: J) -> Vec<usize>
where
    A: PartialEq<B>,
    I: Iterator<Item = A>,
    J: Iterator<Item = B> + Clone,
{
    let width = new.clone().count();
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];
    for line in old {
        for (j, candidate) in new.clone().enumerate() {
            current[j + 1] = if line == candidate {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        mem::swap(&mut previous, &mut current);
    }
    previous
}

/// Reorder each run of changes so its removals come first.
fn removals_first(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    let mut out = Vec::with_capacity(lines.len());
    let mut pending = Vec::new();
    for line in lines {
        match line {
            DiffLine::Added(_) => pending.push(line),
            DiffLine::Removed(_) => out.push(line),
            DiffLine::Same(_) => {
                out.append(&mut pending);
                out.push(line);
            }
        }
    }
    out.append(&mut pending);
    out
}

fn same(line: &str) -> DiffLine {
    DiffLine::Same(line.to_owned())
}

fn removed(line: &str) -> DiffLine {
    DiffLine::Removed(line.to_owned())
}

fn added(line: &str) -> DiffLine {
    DiffLine::Added(line.to_owned())
}
