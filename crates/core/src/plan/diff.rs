//! Greedy line diff.
//!
//! Advances both cursors on equality; otherwise emits the current original
//! line as removed and the current modified line as added and advances both.
//! This is not a minimal (LCS) diff: a single inserted or deleted line shows
//! up as a run of paired remove/add lines. Acceptable here because the
//! output is a review aid, not a patch.

use std::path::PathBuf;

/// One line of diff output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Added(String),
    Removed(String),
    Context(String),
}

/// Diff block for one changed file; `path` is relative to the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub lines: Vec<DiffLine>,
}

pub(crate) fn compute(original: &str, modified: &str) -> Vec<DiffLine> {
    let original: Vec<&str> = original.split('\n').collect();
    let modified: Vec<&str> = modified.split('\n').collect();

    let mut lines = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < original.len() || j < modified.len() {
        if i >= original.len() {
            lines.push(DiffLine::Added(modified[j].to_string()));
            j += 1;
        } else if j >= modified.len() {
            lines.push(DiffLine::Removed(original[i].to_string()));
            i += 1;
        } else if original[i] == modified[j] {
            // Context only directly after a change, mirroring the compact
            // output style of the greedy walk.
            if matches!(
                lines.last(),
                Some(DiffLine::Added(_) | DiffLine::Removed(_))
            ) {
                lines.push(DiffLine::Context(original[i].to_string()));
            }
            i += 1;
            j += 1;
        } else {
            lines.push(DiffLine::Removed(original[i].to_string()));
            lines.push(DiffLine::Added(modified[j].to_string()));
            i += 1;
            j += 1;
        }
    }
    lines
}
