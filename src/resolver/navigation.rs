//! Navigation paths used for diagnostics and duplicate tracking.
//!
//! A path is a stack of segments pushed and popped in lockstep with the
//! recursive walk. The joined form is `.`-separated object keys with `[i]`
//! suffixes for array indices, rooted at the literal `root`:
//! `root.properties.items[0].content`. Composition branches (`oneOf` and
//! friends) push only the keyword, so sibling branches report the same path.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Current position within the document being resolved.
#[derive(Debug, Clone, Default)]
pub struct NavPath {
    segments: Vec<Segment>,
}

impl NavPath {
    /// Synthetic path at which the root document itself is registered.
    pub const ROOT: &'static str = "root";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, key: &str) {
        self.segments.push(Segment::Key(key.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Joined form of the full path.
    pub fn joined(&self) -> String {
        let mut out = String::from(Self::ROOT);
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                Segment::Index(index) => {
                    let _ = write!(out, "[{index}]");
                }
            }
        }
        out
    }

    /// Joined forms of every prefix of this path, longest first, ending with
    /// the root literal. Used by the best-effort owning-component lookup.
    pub fn prefixes_longest_first(&self) -> Vec<String> {
        let mut prefixes = Vec::with_capacity(self.segments.len() + 1);
        let mut current = String::from(Self::ROOT);
        prefixes.push(current.clone());
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => {
                    current.push('.');
                    current.push_str(key);
                }
                Segment::Index(index) => {
                    let _ = write!(current, "[{index}]");
                }
            }
            prefixes.push(current.clone());
        }
        prefixes.reverse();
        prefixes
    }
}
