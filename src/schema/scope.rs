//! Persistent stack of the message types entered during a traversal.
//!
//! Each frame lives on the Rust call stack of the recursion that pushed it
//! and only borrows its parent, so sibling branches never observe each
//! other's frames and nothing needs to be popped.

use std::fmt;

#[derive(Debug, Clone, Copy)]
pub struct ScopeStack<'s> {
    qualified_name: &'s str,
    parent: Option<&'s ScopeStack<'s>>,
}

impl<'s> ScopeStack<'s> {
    /// Stack holding only the traversal root.
    pub fn root(qualified_name: &'s str) -> Self {
        Self {
            qualified_name,
            parent: None,
        }
    }

    /// New stack with `qualified_name` as innermost frame. `self` is untouched.
    pub fn push(&'s self, qualified_name: &'s str) -> ScopeStack<'s> {
        ScopeStack {
            qualified_name,
            parent: Some(self),
        }
    }

    /// Qualified name of the innermost type; the lexical scope for lookups.
    pub fn innermost(&self) -> &'s str {
        self.qualified_name
    }

    /// How many frames refer to `qualified_name`.
    pub fn occurrences(&self, qualified_name: &str) -> usize {
        self.frames().filter(|name| *name == qualified_name).count()
    }

    /// Frames from innermost to outermost.
    pub fn frames(&self) -> impl Iterator<Item = &'s str> + '_ {
        std::iter::successors(Some(self), |frame| frame.parent).map(|frame| frame.qualified_name)
    }

    pub fn depth(&self) -> usize {
        self.frames().count()
    }
}

impl fmt::Display for ScopeStack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut frames: Vec<&str> = self.frames().collect();
        frames.reverse();
        write!(f, "{}", frames.join(" > "))
    }
}
