//! Addressing nodes of a [`SourceTree`] by child-index path.
//!
//! A `NodePath` is how mirror nodes and the session refer back to source
//! nodes without owning or borrowing them.

use std::fmt;

use crate::source::SourceTree;

/// Child indices from the root down to a node. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut v = Vec::with_capacity(self.0.len() + 1);
        v.extend_from_slice(&self.0);
        v.push(index);
        Self(v)
    }

    /// True when `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &NodePath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Walk `root` along the path. Returns `None` when an index is out of range.
    pub fn resolve<'a>(&self, root: &'a dyn SourceTree) -> Option<&'a dyn SourceTree> {
        let mut cur = root;
        for &idx in &self.0 {
            cur = cur.child_at(idx)?;
        }
        Some(cur)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for idx in &self.0 {
            write!(f, "/{}", idx)?;
        }
        Ok(())
    }
}
