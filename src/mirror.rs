//! Owned, display-facing copy of a source tree with error status aggregated
//! bottom-up.

use tracing::debug;

use crate::path::NodePath;
use crate::session::Session;
use crate::source::SourceTree;

/// One node of the mirror tree.
///
/// `source` addresses the corresponding source node; the mirror never owns
/// source data and is not re-synchronized if the source changes later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorNode {
    pub source: NodePath,
    pub error_in_subtree: bool,
    pub children: Vec<MirrorNode>,
}

impl MirrorNode {
    /// Display text, computed on demand by the session's text renderer.
    pub fn text(&self, session: &Session) -> String {
        session.node_text(&self.source)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Find the mirror node mirroring `path`.
    pub fn find(&self, path: &NodePath) -> Option<&MirrorNode> {
        if !self.source.is_prefix_of(path) {
            return None;
        }
        let mut cur = self;
        for &idx in &path.indices()[self.source.depth()..] {
            cur = cur.children.get(idx)?;
        }
        Some(cur)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MirrorNode::node_count).sum::<usize>()
    }
}

/// Mirror `source` into an owned tree. An absent source yields no mirror.
pub fn build_mirror(source: Option<&dyn SourceTree>) -> Option<MirrorNode> {
    let root = source?;
    let mirror = build_node(root, NodePath::root());
    debug!(
        nodes = mirror.node_count(),
        has_errors = mirror.error_in_subtree,
        "built mirror tree"
    );
    Some(mirror)
}

fn build_node(node: &dyn SourceTree, path: NodePath) -> MirrorNode {
    let mut children = Vec::with_capacity(node.child_count());
    for i in 0..node.child_count() {
        // child_count and child_at disagreeing is a broken source; skip the hole.
        if let Some(child) = node.child_at(i) {
            children.push(build_node(child, path.child(i)));
        }
    }
    let error_in_subtree =
        node.is_error_flagged() || children.iter().any(|c| c.error_in_subtree);
    MirrorNode {
        source: path,
        error_in_subtree,
        children,
    }
}
