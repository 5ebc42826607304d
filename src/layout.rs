//! Deterministic top-down layout for the rendered tree view.
//!
//! Every node is a single-line text box. Leaves are packed left to right,
//! parents are centered over their children and each depth level gets its
//! own row. All distances scale linearly with the view scale so a layout at
//! scale 2.0 is exactly twice as large as one at 1.0.
//!
//! Glossary:
//! - Subtree width: horizontal extent reserved for a node and all its
//!   descendants, including the gaps between sibling subtrees.

use crate::path::NodePath;
use crate::source::{RuleNames, SourceTree};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub min: Vec2f,
    pub max: Vec2f,
}

impl RectF {
    pub fn from_min_max(min: Vec2f, max: Vec2f) -> Self {
        Self { min, max }
    }
    pub fn center(&self) -> Vec2f {
        Vec2f::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
    pub fn contains(&self, p: Vec2f) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

pub trait Measurer {
    /// Return the size (width, height) of `text` rendered at `font_size`.
    fn measure(&self, text: &str, font_size: f32) -> (f32, f32);
}

/// Font-independent measurer: average glyph advance of 0.6 em, line height 1.2 em.
///
/// Used for both on-screen drawing and export so that both agree on
/// geometry without touching a font database.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasurer;

impl Measurer for ApproxMeasurer {
    fn measure(&self, text: &str, font_size: f32) -> (f32, f32) {
        let n = text.chars().count().max(1) as f32;
        (n * font_size * 0.6, font_size * 1.2)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub font_size: f32,
    pub level_gap: f32,
    pub node_gap: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            level_gap: 17.0,
            node_gap: 7.0,
            pad_x: 2.0,
            pad_y: 1.0,
        }
    }
}

impl Config {
    pub fn scaled(scale: f32) -> Self {
        let d = Self::default();
        Self {
            font_size: d.font_size * scale,
            level_gap: d.level_gap * scale,
            node_gap: d.node_gap * scale,
            pad_x: d.pad_x * scale,
            pad_y: d.pad_y * scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutNode {
    pub path: NodePath,
    pub text: String,
    pub rect: RectF,
    /// The node itself is an error (not merely an ancestor of one).
    pub flagged: bool,
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    pub nodes: Vec<LaidOutNode>,
    pub size: Vec2f,
    pub font_size: f32,
}

impl TreeLayout {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            size: Vec2f::new(0.0, 0.0),
            font_size: Config::default().font_size,
        }
    }

    /// (parent rect, child rect) pairs.
    pub fn edges(&self) -> impl Iterator<Item = (RectF, RectF)> + '_ {
        self.nodes
            .iter()
            .filter_map(|n| n.parent.map(|p| (self.nodes[p].rect, n.rect)))
    }

    /// Node whose box contains `p`. Boxes never overlap.
    pub fn node_at(&self, p: Vec2f) -> Option<&LaidOutNode> {
        self.nodes.iter().find(|n| n.rect.contains(p))
    }
}

struct Measured {
    text: String,
    flagged: bool,
    w: f32,
    subtree_w: f32,
    children: Vec<Measured>,
}

fn measure_rec(
    node: &dyn SourceTree,
    rule_names: &RuleNames,
    measurer: &dyn Measurer,
    cfg: &Config,
) -> Measured {
    let text = rule_names.text_for(&node.label());
    let (tw, _) = measurer.measure(&text, cfg.font_size);
    let w = tw + 2.0 * cfg.pad_x;
    let children: Vec<Measured> = (0..node.child_count())
        .filter_map(|i| node.child_at(i))
        .map(|c| measure_rec(c, rule_names, measurer, cfg))
        .collect();
    let children_w = children.iter().map(|c| c.subtree_w).sum::<f32>()
        + cfg.node_gap * children.len().saturating_sub(1) as f32;
    Measured {
        text,
        flagged: node.is_error_flagged(),
        w,
        subtree_w: w.max(children_w),
        children,
    }
}

/// Lay out the subtree of `root` addressed by `focus`.
///
/// Returns an empty layout when `focus` no longer resolves.
pub fn layout_tree(
    root: &dyn SourceTree,
    focus: &NodePath,
    rule_names: &RuleNames,
    measurer: &dyn Measurer,
    cfg: Config,
) -> TreeLayout {
    let Some(top) = focus.resolve(root) else {
        return TreeLayout::empty();
    };
    let measured = measure_rec(top, rule_names, measurer, &cfg);
    let (_, text_h) = measurer.measure("X", cfg.font_size);
    let node_h = text_h + 2.0 * cfg.pad_y;
    let margin = cfg.node_gap;

    let mut nodes = Vec::new();
    let mut max_depth = 0usize;
    let mut stack: Vec<(&Measured, NodePath, f32, usize, Option<usize>)> =
        vec![(&measured, focus.clone(), margin, 0, None)];
    // Pre-order with an explicit stack; children pushed in reverse keep index order.
    while let Some((m, path, left, depth, parent)) = stack.pop() {
        max_depth = max_depth.max(depth);
        let cx = left + m.subtree_w * 0.5;
        let y = margin + depth as f32 * (node_h + cfg.level_gap);
        let rect = RectF::from_min_max(
            Vec2f::new(cx - m.w * 0.5, y),
            Vec2f::new(cx + m.w * 0.5, y + node_h),
        );
        let idx = nodes.len();
        nodes.push(LaidOutNode {
            path: path.clone(),
            text: m.text.clone(),
            rect,
            flagged: m.flagged,
            parent,
        });
        let children_w = m.children.iter().map(|c| c.subtree_w).sum::<f32>()
            + cfg.node_gap * m.children.len().saturating_sub(1) as f32;
        let mut x = left + (m.subtree_w - children_w) * 0.5;
        let mut placed = Vec::with_capacity(m.children.len());
        for (i, c) in m.children.iter().enumerate() {
            placed.push((c, path.child(i), x, depth + 1, Some(idx)));
            x += c.subtree_w + cfg.node_gap;
        }
        stack.extend(placed.into_iter().rev());
    }

    let levels = (max_depth + 1) as f32;
    let size = Vec2f::new(
        measured.subtree_w + 2.0 * margin,
        2.0 * margin + levels * node_h + (levels - 1.0) * cfg.level_gap,
    );
    TreeLayout {
        nodes,
        size,
        font_size: cfg.font_size,
    }
}
