//! Input side of the inspector: the [`SourceTree`] capability trait and a
//! concrete, JSON-loadable parse tree implementing it.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Read-only view of an externally produced syntax tree.
///
/// The inspector never mutates a source tree. Implementations must be
/// shareable across threads because the tree is handed to the UI thread
/// when an inspector is opened.
pub trait SourceTree: Send + Sync {
    fn child_count(&self) -> usize;
    fn child_at(&self, index: usize) -> Option<&dyn SourceTree>;
    fn label(&self) -> NodeLabel<'_>;
    /// True for error leaves and for rule nodes that recorded a recovery exception.
    fn is_error_flagged(&self) -> bool;
}

/// What a node wants to be called. Rule nodes only know their index; the
/// human-readable name comes from [`RuleNames`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeLabel<'a> {
    Rule(usize),
    Text(Cow<'a, str>),
}

/// Ordered rule names of the grammar that produced the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleNames(Vec<String>);

impl RuleNames {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Parse one rule name per line, ignoring blank lines.
    pub fn from_lines(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render a node label to display text. Unknown rule indices fall back
    /// to the decimal index.
    pub fn text_for(&self, label: &NodeLabel<'_>) -> String {
        match label {
            NodeLabel::Rule(idx) => self
                .get(*idx)
                .map(escape_control_chars)
                .unwrap_or_else(|| idx.to_string()),
            NodeLabel::Text(t) => escape_control_chars(t),
        }
    }
}

/// Keep token text on a single line and free of characters XML cannot carry.
/// Other control characters and the noncharacters U+FFFE/U+FFFF become `\u{..}`.
pub fn escape_control_chars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() || c == '\u{fffe}' || c == '\u{ffff}' => {
                out.push_str(&format!("\\u{{{:x}}}", c as u32));
            }
            _ => out.push(c),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// ParseTree – concrete source tree
// ────────────────────────────────────────────────────────────────────────────

/// A parser-produced tree: rule nodes, matched tokens and error tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseTree {
    Rule {
        rule: usize,
        /// Message of the recognition exception the rule recovered from, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exception: Option<String>,
        #[serde(default)]
        children: Vec<ParseTree>,
    },
    Token {
        text: String,
    },
    Error {
        text: String,
    },
}

impl ParseTree {
    pub fn rule(rule: usize, children: Vec<ParseTree>) -> Self {
        ParseTree::Rule {
            rule,
            exception: None,
            children,
        }
    }

    pub fn failed_rule(rule: usize, exception: impl Into<String>, children: Vec<ParseTree>) -> Self {
        ParseTree::Rule {
            rule,
            exception: Some(exception.into()),
            children,
        }
    }

    pub fn token(text: impl Into<String>) -> Self {
        ParseTree::Token { text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        ParseTree::Error { text: text.into() }
    }

    pub fn children(&self) -> &[ParseTree] {
        match self {
            ParseTree::Rule { children, .. } => children,
            _ => &[],
        }
    }
}

impl SourceTree for ParseTree {
    fn child_count(&self) -> usize {
        self.children().len()
    }

    fn child_at(&self, index: usize) -> Option<&dyn SourceTree> {
        self.children().get(index).map(|c| c as &dyn SourceTree)
    }

    fn label(&self) -> NodeLabel<'_> {
        match self {
            ParseTree::Rule { rule, .. } => NodeLabel::Rule(*rule),
            ParseTree::Token { text } | ParseTree::Error { text } => {
                NodeLabel::Text(Cow::Borrowed(text.as_str()))
            }
        }
    }

    fn is_error_flagged(&self) -> bool {
        match self {
            ParseTree::Rule { exception, .. } => exception.is_some(),
            ParseTree::Token { .. } => false,
            ParseTree::Error { .. } => true,
        }
    }
}

/// On-disk document: a tree plus the rule names needed to label it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseTreeDoc {
    #[serde(default)]
    pub rule_names: RuleNames,
    pub root: ParseTree,
}

impl ParseTreeDoc {
    /// Accepts either a full document or a bare root node.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Doc(ParseTreeDoc),
            Bare(ParseTree),
        }
        // Every tree level nests an object and a `children` array; deep
        // grammars easily exceed serde_json's default limit of 128.
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let input = Input::deserialize(&mut de)?;
        de.end()?;
        Ok(match input {
            Input::Doc(doc) => doc,
            Input::Bare(root) => ParseTreeDoc {
                rule_names: RuleNames::default(),
                root,
            },
        })
    }
}
