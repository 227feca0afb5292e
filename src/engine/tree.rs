//! Concrete syntax trees
//!
//! [`TreeBuilder`] records one node per named rule that matched outside of a
//! lookahead. Nodes of rules that fail are thrown away together with their
//! children, so the finished [`ParseTree`] only holds what the successful
//! parse actually consumed, in left-to-right order.

use super::cursor::Position;
use super::grammar::{Grammar, Rule, RuleId};
use super::matcher::{MatchEvent, MatchObserver};
use serde::Serialize;
use std::fmt::{self, Write};

/// A node of a finished tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// The rule, `None` for the synthetic root
    pub rule: Option<RuleId>,
    /// Rule name, `ROOT` for the synthetic root
    pub name: String,
    /// Start of the match
    pub start: Position,
    /// End of the match
    pub end: Position,
    /// Matched text
    pub text: String,
    /// Parent node index
    pub parent: Option<usize>,
    /// Child node indices in match order
    pub children: Vec<usize>,
}

/// A finished tree; node 0 is a synthetic root holding the top-level matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    nodes: Vec<TreeNode>,
}

impl ParseTree {
    /// Index of the synthetic root
    pub const ROOT: usize = 0;

    /// Node by index
    pub fn node(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// Children of a node
    pub fn children(&self, index: usize) -> impl Iterator<Item = &TreeNode> {
        self.nodes
            .get(index)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&c| self.nodes.get(c))
    }

    /// Number of nodes, including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds only the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// All nodes named `name`, in document order
    pub fn find_all(&self, name: &str) -> Vec<&TreeNode> {
        let mut found = Vec::new();
        self.collect(Self::ROOT, name, &mut found);
        found
    }

    /// Matched texts of all nodes named `name`, in document order
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.find_all(name)
            .into_iter()
            .map(|n| n.text.as_str())
            .collect()
    }

    fn collect<'t>(&'t self, index: usize, name: &str, found: &mut Vec<&'t TreeNode>) {
        let Some(node) = self.nodes.get(index) else {
            return;
        };
        if node.rule.is_some() && node.name == name {
            found.push(node);
        }
        for &child in &node.children {
            self.collect(child, name, found);
        }
    }

    /// Graphviz description of the tree
    pub fn write_dot<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "digraph parse_tree")?;
        writeln!(out, "{{")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.rule.is_none() {
                writeln!(out, "  x{} [ label=\"{}\" ]", i, node.name)?;
            } else {
                writeln!(
                    out,
                    "  x{} [ label=\"{}\\n\\\"{}\\\"\" ]",
                    i,
                    escape_dot(&node.name),
                    escape_dot(&node.text)
                )?;
            }
            if !node.children.is_empty() {
                let targets: Vec<String> =
                    node.children.iter().map(|c| format!("x{}", c)).collect();
                writeln!(out, "  x{} -> {{ {} }}", i, targets.join(" "))?;
            }
        }
        writeln!(out, "}}")
    }

    /// Graphviz description of the tree as a string
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = self.write_dot(&mut out);
        out
    }
}

/// Escape text for a double-quoted DOT label
pub fn escape_dot(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\\\r"),
            '\t' => out.push_str("\\\\t"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug)]
struct Draft {
    rule: RuleId,
    name: String,
    start: Position,
    end: Position,
    text: String,
    children: Vec<Draft>,
}

#[derive(Debug)]
struct Frame {
    rule: RuleId,
    children: Vec<Draft>,
}

/// Builds a [`ParseTree`] while matching
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Frame>,
    top: Vec<Draft>,
    // drafts already recorded when each open rule was entered
    marks: Vec<usize>,
}

impl TreeBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn tracks(grammar: &Grammar, event: &MatchEvent<'_>) -> bool {
        !event.in_predicate && matches!(grammar.get(event.rule), Some(Rule::Named { .. }))
    }

    fn sink(&mut self) -> &mut Vec<Draft> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.top,
        }
    }

    /// Flatten everything recorded so far into a tree
    pub fn finish(self) -> ParseTree {
        let mut nodes = vec![TreeNode {
            rule: None,
            name: "ROOT".to_string(),
            start: Position::start(),
            end: Position::start(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }];
        if let (Some(first), Some(last)) = (self.top.first(), self.top.last()) {
            nodes[0].start = first.start;
            nodes[0].end = last.end;
        }
        for draft in self.top {
            let index = flatten(draft, ParseTree::ROOT, &mut nodes);
            nodes[ParseTree::ROOT].children.push(index);
        }
        ParseTree { nodes }
    }
}

fn flatten(draft: Draft, parent: usize, nodes: &mut Vec<TreeNode>) -> usize {
    let index = nodes.len();
    nodes.push(TreeNode {
        rule: Some(draft.rule),
        name: draft.name,
        start: draft.start,
        end: draft.end,
        text: draft.text,
        parent: Some(parent),
        children: Vec::with_capacity(draft.children.len()),
    });
    for child in draft.children {
        let child_index = flatten(child, index, nodes);
        nodes[index].children.push(child_index);
    }
    index
}

impl MatchObserver for TreeBuilder {
    fn on_enter(&mut self, grammar: &Grammar, event: &MatchEvent<'_>) {
        if event.in_predicate {
            return;
        }
        let mark = self.sink().len();
        self.marks.push(mark);
        if Self::tracks(grammar, event) {
            self.stack.push(Frame {
                rule: event.rule,
                children: Vec::new(),
            });
        }
    }

    fn on_success(&mut self, grammar: &Grammar, event: &MatchEvent<'_>) {
        if event.in_predicate {
            return;
        }
        self.marks.pop();
        if !Self::tracks(grammar, event) {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        debug_assert_eq!(frame.rule, event.rule);
        let draft = Draft {
            rule: frame.rule,
            name: grammar.label(frame.rule),
            start: event.start,
            end: event.end,
            text: String::from_utf8_lossy(&event.input[event.start.offset..event.end.offset])
                .into_owned(),
            children: frame.children,
        };
        self.sink().push(draft);
    }

    fn on_failure(&mut self, grammar: &Grammar, event: &MatchEvent<'_>) {
        if event.in_predicate {
            return;
        }
        if Self::tracks(grammar, event) {
            self.stack.pop();
        }
        // an anonymous rule can fail after some of its named parts matched
        if let Some(mark) = self.marks.pop() {
            self.sink().truncate(mark);
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.top.clear();
        self.marks.clear();
    }
}
