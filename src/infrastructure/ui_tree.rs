//! UI tree boundary trait and an in-memory retained-mode implementation
//!
//! Elements only talk to the platform through [`UiTree`], so the core can
//! drive a browser DOM, a native widget tree, or the [`ArenaTree`] used by
//! the CLI and the tests.

use std::cell::RefCell;
use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{instrument, warn};

use crate::domain::is_tag_name;

/// Opaque handle to a node owned by a [`UiTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl NodeId {
    pub fn new(index: Index) -> Self {
        Self(index)
    }

    pub fn index(&self) -> Index {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{slot}.{generation}")
    }
}

/// Platform UI tree abstraction.
pub trait UiTree {
    /// Create a detached node of the given type.
    fn create_node(&self, tag: &str) -> NodeId;

    /// Replace the literal text content of a node.
    fn set_text(&self, node: NodeId, text: &str);

    /// Set the identifier attribute (e.g. the DOM `id`).
    fn set_identifier(&self, node: NodeId, identifier: &str);

    /// Set the class attribute (space-separated class list).
    fn set_class(&self, node: NodeId, class: &str);

    /// Append `child` as the last child of `parent`, moving it if already attached.
    fn append_child(&self, parent: NodeId, child: NodeId);

    /// Detach a node from its parent. The node itself stays valid.
    fn remove_node(&self, node: NodeId);
}

/// Structural call recorded by [`ArenaTree`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { node: NodeId, tag: String },
    Append { parent: NodeId, child: NodeId },
    Remove { node: NodeId },
}

/// A single node of an [`ArenaTree`].
#[derive(Debug, Clone, Default)]
pub struct UiNode {
    pub tag: String,
    pub text: String,
    pub identifier: Option<String>,
    pub class: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct ArenaState {
    arena: Arena<UiNode>,
    journal: Vec<Mutation>,
}

/// Arena-backed retained-mode UI tree.
///
/// Single-threaded: interior mutability lets elements share it behind `Rc`.
#[derive(Debug, Default)]
pub struct ArenaTree {
    state: RefCell<ArenaState>,
}

impl ArenaTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created (attached or not).
    pub fn len(&self) -> usize {
        self.state.borrow().arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, node: NodeId) -> Option<UiNode> {
        self.state.borrow().arena.get(node.0).cloned()
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.node(node).map(|n| n.tag)
    }

    pub fn text(&self, node: NodeId) -> Option<String> {
        self.node(node).map(|n| n.text)
    }

    pub fn identifier(&self, node: NodeId) -> Option<String> {
        self.node(node).and_then(|n| n.identifier)
    }

    pub fn class(&self, node: NodeId) -> Option<String> {
        self.node(node).and_then(|n| n.class)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children).unwrap_or_default()
    }

    /// Every structural call made so far.
    pub fn journal(&self) -> Vec<Mutation> {
        self.state.borrow().journal.clone()
    }

    /// Render the subtree rooted at `node` as indented HTML.
    pub fn to_html(&self, node: NodeId, indent: usize) -> String {
        let mut out = String::new();
        self.write_html(node, indent, 0, &mut out);
        out
    }

    fn write_html(&self, node_id: NodeId, indent: usize, depth: usize, out: &mut String) {
        let Some(node) = self.node(node_id) else {
            return;
        };
        if !is_tag_name(&node.tag) {
            warn!("not rendering node {} with invalid tag {:?}", node_id, node.tag);
            return;
        }
        let pad = " ".repeat(indent * depth);
        out.push_str(&pad);
        out.push('<');
        out.push_str(&node.tag);
        if let Some(identifier) = &node.identifier {
            out.push_str(&format!(" id=\"{}\"", escape_html(identifier)));
        }
        if let Some(class) = &node.class {
            out.push_str(&format!(" class=\"{}\"", escape_html(class)));
        }
        out.push('>');

        if node.children.is_empty() {
            out.push_str(&escape_html(&node.text));
        } else {
            out.push('\n');
            if !node.text.is_empty() {
                out.push_str(&" ".repeat(indent * (depth + 1)));
                out.push_str(&escape_html(&node.text));
                out.push('\n');
            }
            for &child in &node.children {
                self.write_html(child, indent, depth + 1, out);
            }
            out.push_str(&pad);
        }
        out.push_str(&format!("</{}>\n", node.tag));
    }

    /// Build a printable tree of the subtree rooted at `node`.
    pub fn to_tree_string(&self, node: NodeId) -> Tree<String> {
        let Some(data) = self.node(node) else {
            return Tree::new("Empty tree".to_string());
        };
        let leaves: Vec<_> = data
            .children
            .iter()
            .map(|&child| self.to_tree_string(child))
            .collect();
        Tree::new(describe(&data)).with_leaves(leaves)
    }

    fn detach(state: &mut ArenaState, node: NodeId) {
        let parent = state.arena.get(node.0).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = state.arena.get_mut(parent.0) {
                p.children.retain(|&c| c != node);
            }
        }
        if let Some(n) = state.arena.get_mut(node.0) {
            n.parent = None;
        }
    }

    fn is_ancestor(state: &ArenaState, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = state.arena.get(id.0).and_then(|n| n.parent);
        }
        false
    }
}

impl UiTree for ArenaTree {
    #[instrument(level = "trace", skip(self))]
    fn create_node(&self, tag: &str) -> NodeId {
        let mut state = self.state.borrow_mut();
        let node = NodeId(state.arena.insert(UiNode {
            tag: tag.to_string(),
            ..UiNode::default()
        }));
        state.journal.push(Mutation::Create {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn set_text(&self, node: NodeId, text: &str) {
        match self.state.borrow_mut().arena.get_mut(node.0) {
            Some(n) => n.text = text.to_string(),
            None => warn!("set_text on stale node {}", node),
        }
    }

    fn set_identifier(&self, node: NodeId, identifier: &str) {
        match self.state.borrow_mut().arena.get_mut(node.0) {
            Some(n) => n.identifier = Some(identifier.to_string()),
            None => warn!("set_identifier on stale node {}", node),
        }
    }

    fn set_class(&self, node: NodeId, class: &str) {
        match self.state.borrow_mut().arena.get_mut(node.0) {
            Some(n) => n.class = Some(class.to_string()),
            None => warn!("set_class on stale node {}", node),
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut state = self.state.borrow_mut();
        if !state.arena.contains(parent.0) || !state.arena.contains(child.0) {
            warn!("append_child with stale node: {} <- {}", parent, child);
            return;
        }
        if Self::is_ancestor(&state, child, parent) {
            warn!("append_child would create a cycle: {} <- {}", parent, child);
            return;
        }
        Self::detach(&mut state, child);
        if let Some(p) = state.arena.get_mut(parent.0) {
            p.children.push(child);
        }
        if let Some(c) = state.arena.get_mut(child.0) {
            c.parent = Some(parent);
        }
        state.journal.push(Mutation::Append { parent, child });
    }

    #[instrument(level = "trace", skip(self))]
    fn remove_node(&self, node: NodeId) {
        let mut state = self.state.borrow_mut();
        if !state.arena.contains(node.0) {
            warn!("remove_node on stale node {}", node);
            return;
        }
        Self::detach(&mut state, node);
        state.journal.push(Mutation::Remove { node });
    }
}

fn describe(node: &UiNode) -> String {
    let mut label = node.tag.clone();
    if let Some(identifier) = &node.identifier {
        label.push('#');
        label.push_str(identifier);
    }
    if let Some(class) = &node.class {
        for c in class.split_whitespace() {
            label.push('.');
            label.push_str(c);
        }
    }
    if !node.text.is_empty() {
        label.push_str(&format!(" {:?}", node.text));
    }
    label
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_node_when_created_then_detached_with_tag() {
        let tree = ArenaTree::new();
        let node = tree.create_node("section");

        assert_eq!(tree.tag(node).as_deref(), Some("section"));
        assert_eq!(tree.parent(node), None);
        assert!(tree.children(node).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn given_attached_node_when_appended_elsewhere_then_moves() {
        let tree = ArenaTree::new();
        let a = tree.create_node("div");
        let b = tree.create_node("div");
        let c = tree.create_node("span");

        tree.append_child(a, c);
        tree.append_child(b, c);

        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), vec![c]);
        assert_eq!(tree.parent(c), Some(b));
    }

    #[test]
    fn given_ancestor_when_appended_to_descendant_then_ignored() {
        let tree = ArenaTree::new();
        let outer = tree.create_node("div");
        let inner = tree.create_node("div");
        tree.append_child(outer, inner);

        tree.append_child(inner, outer);

        assert_eq!(tree.parent(outer), None);
        assert_eq!(tree.children(outer), vec![inner]);
    }

    #[test]
    fn given_removed_node_when_inspected_then_detached_but_alive() {
        let tree = ArenaTree::new();
        let parent = tree.create_node("ul");
        let child = tree.create_node("li");
        tree.set_text(child, "one");
        tree.append_child(parent, child);

        tree.remove_node(child);

        assert!(tree.children(parent).is_empty());
        assert_eq!(tree.text(child).as_deref(), Some("one"));
        assert_eq!(
            tree.journal().last(),
            Some(&Mutation::Remove { node: child })
        );
    }

    #[test]
    fn given_subtree_when_rendering_html_then_escaped_and_indented() {
        let tree = ArenaTree::new();
        let root = tree.create_node("div");
        tree.set_identifier(root, "main");
        tree.set_class(root, "a b");
        let leaf = tree.create_node("p");
        tree.set_text(leaf, "1 < 2 & \"q\"");
        tree.append_child(root, leaf);

        let html = tree.to_html(root, 2);

        assert_eq!(
            html,
            "<div id=\"main\" class=\"a b\">\n  <p>1 &lt; 2 &amp; &quot;q&quot;</p>\n</div>\n"
        );
    }

    #[test]
    fn given_invalid_tag_when_rendering_html_then_subtree_skipped() {
        let tree = ArenaTree::new();
        let root = tree.create_node("div");
        let bad = tree.create_node("img src=x onerror=alert(1)");
        let inner = tree.create_node("span");
        tree.append_child(bad, inner);
        tree.append_child(root, bad);

        assert_eq!(tree.to_html(root, 2), "<div>\n</div>\n");
        assert_eq!(tree.to_html(tree.create_node(""), 2), "");
    }

    #[test]
    fn given_subtree_when_rendering_tree_then_labels_nodes() {
        let tree = ArenaTree::new();
        let root = tree.create_node("div");
        tree.set_class(root, "box wide");
        let leaf = tree.create_node("span");
        tree.set_text(leaf, "Hi");
        tree.append_child(root, leaf);

        let rendered = tree.to_tree_string(root).to_string();

        assert!(rendered.starts_with("div.box.wide\n"));
        assert!(rendered.contains("span \"Hi\""));
    }
}
