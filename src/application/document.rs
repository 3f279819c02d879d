//! Document builder: JSON node descriptions to element trees.

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::element::Element;
use crate::application::group::{ElementGroup, ElementRef};
use crate::domain::{validate_options, ConfigResult, ConfigurationError, OptionRule, OptionType};
use crate::infrastructure::{NodeId, UiTree};

/// Maximum nesting depth accepted unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 64;

const GROUP_OPTIONS: &[OptionRule<'static>] = &[("children", &[OptionType::Array])];

/// Builds an element tree from a JSON document.
///
/// The document is one node object or an array of them. Every top-level node
/// must be a `"group"`; nested nodes are `"group"` or `"child"`. Groups are
/// built depth-first: all descendants exist before their group attaches them.
#[derive(Debug)]
pub struct DocumentBuilder {
    data: Vec<Value>,
    roots: Vec<Rc<ElementGroup>>,
    root: Rc<ElementGroup>,
}

impl DocumentBuilder {
    pub fn new(tree: Rc<dyn UiTree>, json: Value) -> ConfigResult<Self> {
        Self::with_max_depth(tree, json, DEFAULT_MAX_DEPTH)
    }

    /// Parse `text` as JSON and build it.
    pub fn from_json_str(tree: Rc<dyn UiTree>, text: &str, max_depth: usize) -> ConfigResult<Self> {
        let json: Value = serde_json::from_str(text)?;
        Self::with_max_depth(tree, json, max_depth)
    }

    /// Build `json`, rejecting documents nested deeper than `max_depth`.
    ///
    /// On failure nothing is rolled back: nodes created for subtrees built
    /// before the error stay in the UI tree, unattached.
    #[instrument(level = "debug", skip(tree, json))]
    pub fn with_max_depth(tree: Rc<dyn UiTree>, json: Value, max_depth: usize) -> ConfigResult<Self> {
        let data = match json {
            Value::Array(nodes) => nodes,
            single => vec![single],
        };
        check_top_level(&data)?;

        let walker = TreeWalker { tree, max_depth };
        let roots: Vec<Rc<ElementGroup>> = walker
            .build_nodes(&data, 1)?
            .into_iter()
            .filter_map(|built| built.as_group().cloned())
            .collect();
        let root = roots
            .first()
            .cloned()
            .ok_or(ConfigurationError::EmptyDocument)?;
        debug!("built {} top-level group(s), root {}", roots.len(), root.id());

        Ok(Self { data, roots, root })
    }

    /// The validated input nodes.
    pub fn data(&self) -> &[Value] {
        &self.data
    }

    /// The first top-level group.
    pub fn root(&self) -> &Rc<ElementGroup> {
        &self.root
    }

    /// Every top-level group, in input order.
    pub fn roots(&self) -> &[Rc<ElementGroup>] {
        &self.roots
    }

    /// The root's UI node.
    pub fn dom_element(&self) -> NodeId {
        self.root.node()
    }

    /// Number of elements built across all top-level groups.
    pub fn element_count(&self) -> usize {
        self.roots.iter().map(|r| 1 + r.descendants().len()).sum()
    }
}

fn check_top_level(nodes: &[Value]) -> ConfigResult<()> {
    if nodes.is_empty() {
        return Err(ConfigurationError::EmptyDocument);
    }
    for node in nodes {
        if !node.is_object() {
            return Err(ConfigurationError::NotAnObject {
                context: "top-level node".to_string(),
                found: OptionType::of(node).to_string(),
            });
        }
        if node.get("type").and_then(Value::as_str) != Some("group") {
            return Err(ConfigurationError::TopLevelNotGroup {
                found: type_label(node),
            });
        }
    }
    Ok(())
}

fn type_label(node: &Value) -> String {
    match node.get("type") {
        Some(kind) => kind.to_string(),
        None => "no type".to_string(),
    }
}

struct TreeWalker {
    tree: Rc<dyn UiTree>,
    max_depth: usize,
}

impl TreeWalker {
    #[instrument(level = "trace", skip(self, nodes))]
    fn build_nodes(&self, nodes: &[Value], depth: usize) -> ConfigResult<Vec<ElementRef>> {
        let mut built = Vec::with_capacity(nodes.len());
        for node in nodes {
            if depth > self.max_depth {
                return Err(ConfigurationError::DepthExceeded {
                    max_depth: self.max_depth,
                });
            }
            if !node.is_object() {
                return Err(ConfigurationError::NotAnObject {
                    context: "node".to_string(),
                    found: OptionType::of(node).to_string(),
                });
            }
            match node.get("type").and_then(Value::as_str) {
                Some("group") => {
                    validate_options(node, GROUP_OPTIONS)?;
                    let children = match node.get("children") {
                        Some(Value::Array(children)) => self.build_nodes(children, depth + 1)?,
                        _ => Vec::new(),
                    };
                    let group = ElementGroup::new(Rc::clone(&self.tree), node, children)?;
                    built.push(ElementRef::Group(Rc::new(group)));
                }
                Some("child") => {
                    let element = Element::new(Rc::clone(&self.tree), node)?;
                    built.push(ElementRef::Leaf(Rc::new(element)));
                }
                _ => {
                    return Err(ConfigurationError::UnknownNodeType {
                        found: type_label(node),
                    })
                }
            }
        }
        Ok(built)
    }
}
