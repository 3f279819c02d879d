//! Leaf element: one configured UI node with a generated identifier.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::{generate_id, ConfigResult, ElementOptions, IdPolicy};
use crate::infrastructure::{NodeId, UiTree};

/// A single UI node plus the options it was built from.
///
/// The node is created once in [`Element::new`] and never replaced; the
/// generated `id` is likewise fixed for the element's lifetime.
pub struct Element {
    options: ElementOptions,
    id: String,
    identifier: Option<String>,
    node: NodeId,
    tree: Rc<dyn UiTree>,
}

impl Element {
    /// Build an element from a JSON options object.
    ///
    /// Recognized keys: `name`, `classes`, `id`, `domType`, `text`. Any other
    /// key is ignored, so node descriptions can be passed in as they are.
    ///
    /// # Errors
    /// [`ConfigurationError`](crate::domain::ConfigurationError) when `options`
    /// is not an object or a recognized option has the wrong type.
    #[instrument(level = "debug", skip(tree))]
    pub fn new(tree: Rc<dyn UiTree>, options: &Value) -> ConfigResult<Self> {
        let options = ElementOptions::parse(options)?;
        let id = generate_id();
        let (node, identifier) = materialize(tree.as_ref(), &options, &id)?;
        debug!("element {} materialized as {}", id, node);

        Ok(Self {
            options,
            id,
            identifier,
            node,
            tree,
        })
    }

    /// Generated identifier used for lookup and removal.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The materialized UI node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn classes(&self) -> &[String] {
        &self.options.classes
    }

    pub fn dom_type(&self) -> &str {
        &self.options.dom_type
    }

    pub fn text(&self) -> &str {
        &self.options.text
    }

    /// Identifier attribute written to the node, if the `id` option asked for one.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub(crate) fn tree(&self) -> &Rc<dyn UiTree> {
        &self.tree
    }

    pub(crate) fn same_tree(&self, tree: &Rc<dyn UiTree>) -> bool {
        Rc::as_ptr(&self.tree) as *const () == Rc::as_ptr(tree) as *const ()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn materialize(
    tree: &dyn UiTree,
    options: &ElementOptions,
    id: &str,
) -> ConfigResult<(NodeId, Option<String>)> {
    // id was type-checked during parsing; checked again before touching the tree
    let policy = IdPolicy::resolve(&options.id)?;
    let identifier = policy.attribute(&options.name, id);

    let node = tree.create_node(&options.dom_type);
    tree.set_text(node, &options.text);
    if let Some(identifier) = &identifier {
        tree.set_identifier(node, identifier);
    }
    if let Some(class) = options.class_attribute() {
        tree.set_class(node, &class);
    }
    Ok((node, identifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigurationError;
    use crate::infrastructure::ArenaTree;
    use serde_json::json;

    fn arena() -> (Rc<ArenaTree>, Rc<dyn UiTree>) {
        let arena = Rc::new(ArenaTree::new());
        let tree: Rc<dyn UiTree> = arena.clone();
        (arena, tree)
    }

    #[test]
    fn given_null_id_when_materializing_then_errors_before_creating_node() {
        let (arena, tree) = arena();
        let options = ElementOptions {
            id: Value::Null,
            ..ElementOptions::default()
        };

        let result = materialize(tree.as_ref(), &options, "abc");

        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::InvalidIdOption {
                found: "null".to_string()
            }
        );
        assert!(arena.is_empty());
    }

    #[test]
    fn given_element_when_reading_id_then_stable() {
        let (_arena, tree) = arena();
        let element = Element::new(tree, &json!({})).unwrap();

        let first = element.id().to_string();
        assert!(!first.is_empty());
        assert_eq!(element.id(), first);
    }

    #[test]
    fn given_two_trees_when_comparing_then_not_same_tree() {
        let (_a, tree_a) = arena();
        let (_b, tree_b) = arena();
        let element = Element::new(tree_a.clone(), &json!({})).unwrap();

        assert!(element.same_tree(&tree_a));
        assert!(!element.same_tree(&tree_b));
    }
}
