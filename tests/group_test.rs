//! Tests for ElementGroup child management

use std::rc::Rc;

use serde_json::json;

use domweave::infrastructure::Mutation;
use domweave::util::testing;
use domweave::{ArenaTree, ConfigurationError, Element, ElementGroup, ElementRef, UiTree};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

struct Fixture {
    arena: Rc<ArenaTree>,
    tree: Rc<dyn UiTree>,
}

impl Fixture {
    fn new() -> Self {
        let arena = Rc::new(ArenaTree::new());
        let tree: Rc<dyn UiTree> = arena.clone();
        Self { arena, tree }
    }

    fn leaf(&self, text: &str) -> Rc<Element> {
        Rc::new(Element::new(self.tree.clone(), &json!({"text": text, "domType": "span"})).unwrap())
    }

    fn group(&self) -> Rc<ElementGroup> {
        Rc::new(ElementGroup::new(self.tree.clone(), &json!({}), Vec::<ElementRef>::new()).unwrap())
    }
}

fn ids(children: &[ElementRef]) -> Vec<String> {
    children.iter().map(|c| c.id().to_string()).collect()
}

#[test]
fn given_initial_children_when_constructing_then_attached_in_order() {
    // Arrange
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let b = fx.leaf("b");

    // Act
    let group = ElementGroup::new(fx.tree.clone(), &json!({"domType": "ul"}), [&a, &b]).unwrap();

    // Assert
    assert_eq!(ids(&group.children()), vec![a.id(), b.id()]);
    assert_eq!(fx.arena.children(group.node()), vec![a.node(), b.node()]);
    assert_eq!(fx.arena.parent(a.node()), Some(group.node()));
    assert_eq!(group.dom_type(), "ul");
}

#[test]
fn given_same_element_twice_when_adding_then_single_entry() {
    let fx = Fixture::new();
    let group = fx.group();
    let a = fx.leaf("a");

    group.add_children([&a, &a]).unwrap();
    group.add_children([&a]).unwrap();

    assert_eq!(group.len(), 1);
    assert_eq!(fx.arena.children(group.node()), vec![a.node()]);
}

#[test]
fn given_successive_additions_when_adding_then_merged_in_append_order() {
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let b = fx.leaf("b");
    let c = fx.leaf("c");
    let group = Rc::new(ElementGroup::new(fx.tree.clone(), &json!({}), [&a]).unwrap());

    group.add_children([&b, &a]).unwrap();
    group.add_children([ElementRef::from(&c)]).unwrap();

    assert_eq!(ids(&group.children()), vec![a.id(), b.id(), c.id()]);
    assert_eq!(
        fx.arena.children(group.node()),
        vec![a.node(), b.node(), c.node()]
    );
}

#[test]
fn given_children_when_looking_up_by_id_then_returns_same_element() {
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let b = fx.leaf("b");
    let group = ElementGroup::new(fx.tree.clone(), &json!({}), [&a, &b]).unwrap();

    let found = group.get_child_by_id(b.id()).unwrap();

    assert_eq!(found, ElementRef::from(&b));
    assert!(group.get_child_by_id("no-such-id").is_none());
}

#[test]
fn given_child_when_removed_then_lookup_fails_and_node_detached() {
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let b = fx.leaf("b");
    let group = ElementGroup::new(fx.tree.clone(), &json!({}), [&a, &b]).unwrap();

    group.remove_children([&a]).unwrap();

    assert!(group.get_child_by_id(a.id()).is_none());
    assert_eq!(ids(&group.children()), vec![b.id()]);
    assert_eq!(fx.arena.children(group.node()), vec![b.node()]);
    assert_eq!(fx.arena.parent(a.node()), None);
}

#[test]
fn given_member_and_non_member_when_removing_then_only_member_removed() {
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let b = fx.leaf("b");
    let elsewhere = fx.group();
    elsewhere.add_children([&b]).unwrap();
    let group = ElementGroup::new(fx.tree.clone(), &json!({}), [&a]).unwrap();

    let result = group.remove_children([&a, &b]);

    assert!(result.is_ok());
    assert!(group.is_empty());
    assert_eq!(fx.arena.parent(b.node()), Some(elsewhere.node()));
    assert_eq!(elsewhere.len(), 1);
}

#[test]
fn given_empty_group_when_removing_then_noop() {
    let fx = Fixture::new();
    let group = fx.group();
    let a = fx.leaf("a");
    let before = fx.arena.journal().len();

    group.remove_children([&a]).unwrap();

    assert_eq!(fx.arena.journal().len(), before);
}

#[test]
fn given_removals_when_chaining_then_returns_group() {
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let b = fx.leaf("b");
    let c = fx.leaf("c");
    let group = ElementGroup::new(fx.tree.clone(), &json!({}), [&a, &b, &c]).unwrap();

    let remaining = group
        .remove_children([&a])
        .and_then(|g| g.remove_children([&c]))
        .map(|g| g.children())
        .unwrap();

    assert_eq!(ids(&remaining), vec![b.id()]);
}

#[test]
fn given_removed_child_when_re_added_then_appended_at_end() {
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let b = fx.leaf("b");
    let group = ElementGroup::new(fx.tree.clone(), &json!({}), [&a, &b]).unwrap();

    group.remove_children([&a]).unwrap();
    group.add_children([&a]).unwrap();

    assert_eq!(ids(&group.children()), vec![b.id(), a.id()]);
    assert_eq!(fx.arena.children(group.node()), vec![b.node(), a.node()]);
}

#[test]
fn given_element_from_other_tree_when_adding_then_configuration_error() {
    let fx = Fixture::new();
    let other = Fixture::new();
    let group = fx.group();
    let foreign = other.leaf("x");

    let err = group.add_children([&foreign]).unwrap_err();

    assert_eq!(
        err,
        ConfigurationError::ForeignElement {
            id: foreign.id().to_string()
        }
    );
}

#[test]
fn given_element_from_other_tree_when_removing_then_configuration_error() {
    let fx = Fixture::new();
    let other = Fixture::new();
    let a = fx.leaf("a");
    let group = ElementGroup::new(fx.tree.clone(), &json!({}), [&a]).unwrap();
    let foreign = other.leaf("x");

    let result = group.remove_children([&a, &foreign]);

    assert!(matches!(result, Err(ConfigurationError::ForeignElement { .. })));
    assert_eq!(group.len(), 1, "nothing removed when validation fails");
}

#[test]
fn given_nested_groups_when_listing_descendants_then_pre_order() {
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let b = fx.leaf("b");
    let inner = Rc::new(ElementGroup::new(fx.tree.clone(), &json!({}), [&a]).unwrap());
    let outer = ElementGroup::new(
        fx.tree.clone(),
        &json!({}),
        [ElementRef::from(&inner), ElementRef::from(&b)],
    )
    .unwrap();

    let descendants = outer.descendants();

    assert_eq!(ids(&descendants), vec![inner.id(), a.id(), b.id()]);
}

#[test]
fn given_group_when_adding_then_journal_records_appends() {
    let fx = Fixture::new();
    let a = fx.leaf("a");
    let group = fx.group();

    group.add_children([&a]).unwrap();

    assert_eq!(
        fx.arena.journal().last(),
        Some(&Mutation::Append {
            parent: group.node(),
            child: a.node()
        })
    );
}
