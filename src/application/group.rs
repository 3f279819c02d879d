//! Element groups: elements that own an ordered set of child elements.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::application::element::Element;
use crate::domain::{ConfigResult, ConfigurationError};
use crate::infrastructure::{NodeId, UiTree};

/// Shared reference to either kind of element, as held in a group's child list.
///
/// Equality is identity: two refs are equal when they point at the same element.
#[derive(Clone)]
pub enum ElementRef {
    Leaf(Rc<Element>),
    Group(Rc<ElementGroup>),
}

impl ElementRef {
    pub fn element(&self) -> &Element {
        match self {
            Self::Leaf(element) => element,
            Self::Group(group) => &group.element,
        }
    }

    pub fn id(&self) -> &str {
        self.element().id()
    }

    pub fn node(&self) -> NodeId {
        self.element().node()
    }

    pub fn as_group(&self) -> Option<&Rc<ElementGroup>> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }

    pub fn is_same(&self, other: &ElementRef) -> bool {
        std::ptr::eq(self.element(), other.element())
    }
}

impl PartialEq for ElementRef {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for ElementRef {}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(element) => f.debug_tuple("Leaf").field(element).finish(),
            Self::Group(group) => f.debug_tuple("Group").field(group).finish(),
        }
    }
}

impl From<Rc<Element>> for ElementRef {
    fn from(element: Rc<Element>) -> Self {
        Self::Leaf(element)
    }
}

impl From<&Rc<Element>> for ElementRef {
    fn from(element: &Rc<Element>) -> Self {
        Self::Leaf(Rc::clone(element))
    }
}

impl From<Rc<ElementGroup>> for ElementRef {
    fn from(group: Rc<ElementGroup>) -> Self {
        Self::Group(group)
    }
}

impl From<&Rc<ElementGroup>> for ElementRef {
    fn from(group: &Rc<ElementGroup>) -> Self {
        Self::Group(Rc::clone(group))
    }
}

impl From<&ElementRef> for ElementRef {
    fn from(element: &ElementRef) -> Self {
        element.clone()
    }
}

/// An [`Element`] that also manages child elements.
///
/// Every child's node is appended to the group's node in the UI tree, in the
/// order the children were added. The group decides attachment; it does not
/// own the children's lifetime, callers can keep their own `Rc`s.
pub struct ElementGroup {
    element: Element,
    children: RefCell<Vec<ElementRef>>,
}

impl Deref for ElementGroup {
    type Target = Element;

    fn deref(&self) -> &Element {
        &self.element
    }
}

impl ElementGroup {
    /// Build the group's own element, then add `elements` as its children.
    #[instrument(level = "debug", skip(tree, elements))]
    pub fn new<I>(tree: Rc<dyn UiTree>, options: &Value, elements: I) -> ConfigResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let group = Self {
            element: Element::new(tree, options)?,
            children: RefCell::new(Vec::new()),
        };
        group.add_children(elements)?;
        Ok(group)
    }

    /// Current children, in insertion order.
    pub fn children(&self) -> Vec<ElementRef> {
        self.children.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Add children to the group.
    ///
    /// Merging, not replacing: duplicates inside `elements` are collapsed and
    /// elements that are already children are skipped. New children are
    /// attached in order. The whole batch is validated before anything is
    /// attached.
    ///
    /// # Errors
    /// [`ConfigurationError::ForeignElement`] for an element from another UI
    /// tree, [`ConfigurationError::CyclicChild`] for the group itself or one of
    /// its ancestors.
    #[instrument(level = "debug", skip_all, fields(group = %self.id()))]
    pub fn add_children<I>(&self, elements: I) -> ConfigResult<()>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let incoming: Vec<ElementRef> = elements.into_iter().map(Into::into).collect();
        for item in &incoming {
            self.check_same_tree(item)?;
            self.check_acyclic(item)?;
        }

        let mut unique: Vec<ElementRef> = Vec::with_capacity(incoming.len());
        for item in incoming {
            if !unique.iter().any(|u| u.is_same(&item)) {
                unique.push(item);
            }
        }

        let mut children = self.children.borrow_mut();
        for item in unique {
            if children.iter().any(|c| c.is_same(&item)) {
                trace!("{} already a child, skipping", item.id());
                continue;
            }
            self.tree().append_child(self.node(), item.node());
            debug!("attached {}", item.id());
            children.push(item);
        }
        Ok(())
    }

    /// First child with the given generated id.
    pub fn get_child_by_id(&self, child_id: &str) -> Option<ElementRef> {
        self.children
            .borrow()
            .iter()
            .find(|c| c.id() == child_id)
            .cloned()
    }

    /// Detach the given elements from the group.
    ///
    /// Elements that are not children of this group are ignored. Returns the
    /// group so calls can be chained.
    ///
    /// # Errors
    /// [`ConfigurationError::ForeignElement`] for an element from another UI tree.
    #[instrument(level = "debug", skip_all, fields(group = %self.id()))]
    pub fn remove_children<I>(&self, elements: I) -> ConfigResult<&Self>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let outgoing: Vec<ElementRef> = elements.into_iter().map(Into::into).collect();
        for item in &outgoing {
            self.check_same_tree(item)?;
        }
        if self.is_empty() {
            return Ok(self);
        }

        let mut children = self.children.borrow_mut();
        for item in outgoing {
            match children.iter().position(|c| c.id() == item.id()) {
                Some(pos) => {
                    let removed = children.remove(pos);
                    self.tree().remove_node(removed.node());
                    debug!("detached {}", removed.id());
                }
                None => trace!("{} is not a child, ignoring", item.id()),
            }
        }
        Ok(self)
    }

    /// All descendants in depth-first pre-order.
    pub fn descendants(&self) -> Vec<ElementRef> {
        let mut out = Vec::new();
        for child in self.children.borrow().iter() {
            out.push(child.clone());
            if let Some(group) = child.as_group() {
                out.extend(group.descendants());
            }
        }
        out
    }

    fn check_same_tree(&self, item: &ElementRef) -> ConfigResult<()> {
        if item.element().same_tree(self.tree()) {
            Ok(())
        } else {
            Err(ConfigurationError::ForeignElement {
                id: item.id().to_string(),
            })
        }
    }

    fn check_acyclic(&self, item: &ElementRef) -> ConfigResult<()> {
        if let Some(group) = item.as_group() {
            if std::ptr::eq(Rc::as_ptr(group), self) || group.contains_group(self) {
                return Err(ConfigurationError::CyclicChild {
                    id: item.id().to_string(),
                });
            }
        }
        Ok(())
    }

    fn contains_group(&self, target: &ElementGroup) -> bool {
        self.children.borrow().iter().any(|child| match child {
            ElementRef::Group(group) => {
                std::ptr::eq(Rc::as_ptr(group), target) || group.contains_group(target)
            }
            ElementRef::Leaf(_) => false,
        })
    }
}

impl fmt::Debug for ElementGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementGroup")
            .field("element", &self.element)
            .field("children", &self.children.borrow().len())
            .finish()
    }
}
