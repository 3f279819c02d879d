//! Infrastructure layer: the UI tree boundary
//!
//! This layer implements the platform boundary trait elements are built against.

pub mod ui_tree;

pub use ui_tree::{ArenaTree, Mutation, NodeId, UiNode, UiTree};
