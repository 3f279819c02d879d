//! Build retained-mode UI trees from declarative JSON documents.
//!
//! A document is a tree of `"group"` and `"child"` nodes. [`DocumentBuilder`]
//! turns it into [`ElementGroup`]s and [`Element`]s, each of which owns one
//! node of a [`UiTree`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{DocumentBuilder, Element, ElementGroup, ElementRef};
pub use domain::{ConfigResult, ConfigurationError};
pub use infrastructure::{ArenaTree, NodeId, UiTree};
