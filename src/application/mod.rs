//! Application layer: elements, groups and the document builder
//!
//! This layer builds element trees against the UI tree boundary trait.

pub mod document;
pub mod element;
pub mod group;

pub use document::{DocumentBuilder, DEFAULT_MAX_DEPTH};
pub use element::Element;
pub use group::{ElementGroup, ElementRef};
