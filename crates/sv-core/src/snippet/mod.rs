//! Snippet domain model.

mod model;

pub use model::{Snippet, Tag};
