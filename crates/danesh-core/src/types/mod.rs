//! Core types for danesh.

mod document;
mod message;

pub use document::*;
pub use message::*;
