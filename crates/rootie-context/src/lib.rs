//! Context reconstruction for branching conversations.
//!
//! A turn's context is the fixed system instruction followed by one
//! (user, assistant) pair per ancestor, root first.

mod strategy;
mod ancestor;
mod templates;

pub use strategy::{ContextStrategy, ContextWindow};
pub use ancestor::{ancestor_path, build_context, AncestorPathStrategy};
pub use templates::DEFAULT_SYSTEM_PROMPT;
