//! Domain layer: order keys, nodes and the outline forest
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod order_key;
pub mod reorder;

pub use arena::{Outline, OutlineIter, OutlineNode};
pub use entities::{Node, NodeKind};
pub use error::{DomainError, DomainResult};
pub use order_key::{generate, Alphabet, OrderKey, OrderKeyEngine, BASE, MAX, MID};
pub use reorder::{reorder, sort_by_key, Ordered, Reordered};
