//! kbtree: folders and documents kept in user-defined order by fractional
//! order keys.
//!
//! Layers, innermost first:
//! - [`domain`]: order keys, reordering, nodes and the outline forest (pure)
//! - [`application`]: ordering and outline-file services
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: argument parsing, command dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{generate, reorder, DomainError, OrderKey, OrderKeyEngine, Reordered};
