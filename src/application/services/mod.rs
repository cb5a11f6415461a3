//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod ordering;
mod outline;

pub use ordering::OrderingService;
pub use outline::{OutlineFile, OutlineService, Violation};
