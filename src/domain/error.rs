//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent ordering and outline rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid order key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("order keys out of order: {before:?} must sort below {after:?}")]
    OutOfOrder { before: String, after: String },

    #[error("no order key sorts below {0:?}")]
    NoRoomBefore(String),

    #[error("no order key sorts between {before:?} and {after:?}")]
    NoRoomBetween { before: String, after: String },

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("no sibling named to move {0} next to")]
    NoNeighbour(String),

    #[error("order key {key:?} of {id} is already taken in its sibling group")]
    KeyCollision { key: String, id: String },

    #[error("parent not found: {0}")]
    ParentNotFound(String),

    #[error("parent is not a folder: {0}")]
    ParentNotFolder(String),

    #[error("invalid node name: {0}")]
    InvalidName(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
