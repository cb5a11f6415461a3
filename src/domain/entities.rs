//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::order_key::OrderKey;
use crate::domain::reorder::Ordered;

/// What a node in the knowledge base holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Container for other nodes
    Folder,
    /// Leaf holding a document
    Doc,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Folder => f.write_str("folder"),
            NodeKind::Doc => f.write_str("doc"),
        }
    }
}

impl FromStr for NodeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "folder" => Ok(NodeKind::Folder),
            "doc" | "document" => Ok(NodeKind::Doc),
            other => Err(DomainError::InvalidName(format!("unknown node kind: {other}"))),
        }
    }
}

/// Folder or document in the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    /// None for top-level nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub order_key: OrderKey,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a node with a fresh id; the name is trimmed.
    pub fn new(
        kind: NodeKind,
        name: &str,
        parent_id: Option<String>,
        order_key: OrderKey,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidName("name is required".to_string()));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            kind,
            name: name.to_string(),
            parent_id,
            order_key,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// True if this node belongs to the sibling group of `parent_id`.
    pub fn is_child_of(&self, parent_id: Option<&str>) -> bool {
        self.parent_id.as_deref() == parent_id
    }
}

impl Ordered for Node {
    fn id(&self) -> &str {
        &self.id
    }

    fn order_key(&self) -> &OrderKey {
        &self.order_key
    }

    fn set_order_key(&mut self, key: OrderKey) {
        self.order_key = key;
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Folder => write!(f, "{}/", self.name),
            NodeKind::Doc => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_padded_name_when_creating_node_then_trims_and_assigns_id() {
        let node = Node::new(NodeKind::Doc, "  Notes  ", None, OrderKey::parse("a").unwrap())
            .unwrap();

        assert_eq!(node.name, "Notes");
        assert!(Uuid::parse_str(&node.id).is_ok());
        assert_eq!(node.created_at, node.updated_at);
    }

    #[test]
    fn given_blank_name_when_creating_node_then_rejects() {
        let result = Node::new(NodeKind::Folder, "   ", None, OrderKey::parse("a").unwrap());
        assert!(matches!(result, Err(DomainError::InvalidName(_))));
    }

    #[test]
    fn given_kind_strings_when_parsing_then_accepts_aliases() {
        assert_eq!("Folder".parse::<NodeKind>().unwrap(), NodeKind::Folder);
        assert_eq!("document".parse::<NodeKind>().unwrap(), NodeKind::Doc);
        assert!("page".parse::<NodeKind>().is_err());
    }

    #[test]
    fn given_folder_when_displayed_then_has_trailing_slash() {
        let node = Node::new(NodeKind::Folder, "Projects", None, OrderKey::parse("a").unwrap())
            .unwrap();
        assert_eq!(node.to_string(), "Projects/");
    }
}
