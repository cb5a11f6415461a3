//! Outline file service
//!
//! Loads and saves TOML outline files and checks the ordering invariants of
//! every sibling group.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Node, OrderKeyEngine, Outline};
use crate::infrastructure::traits::FileSystem;

/// On-disk outline: one `[[node]]` table per folder or document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineFile {
    #[serde(default, rename = "node")]
    pub nodes: Vec<Node>,
}

/// Broken ordering or structure rule found by [`OutlineService::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DuplicateId(String),
    InvalidKey {
        id: String,
        key: String,
        reason: String,
    },
    DuplicateKey {
        parent_id: Option<String>,
        key: String,
        ids: Vec<String>,
    },
    Orphan {
        id: String,
        parent_id: String,
    },
    ParentNotFolder {
        id: String,
        parent_id: String,
    },
    Unreachable(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateId(id) => write!(f, "duplicate node id {id}"),
            Violation::InvalidKey { id, key, reason } => {
                write!(f, "node {id} has invalid order key {key:?}: {reason}")
            }
            Violation::DuplicateKey {
                parent_id,
                key,
                ids,
            } => write!(
                f,
                "order key {key:?} used {} times under {}: {}",
                ids.len(),
                parent_id.as_deref().unwrap_or("<root>"),
                ids.join(", ")
            ),
            Violation::Orphan { id, parent_id } => {
                write!(f, "node {id} points at missing parent {parent_id}")
            }
            Violation::ParentNotFolder { id, parent_id } => {
                write!(f, "node {id} has non-folder parent {parent_id}")
            }
            Violation::Unreachable(id) => write!(f, "node {id} is not reachable from any root"),
        }
    }
}

/// Service for reading, writing and validating outline files.
pub struct OutlineService {
    fs: Arc<dyn FileSystem>,
    engine: OrderKeyEngine,
}

impl OutlineService {
    pub fn new(fs: Arc<dyn FileSystem>, engine: OrderKeyEngine) -> Self {
        Self { fs, engine }
    }

    /// Read all nodes of an outline file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Vec<Node>> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OutlineNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read outline", path)?;
        let file: OutlineFile =
            toml::from_str(&content).map_err(|e| ApplicationError::InvalidOutline {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!("load: {} nodes", file.nodes.len());
        Ok(file.nodes)
    }

    /// Like [`load`](Self::load), but a missing file is an empty outline.
    pub fn load_or_empty(&self, path: &Path) -> ApplicationResult<Vec<Node>> {
        match self.load(path) {
            Err(ApplicationError::OutlineNotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Write nodes back, each sibling group in key order.
    #[instrument(level = "debug", skip(self, nodes))]
    pub fn save(&self, path: &Path, nodes: &[Node]) -> ApplicationResult<()> {
        let mut nodes = nodes.to_vec();
        nodes.sort_by(|a, b| {
            (&a.parent_id, &a.order_key).cmp(&(&b.parent_id, &b.order_key))
        });
        let content = toml::to_string_pretty(&OutlineFile { nodes }).map_err(|e| {
            ApplicationError::InvalidOutline {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        self.fs
            .write(path, &content)
            .with_path_context("write outline", path)
    }

    /// Load an outline file and build its tree.
    pub fn tree(&self, path: &Path) -> ApplicationResult<Outline> {
        Ok(Outline::build(self.load(path)?))
    }

    /// Report every broken rule; an empty list means the outline is sound.
    ///
    /// Checks unique ids, keys spelled with the configured alphabet, distinct
    /// keys inside each sibling group, existing folder parents and
    /// reachability from a root.
    #[instrument(level = "debug", skip(self, nodes), fields(count = nodes.len()))]
    pub fn check(&self, nodes: &[Node]) -> Vec<Violation> {
        let outline = Outline::build(nodes.to_vec());
        let mut violations: Vec<Violation> = outline
            .duplicate_ids()
            .iter()
            .cloned()
            .map(Violation::DuplicateId)
            .collect();

        for node in nodes {
            if let Err(e) = self.engine.validate(&node.order_key) {
                violations.push(Violation::InvalidKey {
                    id: node.id.clone(),
                    key: node.order_key.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        let groups = nodes.iter().into_group_map_by(|n| n.parent_id.clone());
        for (parent_id, group) in groups.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
            for key in group.iter().map(|n| &n.order_key).duplicates().sorted() {
                violations.push(Violation::DuplicateKey {
                    parent_id: parent_id.clone(),
                    key: key.to_string(),
                    ids: group
                        .iter()
                        .filter(|n| &n.order_key == key)
                        .map(|n| n.id.clone())
                        .collect(),
                });
            }
        }

        for orphan in outline.orphans() {
            violations.push(Violation::Orphan {
                id: orphan.id.clone(),
                parent_id: orphan.parent_id.clone().unwrap_or_default(),
            });
        }

        for (_, entry) in outline.entries() {
            for &child in &entry.children {
                if let Some(child) = outline.get(child) {
                    if !entry.node.is_folder() {
                        violations.push(Violation::ParentNotFolder {
                            id: child.node.id.clone(),
                            parent_id: entry.node.id.clone(),
                        });
                    }
                }
            }
        }

        let orphan_ids: Vec<&str> = outline.orphans().map(|n| n.id.as_str()).collect();
        for node in outline.unreachable() {
            if !orphan_ids.contains(&node.id.as_str()) {
                violations.push(Violation::Unreachable(node.id.clone()));
            }
        }

        debug!("check: {} violations", violations.len());
        violations
    }
}
