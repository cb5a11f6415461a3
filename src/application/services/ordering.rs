//! Ordering service
//!
//! Assigns order keys when nodes are created or repositioned inside their
//! sibling group. Works on an in-memory node set; loading and saving is the
//! caller's business.

use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationResult;
use crate::domain::{
    DomainError, Node, NodeKind, OrderKey, OrderKeyEngine, Ordered, Reordered,
};

/// Service computing order keys for node creation and reordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderingService {
    engine: OrderKeyEngine,
}

impl OrderingService {
    pub fn new(engine: OrderKeyEngine) -> Self {
        Self { engine }
    }

    /// Key for a node appended after the highest-keyed sibling of `parent_id`.
    ///
    /// An empty group starts one step above the floor key: nothing sorts
    /// below the floor, so a first node holding it could never get a node
    /// moved in front of it.
    pub fn next_key(&self, nodes: &[Node], parent_id: Option<&str>) -> ApplicationResult<OrderKey> {
        let floor = self.engine.first();
        let last = nodes
            .iter()
            .filter(|n| n.is_child_of(parent_id))
            .map(|n| &n.order_key)
            .max()
            .unwrap_or(&floor);
        debug!(%last, "next_key: last sibling key");
        Ok(self.engine.generate(Some(last), None)?)
    }

    /// Create a folder or document at the tail of its sibling group.
    ///
    /// The parent, if given, must exist and be a folder.
    #[instrument(level = "debug", skip(self, nodes))]
    pub fn create(
        &self,
        nodes: &mut Vec<Node>,
        kind: NodeKind,
        name: &str,
        parent_id: Option<&str>,
    ) -> ApplicationResult<Node> {
        if let Some(pid) = parent_id {
            let parent = nodes
                .iter()
                .find(|n| n.id == pid)
                .ok_or_else(|| DomainError::ParentNotFound(pid.to_string()))?;
            if !parent.is_folder() {
                return Err(DomainError::ParentNotFolder(pid.to_string()).into());
            }
        }

        let key = self.next_key(nodes, parent_id)?;
        let node = Node::new(kind, name, parent_id.map(String::from), key)?;
        info!(id = %node.id, key = %node.order_key, "created {}", node.kind);
        nodes.push(node.clone());
        Ok(node)
    }

    /// Move node `id` between two of its current siblings.
    ///
    /// Neighbour ids outside the node's sibling group leave that side open,
    /// but at least one neighbour must be found. A key already held by another
    /// sibling (neighbours that are not adjacent) is rejected, so a saved
    /// group never holds duplicate keys. On error `nodes` is left untouched.
    #[instrument(level = "debug", skip(self, nodes))]
    pub fn reposition(
        &self,
        nodes: &mut [Node],
        id: &str,
        before_id: Option<&str>,
        after_id: Option<&str>,
    ) -> ApplicationResult<Reordered<Node>> {
        let parent_id = nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| DomainError::ItemNotFound(id.to_string()))?
            .parent_id
            .clone();

        let siblings: Vec<Node> = nodes
            .iter()
            .filter(|n| n.is_child_of(parent_id.as_deref()))
            .cloned()
            .collect();
        let is_other_sibling = |nid: &str| nid != id && siblings.iter().any(|s| s.id == nid);

        let mut found = 0;
        for neighbour in [before_id, after_id].into_iter().flatten() {
            if is_other_sibling(neighbour) {
                found += 1;
            } else {
                warn!("{} is not a sibling of {}, leaving that side open", neighbour, id);
            }
        }
        if found == 0 {
            return Err(DomainError::NoNeighbour(id.to_string()).into());
        }

        let reordered = self.engine.reorder(&siblings, id, before_id, after_id)?;
        if let Some(taken) = siblings
            .iter()
            .find(|s| s.id != id && s.order_key == reordered.new_order_key)
        {
            return Err(DomainError::KeyCollision {
                key: reordered.new_order_key.to_string(),
                id: taken.id.clone(),
            }
            .into());
        }

        if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
            node.set_order_key(reordered.new_order_key.clone());
        }
        info!(id, key = %reordered.new_order_key, "repositioned node");
        Ok(reordered)
    }
}
