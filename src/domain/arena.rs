//! Arena-backed outline: the folder/document forest built from flat nodes.

use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::Node;

/// Tree node in the arena-based outline.
#[derive(Debug)]
pub struct OutlineNode {
    /// The folder or document itself
    pub node: Node,
    /// Index of parent node in the arena, None for roots and orphans
    pub parent: Option<Index>,
    /// Indices of child nodes, ascending by order key
    pub children: Vec<Index>,
}

/// Forest of all nodes, each sibling group sorted by order key.
#[derive(Debug, Default)]
pub struct Outline {
    arena: Arena<OutlineNode>,
    by_id: HashMap<String, Index>,
    roots: Vec<Index>,
    /// Nodes whose parent id matches no node
    orphans: Vec<Index>,
    /// Ids seen more than once; only the first node is kept
    duplicate_ids: Vec<String>,
}

impl Outline {
    /// Build the forest from a flat node list.
    ///
    /// First pass registers every node, second pass links children to their
    /// parents. Nodes pointing at an unknown parent are kept as orphans and are
    /// not part of the displayed tree.
    #[instrument(level = "debug", skip(nodes))]
    pub fn build(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut outline = Self::default();
        let mut order = Vec::new();

        for node in nodes {
            if outline.by_id.contains_key(&node.id) {
                outline.duplicate_ids.push(node.id);
                continue;
            }
            let id = node.id.clone();
            let idx = outline.arena.insert(OutlineNode {
                node,
                parent: None,
                children: Vec::new(),
            });
            outline.by_id.insert(id, idx);
            order.push(idx);
        }

        for idx in order {
            let parent_id = outline.arena[idx].node.parent_id.clone();
            match parent_id {
                None => outline.roots.push(idx),
                Some(pid) => match outline.by_id.get(&pid).copied() {
                    Some(parent_idx) => {
                        outline.arena[idx].parent = Some(parent_idx);
                        outline.arena[parent_idx].children.push(idx);
                    }
                    None => outline.orphans.push(idx),
                },
            }
        }

        outline.sort_groups();
        outline
    }

    fn sort_groups(&mut self) {
        let mut roots = std::mem::take(&mut self.roots);
        self.sort_indices(&mut roots);
        self.roots = roots;

        let all: Vec<Index> = self.arena.iter().map(|(idx, _)| idx).collect();
        for idx in all {
            let mut children = std::mem::take(&mut self.arena[idx].children);
            self.sort_indices(&mut children);
            self.arena[idx].children = children;
        }
    }

    fn sort_indices(&self, indices: &mut [Index]) {
        indices.sort_by(|a, b| {
            self.arena[*a]
                .node
                .order_key
                .cmp(&self.arena[*b].node.order_key)
        });
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn get(&self, idx: Index) -> Option<&OutlineNode> {
        self.arena.get(idx)
    }

    pub fn find(&self, id: &str) -> Option<&OutlineNode> {
        self.by_id.get(id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn orphans(&self) -> impl Iterator<Item = &Node> {
        self.orphans.iter().map(|&idx| &self.arena[idx].node)
    }

    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicate_ids
    }

    /// Sibling group under `parent_id` (roots for None), ascending by key.
    ///
    /// Empty if the parent is unknown.
    pub fn siblings(&self, parent_id: Option<&str>) -> Vec<&Node> {
        let group = match parent_id {
            None => Some(&self.roots),
            Some(pid) => self.find(pid).map(|parent| &parent.children),
        };
        group
            .map(|indices| indices.iter().map(|&idx| &self.arena[idx].node).collect())
            .unwrap_or_default()
    }

    /// Every kept node, reachable or not, in arena order.
    pub fn entries(&self) -> impl Iterator<Item = (Index, &OutlineNode)> {
        self.arena.iter()
    }

    /// Depth-first, pre-order walk over all trees, roots in key order.
    pub fn iter(&self) -> OutlineIter<'_> {
        OutlineIter::new(self)
    }

    /// Nodes not reachable from any root (orphans, their subtrees, parent loops).
    pub fn unreachable(&self) -> Vec<&Node> {
        let reachable: HashSet<Index> = self.iter().map(|(idx, _, _)| idx).collect();
        self.arena
            .iter()
            .filter(|(idx, _)| !reachable.contains(idx))
            .map(|(_, n)| &n.node)
            .collect()
    }

    /// Number of levels in the deepest tree, 0 when empty.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(_, depth, _)| depth + 1).max().unwrap_or(0)
    }

    /// Render each root as a text tree, optionally annotated with order keys.
    pub fn to_trees(&self, show_keys: bool) -> Vec<Tree<String>> {
        self.roots
            .iter()
            .map(|&idx| self.render(idx, show_keys))
            .collect()
    }

    // Recursion only follows edges reachable from a root, so parent loops cannot recur.
    fn render(&self, idx: Index, show_keys: bool) -> Tree<String> {
        let entry = &self.arena[idx];
        let label = if show_keys {
            format!("{} [{}]", entry.node, entry.node.order_key)
        } else {
            entry.node.to_string()
        };
        let leaves: Vec<_> = entry
            .children
            .iter()
            .map(|&child| self.render(child, show_keys))
            .collect();
        Tree::new(label).with_leaves(leaves)
    }
}

/// Pre-order iterator yielding `(index, depth, node)`.
pub struct OutlineIter<'a> {
    outline: &'a Outline,
    stack: Vec<(Index, usize)>,
}

impl<'a> OutlineIter<'a> {
    fn new(outline: &'a Outline) -> Self {
        let stack = outline.roots.iter().rev().map(|&idx| (idx, 0)).collect();
        Self { outline, stack }
    }
}

impl<'a> Iterator for OutlineIter<'a> {
    type Item = (Index, usize, &'a OutlineNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, depth) = self.stack.pop()?;
        let entry = self.outline.arena.get(idx)?;
        // Push children in reverse order for left-to-right traversal
        for &child in entry.children.iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((idx, depth, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NodeKind;
    use crate::domain::order_key::OrderKey;

    fn node(id: &str, kind: NodeKind, parent: Option<&str>, key: &str) -> Node {
        let mut n = Node::new(kind, id, parent.map(String::from), OrderKey::parse(key).unwrap())
            .unwrap();
        n.id = id.to_string();
        n
    }

    fn names(nodes: &[&Node]) -> Vec<String> {
        nodes.iter().map(|n| n.name.clone()).collect()
    }

    fn sample() -> Outline {
        Outline::build(vec![
            node("notes", NodeKind::Doc, Some("work"), "b"),
            node("work", NodeKind::Folder, None, "b"),
            node("home", NodeKind::Folder, None, "a"),
            node("todo", NodeKind::Doc, Some("work"), "am"),
            node("lost", NodeKind::Doc, Some("gone"), "a"),
        ])
    }

    #[test]
    fn given_flat_nodes_when_building_then_groups_sorted_by_key() {
        let outline = sample();

        assert_eq!(outline.len(), 5);
        assert_eq!(names(&outline.siblings(None)), vec!["home", "work"]);
        assert_eq!(names(&outline.siblings(Some("work"))), vec!["todo", "notes"]);
        assert!(outline.siblings(Some("gone")).is_empty());
    }

    #[test]
    fn given_unknown_parent_when_building_then_node_is_orphan() {
        let outline = sample();

        let orphans: Vec<_> = outline.orphans().map(|n| n.id.as_str()).collect();
        assert_eq!(orphans, vec!["lost"]);
        assert_eq!(outline.unreachable().len(), 1);
    }

    #[test]
    fn given_outline_when_iterating_then_visits_preorder_with_depth() {
        let outline = sample();

        let visited: Vec<_> = outline
            .iter()
            .map(|(_, depth, e)| (e.node.id.clone(), depth))
            .collect();
        assert_eq!(
            visited,
            vec![
                ("home".to_string(), 0),
                ("work".to_string(), 0),
                ("todo".to_string(), 1),
                ("notes".to_string(), 1),
            ]
        );
        assert_eq!(outline.depth(), 2);
    }

    #[test]
    fn given_orphan_when_listing_entries_then_includes_unreachable_nodes() {
        let outline = sample();

        let mut ids: Vec<_> = outline.entries().map(|(_, e)| e.node.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["home", "lost", "notes", "todo", "work"]);
    }

    #[test]
    fn given_duplicate_ids_when_building_then_keeps_first() {
        let outline = Outline::build(vec![
            node("x", NodeKind::Doc, None, "a"),
            node("x", NodeKind::Doc, None, "b"),
        ]);

        assert_eq!(outline.len(), 1);
        assert_eq!(outline.duplicate_ids(), ["x".to_string()]);
        assert_eq!(outline.find("x").unwrap().node.order_key.as_str(), "a");
    }

    #[test]
    fn given_parent_loop_when_building_then_nodes_are_unreachable() {
        let outline = Outline::build(vec![
            node("a", NodeKind::Folder, Some("b"), "a"),
            node("b", NodeKind::Folder, Some("a"), "a"),
        ]);

        assert!(outline.roots().is_empty());
        assert_eq!(outline.iter().count(), 0);
        assert_eq!(outline.unreachable().len(), 2);
        assert_eq!(outline.depth(), 0);
    }

    #[test]
    fn given_outline_when_rendering_with_keys_then_labels_carry_keys() {
        let outline = sample();
        let rendered: Vec<String> = outline
            .to_trees(true)
            .iter()
            .map(|t| t.to_string())
            .collect();

        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].starts_with("home/ [a]"));
        assert!(rendered[1].contains("todo [am]"));
        assert!(rendered[1].contains("notes [b]"));
    }
}
