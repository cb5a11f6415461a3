//! Repositioning an item inside its sibling group.

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::order_key::{OrderKey, OrderKeyEngine};

/// Anything that occupies a slot in a sibling group.
pub trait Ordered {
    fn id(&self) -> &str;
    fn order_key(&self) -> &OrderKey;
    fn set_order_key(&mut self, key: OrderKey);
}

/// Outcome of [`OrderKeyEngine::reorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reordered<T> {
    /// Key assigned to the moved item
    pub new_order_key: OrderKey,
    /// All siblings, moved item included, ascending by key
    pub items: Vec<T>,
}

/// Sort siblings ascending by key; equal keys keep their input order.
pub fn sort_by_key<T: Ordered>(items: &mut [T]) {
    items.sort_by(|a, b| a.order_key().cmp(b.order_key()));
}

impl OrderKeyEngine {
    /// Move `item_id` between the siblings `before_id` and `after_id`.
    ///
    /// Neighbours are looked up among the siblings that remain once the item
    /// is taken out; an id that is not found there leaves that side open.
    /// `siblings` is not modified, so a failed call has no effect.
    #[instrument(level = "debug", skip(self, siblings), fields(count = siblings.len()))]
    pub fn reorder<T: Ordered + Clone>(
        &self,
        siblings: &[T],
        item_id: &str,
        before_id: Option<&str>,
        after_id: Option<&str>,
    ) -> DomainResult<Reordered<T>> {
        let item = siblings
            .iter()
            .find(|s| s.id() == item_id)
            .ok_or_else(|| DomainError::ItemNotFound(item_id.to_string()))?;

        let others: Vec<&T> = siblings.iter().filter(|s| s.id() != item_id).collect();
        let before = key_of(&others, before_id);
        let after = key_of(&others, after_id);
        debug!(?before, ?after, "neighbour keys");

        let new_order_key = self.generate(before, after)?;

        let mut moved = item.clone();
        moved.set_order_key(new_order_key.clone());
        let mut items: Vec<T> = others.into_iter().cloned().collect();
        items.push(moved);
        sort_by_key(&mut items);

        Ok(Reordered {
            new_order_key,
            items,
        })
    }
}

fn key_of<'a, T: Ordered>(items: &[&'a T], id: Option<&str>) -> Option<&'a OrderKey> {
    let id = id?;
    items.iter().find(|s| s.id() == id).map(|s| s.order_key())
}

/// [`OrderKeyEngine::reorder`] with the default alphabet.
pub fn reorder<T: Ordered + Clone>(
    siblings: &[T],
    item_id: &str,
    before_id: Option<&str>,
    after_id: Option<&str>,
) -> DomainResult<Reordered<T>> {
    OrderKeyEngine::default().reorder(siblings, item_id, before_id, after_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: String,
        key: OrderKey,
    }

    impl Ordered for Item {
        fn id(&self) -> &str {
            &self.id
        }

        fn order_key(&self) -> &OrderKey {
            &self.key
        }

        fn set_order_key(&mut self, key: OrderKey) {
            self.key = key;
        }
    }

    fn item(id: &str, key: &str) -> Item {
        Item {
            id: id.to_string(),
            key: OrderKey::parse(key).unwrap(),
        }
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn abc() -> Vec<Item> {
        vec![item("A", "a"), item("B", "b"), item("C", "c")]
    }

    #[test]
    fn given_middle_item_when_moved_between_same_neighbours_then_stays_between() {
        let result = reorder(&abc(), "B", Some("A"), Some("C")).unwrap();

        assert!(result.new_order_key.as_str() > "a");
        assert!(result.new_order_key.as_str() < "c");
        assert_eq!(ids(&result.items), vec!["A", "B", "C"]);
    }

    #[test]
    fn given_last_item_when_moved_to_middle_then_sorted_between_neighbours() {
        let result = reorder(&abc(), "C", Some("A"), Some("B")).unwrap();

        assert_eq!(result.new_order_key.as_str(), "am");
        assert_eq!(ids(&result.items), vec!["A", "C", "B"]);
    }

    #[test]
    fn given_first_item_when_moved_to_tail_then_sorted_last() {
        let result = reorder(&abc(), "A", Some("C"), None).unwrap();

        assert_eq!(result.new_order_key.as_str(), "d");
        assert_eq!(ids(&result.items), vec!["B", "C", "A"]);
    }

    #[test]
    fn given_last_item_when_moved_to_head_then_sorted_first() {
        let siblings = vec![item("A", "b"), item("B", "c"), item("C", "d")];
        let result = reorder(&siblings, "C", None, Some("A")).unwrap();

        assert_eq!(result.new_order_key.as_str(), "am");
        assert_eq!(ids(&result.items), vec!["C", "A", "B"]);
    }

    #[test]
    fn given_unknown_neighbour_when_reordering_then_side_is_open() {
        let result = reorder(&abc(), "A", Some("C"), Some("missing")).unwrap();

        assert_eq!(result.new_order_key.as_str(), "d");
        assert_eq!(ids(&result.items), vec!["B", "C", "A"]);
    }

    #[test]
    fn given_item_as_its_own_neighbour_when_reordering_then_ignores_it() {
        // B is removed before neighbours are resolved
        let result = reorder(&abc(), "B", Some("B"), None).unwrap();

        assert_eq!(result.new_order_key.as_str(), "a");
        assert_eq!(result.items.len(), 3);
    }

    #[test]
    fn given_unknown_item_when_reordering_then_fails_without_changes() {
        let siblings = abc();
        let err = reorder(&siblings, "X", Some("A"), Some("B")).unwrap_err();

        assert_eq!(err, DomainError::ItemNotFound("X".to_string()));
        assert_eq!(siblings, abc());
    }

    #[test]
    fn given_neighbours_in_wrong_order_when_reordering_then_fails() {
        let err = reorder(&abc(), "B", Some("C"), Some("A")).unwrap_err();
        assert!(matches!(err, DomainError::OutOfOrder { .. }));
    }

    #[test]
    fn given_single_item_when_reordering_without_neighbours_then_gets_first_key() {
        let result = reorder(&[item("A", "q")], "A", None, None).unwrap();

        assert_eq!(result.new_order_key.as_str(), "a");
        assert_eq!(ids(&result.items), vec!["A"]);
    }

    #[test]
    fn given_equal_keys_when_sorting_then_input_order_is_kept() {
        let mut items = vec![item("X", "b"), item("Y", "a"), item("Z", "b")];
        sort_by_key(&mut items);
        assert_eq!(ids(&items), vec!["Y", "X", "Z"]);
    }
}
