//! Deterministic item ordering.
//!
//! Two passes order the tree:
//!
//! - [`sort_structural`] runs once per scope during generation, using the
//!   scope's `itemOrder` hints.
//! - [`sort_tree`] runs last, over the whole tree, using each item's working
//!   priority (seeded from the order overrides).
//!
//! Both are stable and idempotent.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::item::{NavItem, UNORDERED_PRIORITY};

/// Sort one scope by its `itemOrder` hints.
///
/// An item's priority is the hint for its name (path key without a trailing
/// `/` or `.md`), then for its raw path key, then for its text, else its own
/// priority, else `0`.
pub fn sort_structural(items: &mut [NavItem], item_order: &BTreeMap<String, i64>) {
    items.sort_by(|a, b| {
        structural_priority(a, item_order)
            .cmp(&structural_priority(b, item_order))
            .then_with(|| compare_text(a, b))
    });
}

fn structural_priority(item: &NavItem, item_order: &BTreeMap<String, i64>) -> i64 {
    let key = item.path_key.as_str();
    let name = key
        .strip_suffix('/')
        .or_else(|| key.strip_suffix(".md"))
        .unwrap_or(key);

    item_order
        .get(name)
        .or_else(|| item_order.get(key))
        .or_else(|| item_order.get(&item.text))
        .copied()
        .or(item.priority)
        .unwrap_or(0)
}

fn compare_text(a: &NavItem, b: &NavItem) -> Ordering {
    a.text
        .to_lowercase()
        .cmp(&b.text.to_lowercase())
        .then_with(|| a.text.cmp(&b.text))
        .then_with(|| a.path_key.cmp(&b.path_key))
}

/// Sort a whole tree by working priority, children first.
///
/// Items without a priority sort last. A directory without its own
/// priority takes the smallest priority among its children. Ties break on
/// path key, then text.
pub fn sort_tree(items: &mut [NavItem]) {
    for item in items.iter_mut() {
        if let Some(children) = item.items.as_mut() {
            sort_tree(children);
        }
    }

    items.sort_by(|a, b| {
        effective_priority(a)
            .cmp(&effective_priority(b))
            .then_with(|| a.path_key.cmp(&b.path_key))
            .then_with(|| a.text.cmp(&b.text))
    });
}

fn effective_priority(item: &NavItem) -> i64 {
    match item.priority {
        Some(priority) if priority != UNORDERED_PRIORITY => priority,
        _ if item.is_directory => item
            .children()
            .iter()
            .map(effective_priority)
            .min()
            .unwrap_or(UNORDERED_PRIORITY),
        _ => UNORDERED_PRIORITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(name: &str, priority: Option<i64>) -> NavItem {
        NavItem {
            text: name.to_owned(),
            priority,
            path_key: format!("{name}.md"),
            ..NavItem::default()
        }
    }

    fn keys(items: &[NavItem]) -> Vec<&str> {
        items.iter().map(|i| i.text.as_str()).collect()
    }

    // ── structural ──────────────────────────────────────────────────

    #[test]
    fn test_structural_uses_item_order_by_name() {
        let mut items = vec![file("c", None), file("a", None), file("b", None)];
        let order = BTreeMap::from([("c".to_owned(), -1)]);

        sort_structural(&mut items, &order);

        assert_eq!(keys(&items), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_structural_tie_breaks_case_insensitively() {
        let mut items = vec![file("beta", None), file("Alpha", None), file("alpha", None)];

        sort_structural(&mut items, &BTreeMap::new());

        assert_eq!(keys(&items), vec!["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn test_structural_item_priority_when_no_hint() {
        let mut items = vec![file("a", Some(5)), file("b", Some(1)), file("c", None)];

        sort_structural(&mut items, &BTreeMap::new());

        assert_eq!(keys(&items), vec!["c", "b", "a"]);
    }

    // ── tree ────────────────────────────────────────────────────────

    #[test]
    fn test_ordered_items_before_unordered() {
        let mut items = vec![
            file("D", None),
            file("A", Some(2)),
            file("C", Some(UNORDERED_PRIORITY)),
            file("B", Some(1)),
        ];

        sort_tree(&mut items);

        assert_eq!(keys(&items), vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_unordered_directory_adopts_min_child_priority() {
        let dir = NavItem {
            text: "dir".to_owned(),
            is_directory: true,
            items: Some(vec![file("x", Some(7)), file("y", Some(3))]),
            path_key: "dir/".to_owned(),
            ..NavItem::default()
        };
        let mut items = vec![file("a", Some(5)), dir, file("b", None)];

        sort_tree(&mut items);

        assert_eq!(keys(&items), vec!["dir", "a", "b"]);
        assert_eq!(keys(items[0].children()), vec!["y", "x"]);
    }

    #[test]
    fn test_sort_tree_is_idempotent() {
        let mut items = vec![file("b", None), file("a", Some(1)), file("c", Some(1))];
        sort_tree(&mut items);
        let once = items.clone();

        sort_tree(&mut items);

        assert_eq!(items, once);
    }
}
