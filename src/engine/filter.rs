//! Client-side search filtering shared by every provider kind.

use super::item::Item;

/// Return the items whose label or value contains `term`, ignoring case.
///
/// An empty term passes the list through untouched.
pub fn filter_items(items: Vec<Item>, term: &str) -> Vec<Item> {
	if term.is_empty() {
		return items;
	}

	let needle = term.to_lowercase();
	items
		.into_iter()
		.filter(|item| matches_term(item, &needle))
		.collect()
}

/// Check a single item against an already lowercased needle.
pub(crate) fn matches_term(item: &Item, needle: &str) -> bool {
	item.label.to_lowercase().contains(needle) || item.value.to_lowercase().contains(needle)
}
