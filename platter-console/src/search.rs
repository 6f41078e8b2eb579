//! Client-side search filtering
//!
//! Pure, synchronous substring filtering over a cached snapshot. Never
//! touches the network and never mutates or reorders its input.

/// Case-insensitive substring filter. An empty query returns every item
/// in the original order.
pub fn filter<T: Clone>(items: &[T], query: &str, key: impl Fn(&T) -> String) -> Vec<T> {
    if query.is_empty() {
        return items.to_vec();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| key(item).to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
