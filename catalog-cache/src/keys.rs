//! Key namespacing policy.
//!
//! Deterministic mapping from a logical catalog query to its cache key,
//! under the shared `products` prefix:
//!
//! - all items        -> `products:all`
//! - item by id       -> `products:{id}`
//! - items by category-> `products:category:{category}`
//! - search by term   -> `products:search:{term}`
//!
//! The sub-prefixes are disjoint by construction (`all`, a UUID, `category:`,
//! `search:`), so keys from different query classes never collide. Terms and
//! categories are used verbatim - no normalization - so case variants of the
//! same term cache independently. Accepted trade-off.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

/// Shared prefix for every catalog cache key.
pub const KEY_PREFIX: &str = "products";

/// TTL for all-items, item-by-id and category entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// TTL for search entries. Search results are more expensive to compute and
/// tolerate slightly longer staleness.
pub const SEARCH_TTL: Duration = Duration::from_secs(60);

/// A logical catalog query, renderable as a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKey<'a> {
    /// The aggregate list of every item.
    All,
    /// A single item by id.
    Item(Uuid),
    /// Active items in a category.
    Category(&'a str),
    /// Active items matching a free-text term.
    Search(&'a str),
}

impl QueryKey<'_> {
    /// Render the cache key for this query.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// TTL for this query class.
    pub fn ttl(&self) -> Duration {
        match self {
            QueryKey::Search(_) => SEARCH_TTL,
            _ => DEFAULT_TTL,
        }
    }

    /// Pattern matching every key under the shared prefix, for bulk clears.
    pub fn wildcard() -> String {
        format!("{}:*", KEY_PREFIX)
    }
}

impl fmt::Display for QueryKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::All => write!(f, "{}:all", KEY_PREFIX),
            QueryKey::Item(id) => write!(f, "{}:{}", KEY_PREFIX, id),
            QueryKey::Category(category) => write!(f, "{}:category:{}", KEY_PREFIX, category),
            QueryKey::Search(term) => write!(f, "{}:search:{}", KEY_PREFIX, term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_rendering() {
        let id = Uuid::nil();
        assert_eq!(QueryKey::All.render(), "products:all");
        assert_eq!(
            QueryKey::Item(id).render(),
            "products:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            QueryKey::Category("electronics").render(),
            "products:category:electronics"
        );
        assert_eq!(QueryKey::Search("widget").render(), "products:search:widget");
    }

    #[test]
    fn test_ttl_per_query_class() {
        assert_eq!(QueryKey::All.ttl(), DEFAULT_TTL);
        assert_eq!(QueryKey::Item(Uuid::nil()).ttl(), DEFAULT_TTL);
        assert_eq!(QueryKey::Category("x").ttl(), DEFAULT_TTL);
        assert_eq!(QueryKey::Search("x").ttl(), SEARCH_TTL);
    }

    #[test]
    fn test_terms_are_verbatim() {
        // No normalization: case variants cache independently.
        assert_ne!(
            QueryKey::Search("Widget").render(),
            QueryKey::Search("widget").render()
        );
    }

    #[test]
    fn test_wildcard_covers_prefix() {
        assert_eq!(QueryKey::wildcard(), "products:*");
        assert!(QueryKey::All.render().starts_with("products:"));
    }

    proptest! {
        /// Keys from different query classes never collide, for any inputs.
        #[test]
        fn prop_query_classes_are_disjoint(term in "\\PC*", category in "\\PC*", id_bytes in any::<[u8; 16]>()) {
            let id = Uuid::from_bytes(id_bytes);
            let keys = [
                QueryKey::All.render(),
                QueryKey::Item(id).render(),
                QueryKey::Category(&category).render(),
                QueryKey::Search(&term).render(),
            ];

            // Category and search keys carry distinct sub-prefixes, the item
            // key is a UUID (never "all", never contains a sub-prefix colon
            // in its first segment).
            prop_assert_ne!(&keys[0], &keys[1]);
            prop_assert_ne!(&keys[1], &keys[2]);
            prop_assert_ne!(&keys[1], &keys[3]);
            prop_assert_ne!(&keys[0], &keys[2]);
            prop_assert_ne!(&keys[0], &keys[3]);
            prop_assert_ne!(&keys[2], &keys[3]);
        }

        /// Distinct ids map to distinct keys.
        #[test]
        fn prop_item_keys_injective(a in any::<[u8; 16]>(), b in any::<[u8; 16]>()) {
            prop_assume!(a != b);
            prop_assert_ne!(
                QueryKey::Item(Uuid::from_bytes(a)).render(),
                QueryKey::Item(Uuid::from_bytes(b)).render()
            );
        }
    }
}
