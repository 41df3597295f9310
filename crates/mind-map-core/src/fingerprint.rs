//! Collection fingerprint — the layout-cache key.
//!
//! The fingerprint is a SHA-256 digest over every item's id, text, tags, and
//! timestamp, in collection order. It is deterministic and sensitive to any
//! content or metadata change, so an unchanged collection hits the cache and
//! any edit forces a regeneration.

use sha2::{Digest, Sha256};

use crate::types::CapturedItem;

/// Compute the deterministic fingerprint of an ordered item collection.
///
/// # Example
///
/// ```
/// use mind_map_core::{fingerprint, CapturedItem};
///
/// let items = vec![CapturedItem::new(Some("note".into()), vec!["tag".into()])];
/// let a = fingerprint(&items);
/// let b = fingerprint(&items);
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn fingerprint(items: &[CapturedItem]) -> String {
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(item.id.as_bytes());
        // Length-prefix the variable fields so adjacent values cannot
        // collide across field boundaries.
        let text = item.text.as_deref().unwrap_or("");
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
        hasher.update((item.tags.len() as u64).to_le_bytes());
        for tag in &item.tags {
            hasher.update((tag.len() as u64).to_le_bytes());
            hasher.update(tag.as_bytes());
        }
        hasher.update(item.timestamp.timestamp_micros().to_le_bytes());
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
