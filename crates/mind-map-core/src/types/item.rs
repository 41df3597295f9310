//! Captured source item — the input the graph is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A captured item from the user's collection.
///
/// This is the ordered input element handed to relationship discovery and
/// to the collection fingerprint. The node created for an item inherits the
/// item's id, which keeps node identity stable across regenerations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedItem {
    /// Stable identity shared with the node created for this item.
    pub id: Uuid,

    /// Extracted or user-entered text, if any.
    pub text: Option<String>,

    /// User-assigned tags.
    pub tags: Vec<String>,

    /// Capture timestamp.
    pub timestamp: DateTime<Utc>,
}

impl CapturedItem {
    /// Create an item with a fresh id and the current timestamp.
    pub fn new(text: Option<String>, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            tags,
            timestamp: Utc::now(),
        }
    }

    /// Length of the item text in bytes (0 when absent).
    pub fn text_len(&self) -> usize {
        self.text.as_deref().map_or(0, str::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_len_handles_missing_text() {
        let item = CapturedItem::new(None, vec![]);
        assert_eq!(item.text_len(), 0);

        let item = CapturedItem::new(Some("hello".to_string()), vec![]);
        assert_eq!(item.text_len(), 5);
    }
}
