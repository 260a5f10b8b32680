//! Content element model

use serde::{Deserialize, Serialize};

/// Language id of the default language variant
pub const DEFAULT_LANGUAGE: i64 = 0;

/// A unit of page content with position, type, language, and sort order.
///
/// Owned by the record store; the core never creates or deletes elements
/// directly except through the copy operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentElement {
    /// Stable, store-assigned identifier
    pub uid: i64,
    /// Parent page
    pub page_id: i64,
    /// Language variant (0 = default language)
    pub language: i64,
    /// Layout column
    pub col_pos: i64,
    /// Display title
    pub header: String,
    /// Type tag
    pub ctype: String,
    /// Explicit sort key within the column
    pub sorting: i64,
    /// Visibility flag
    pub hidden: bool,
    /// Draft workspace the element belongs to (0 = live)
    pub workspace: i64,
    /// Non-zero when the element is nested under a grouping container
    pub container_parent: i64,
}

impl ContentElement {
    /// Container children are only ever copied alongside their container,
    /// never listed or copied standalone.
    pub fn is_container_child(&self) -> bool {
        self.container_parent != 0
    }
}
