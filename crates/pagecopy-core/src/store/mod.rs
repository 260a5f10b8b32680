//! Record store boundary

pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::access::PageRecord;
use crate::copy::CopyContext;
use crate::element::ContentElement;
use crate::error::StoreError;

/// Fetch order for element queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// By column, then by sort key ascending (presentation order)
    ColumnThenSorting,
    /// By sort key descending (copy order: the store inserts copies at the
    /// top of the target column, so descending source order preserves the
    /// original visual order)
    SortingDescending,
}

/// Filter for content element queries.
///
/// Soft-deleted records are always excluded; records are visible when they
/// belong to the live workspace or the filter's workspace.
#[derive(Debug, Clone)]
pub struct ElementFilter {
    pub page_id: i64,
    pub language: i64,
    pub workspace: i64,
    /// Explicit uid subset; empty means all elements of the page+language
    pub uids: Vec<i64>,
    /// Container children are excluded unless set
    pub include_container_children: bool,
    pub order: SortOrder,
}

impl ElementFilter {
    pub fn new(page_id: i64, language: i64, workspace: i64) -> Self {
        Self {
            page_id,
            language,
            workspace,
            uids: Vec::new(),
            include_container_children: false,
            order: SortOrder::ColumnThenSorting,
        }
    }

    pub fn with_uids(mut self, uids: Vec<i64>) -> Self {
        self.uids = uids;
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_container_children(mut self) -> Self {
        self.include_container_children = true;
        self
    }
}

/// Value written through [`RecordStore::update_field`]
#[derive(Debug, Clone)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

/// Storage boundary consumed by the query service and the copy orchestrator.
///
/// The copy operation duplicates an element's full field set into the
/// context's target page and returns the new uid. Language retargeting is a
/// follow-up [`RecordStore::update_field`] write, never part of the copy.
pub trait RecordStore {
    /// Elements matching the filter, in the filter's order
    fn query_elements(&self, filter: &ElementFilter) -> Result<Vec<ContentElement>, StoreError>;

    /// Page record for permission checks, `None` when missing or deleted
    fn get_page(&self, uid: i64) -> Result<Option<PageRecord>, StoreError>;

    /// Copy one element into the context's target page, returning the new
    /// uid. Container children of the source come along with their parent
    /// reference pointing at the copy.
    fn copy_element(&self, context: &CopyContext, source_uid: i64) -> Result<i64, StoreError>;

    /// Write a single allow-listed field of an element
    fn update_field(&self, uid: i64, field: &str, value: FieldValue) -> Result<(), StoreError>;
}
