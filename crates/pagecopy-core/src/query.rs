//! Element Query Service
//!
//! Read-only listing of a page's content elements for UI selection.

use std::collections::BTreeMap;

use crate::access::Actor;
use crate::element::ContentElement;
use crate::error::{PagecopyError, Result};
use crate::store::{ElementFilter, RecordStore, SortOrder};

/// Lists content elements of a page+language, grouped by layout column
pub struct ElementQuery<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> ElementQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Elements grouped by column, ordered by sort key ascending within each
    /// column. Container children and records outside the actor's workspace
    /// visibility are excluded. Grouping is presentation only; copy order is
    /// decided by the orchestrator.
    pub fn list(
        &self,
        actor: &Actor,
        page_id: i64,
        language: i64,
    ) -> Result<BTreeMap<i64, Vec<ContentElement>>> {
        if page_id <= 0 {
            return Err(PagecopyError::InvalidArgument(format!(
                "page id must be positive, got {page_id}"
            )));
        }
        if language < 0 {
            return Err(PagecopyError::InvalidArgument(format!(
                "language id must be non-negative, got {language}"
            )));
        }

        let filter = ElementFilter::new(page_id, language, actor.workspace)
            .order_by(SortOrder::ColumnThenSorting);
        let elements = self.store.query_elements(&filter)?;

        let mut grouped: BTreeMap<i64, Vec<ContentElement>> = BTreeMap::new();
        for element in elements {
            grouped.entry(element.col_pos).or_default().push(element);
        }

        Ok(grouped)
    }
}
