//! Copy orchestration
//!
//! Copies a set of content elements from one page/language combination to
//! another page, optionally retargeting their language. Per-element failures
//! are logged and recorded, never aborting the batch.

use crate::access::{AccessPolicy, Actor, Permission};
use crate::error::{PagecopyError, Result};
use crate::store::{ElementFilter, FieldValue, RecordStore, SortOrder};

/// Short-lived settings for a single copy-record operation.
///
/// Constructed fresh per element; the copy mechanism's state is never shared
/// across elements or invocations.
#[derive(Debug, Clone)]
pub struct CopyContext {
    /// Page the copy is inserted into
    pub target_page: i64,
    /// Force the copy visible regardless of the source's hidden flag
    pub never_hide_at_copy: bool,
}

impl CopyContext {
    pub fn new(target_page: i64) -> Self {
        Self {
            target_page,
            never_hide_at_copy: false,
        }
    }

    pub fn never_hide(mut self, never_hide_at_copy: bool) -> Self {
        self.never_hide_at_copy = never_hide_at_copy;
        self
    }
}

/// A request to copy content elements between pages
#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub source_page: i64,
    pub target_page: i64,
    /// Language of the source elements
    pub language: i64,
    /// Language the copies are assigned to; defaults to the source language
    pub target_language: i64,
    /// Explicit element subset; empty means all elements of the source
    /// page+language
    pub element_uids: Vec<i64>,
    /// Force copies visible (default) instead of keeping the source's flag
    pub never_hide_at_copy: bool,
}

impl CopyRequest {
    pub fn new(source_page: i64, target_page: i64, language: i64) -> Self {
        Self {
            source_page,
            target_page,
            language,
            target_language: language,
            element_uids: Vec::new(),
            never_hide_at_copy: true,
        }
    }

    pub fn to_language(mut self, target_language: i64) -> Self {
        self.target_language = target_language;
        self
    }

    pub fn with_elements(mut self, element_uids: Vec<i64>) -> Self {
        self.element_uids = element_uids;
        self
    }

    pub fn keep_hidden_state(mut self) -> Self {
        self.never_hide_at_copy = false;
        self
    }

    /// Whether copies get their language rewritten after the copy
    pub fn retargets_language(&self) -> bool {
        self.target_language != self.language
    }

    fn validate(&self) -> Result<()> {
        if self.source_page <= 0 || self.target_page <= 0 {
            return Err(PagecopyError::InvalidArgument(format!(
                "page ids must be positive, got source {} and target {}",
                self.source_page, self.target_page
            )));
        }
        if self.language < 0 || self.target_language < 0 {
            return Err(PagecopyError::InvalidArgument(format!(
                "language ids must be non-negative, got {} and {}",
                self.language, self.target_language
            )));
        }
        Ok(())
    }
}

/// Result of a copy invocation
#[derive(Debug, Clone, Default)]
pub struct CopyOutcome {
    /// Number of elements successfully copied
    pub copied: u32,
    /// Source uids whose copy failed; already logged when recorded here
    pub failed: Vec<i64>,
}

/// Validates permissions, fetches the candidate set, and performs one
/// record-copy operation per element, strictly sequentially.
pub struct CopyOrchestrator<'a, S, P> {
    store: &'a S,
    policy: &'a P,
}

impl<'a, S: RecordStore, P: AccessPolicy> CopyOrchestrator<'a, S, P> {
    pub fn new(store: &'a S, policy: &'a P) -> Self {
        Self { store, policy }
    }

    /// Copy the requested elements on behalf of the actor.
    ///
    /// Aborts before any copy when the actor lacks read access to the source
    /// page or edit access to the target page. The batch is not atomic: each
    /// element copy succeeds or fails independently.
    pub fn copy_elements(&self, request: &CopyRequest, actor: &Actor) -> Result<CopyOutcome> {
        request.validate()?;

        tracing::debug!(
            source_page = request.source_page,
            target_page = request.target_page,
            language = request.language,
            target_language = request.target_language,
            element_uids = ?request.element_uids,
            never_hide_at_copy = request.never_hide_at_copy,
            "copy requested"
        );

        let source = self.store.get_page(request.source_page)?;
        if !source
            .as_ref()
            .is_some_and(|page| self.policy.has_access(actor, page, Permission::Read))
        {
            return Err(PagecopyError::PermissionDenied(format!(
                "no read access to source page {}",
                request.source_page
            )));
        }

        let target = self.store.get_page(request.target_page)?;
        if !target
            .as_ref()
            .is_some_and(|page| self.policy.has_access(actor, page, Permission::Edit))
        {
            return Err(PagecopyError::PermissionDenied(format!(
                "no edit access to target page {}",
                request.target_page
            )));
        }

        // Descending fetch order: copies are inserted at the top of the
        // target column, so the last element copied ends up first.
        let filter = ElementFilter::new(request.source_page, request.language, actor.workspace)
            .with_uids(request.element_uids.clone())
            .order_by(SortOrder::SortingDescending);
        let candidates = self.store.query_elements(&filter)?;

        tracing::debug!(count = candidates.len(), "copy candidates fetched");

        if candidates.is_empty() {
            return Ok(CopyOutcome::default());
        }

        let mut outcome = CopyOutcome::default();
        for element in &candidates {
            let context =
                CopyContext::new(request.target_page).never_hide(request.never_hide_at_copy);

            match self.store.copy_element(&context, element.uid) {
                Ok(new_uid) => {
                    if request.retargets_language() {
                        if let Err(err) = self.store.update_field(
                            new_uid,
                            "language",
                            FieldValue::Int(request.target_language),
                        ) {
                            // The copy exists; only the retarget write failed.
                            tracing::error!(
                                source_uid = element.uid,
                                new_uid,
                                %err,
                                "language retarget failed after copy"
                            );
                        }
                    }
                    tracing::debug!(source_uid = element.uid, new_uid, "element copied");
                    outcome.copied += 1;
                }
                Err(err) => {
                    tracing::error!(source_uid = element.uid, %err, "element copy failed");
                    outcome.failed.push(element.uid);
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::access::{PagePermissions, PageRecord};
    use crate::element::ContentElement;
    use crate::error::StoreError;
    use crate::store::SqliteStore;
    use std::cell::Cell;

    fn page(uid: i64) -> PageRecord {
        PageRecord {
            uid,
            title: format!("Page {uid}"),
            perms_user_id: 0,
            perms_group_id: 0,
            perms_user: 31,
            perms_group: 27,
            perms_everybody: 0,
        }
    }

    fn element(uid: i64, page_id: i64, language: i64, col_pos: i64, sorting: i64) -> ContentElement {
        ContentElement {
            uid,
            page_id,
            language,
            col_pos,
            header: format!("Element {sorting}"),
            ctype: "text".to_string(),
            sorting,
            hidden: false,
            workspace: 0,
            container_parent: 0,
        }
    }

    fn store_with_pages() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.insert_page(&page(10)).unwrap();
        store.insert_page(&page(20)).unwrap();
        store
    }

    /// Store wrapper counting update_field writes
    struct RecordingStore<'a> {
        inner: &'a SqliteStore,
        updates: Cell<u32>,
    }

    impl RecordStore for RecordingStore<'_> {
        fn query_elements(
            &self,
            filter: &ElementFilter,
        ) -> std::result::Result<Vec<ContentElement>, StoreError> {
            self.inner.query_elements(filter)
        }

        fn get_page(&self, uid: i64) -> std::result::Result<Option<PageRecord>, StoreError> {
            self.inner.get_page(uid)
        }

        fn copy_element(
            &self,
            context: &CopyContext,
            source_uid: i64,
        ) -> std::result::Result<i64, StoreError> {
            self.inner.copy_element(context, source_uid)
        }

        fn update_field(
            &self,
            uid: i64,
            field: &str,
            value: FieldValue,
        ) -> std::result::Result<(), StoreError> {
            self.updates.set(self.updates.get() + 1);
            self.inner.update_field(uid, field, value)
        }
    }

    /// Store wrapper that refuses to copy one chosen element
    struct FaultyStore<'a> {
        inner: &'a SqliteStore,
        fail_uid: i64,
    }

    impl RecordStore for FaultyStore<'_> {
        fn query_elements(
            &self,
            filter: &ElementFilter,
        ) -> std::result::Result<Vec<ContentElement>, StoreError> {
            self.inner.query_elements(filter)
        }

        fn get_page(&self, uid: i64) -> std::result::Result<Option<PageRecord>, StoreError> {
            self.inner.get_page(uid)
        }

        fn copy_element(
            &self,
            context: &CopyContext,
            source_uid: i64,
        ) -> std::result::Result<i64, StoreError> {
            if source_uid == self.fail_uid {
                return Err(StoreError::Database("disk I/O error".to_string()));
            }
            self.inner.copy_element(context, source_uid)
        }

        fn update_field(
            &self,
            uid: i64,
            field: &str,
            value: FieldValue,
        ) -> std::result::Result<(), StoreError> {
            self.inner.update_field(uid, field, value)
        }
    }

    fn target_elements(store: &SqliteStore, page_id: i64, language: i64) -> Vec<ContentElement> {
        store
            .query_elements(&ElementFilter::new(page_id, language, 0))
            .unwrap()
    }

    #[test]
    fn test_copy_subset_retargets_language() {
        // Page 10 holds A(col0,sort1), B(col0,sort2), C(col1,sort1) in lang 1.
        let store = store_with_pages();
        let a = store.insert_element(&element(0, 10, 1, 0, 1)).unwrap();
        let b = store.insert_element(&element(0, 10, 1, 0, 2)).unwrap();
        let c = store.insert_element(&element(0, 10, 1, 1, 1)).unwrap();

        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        let request = CopyRequest::new(10, 20, 1)
            .to_language(2)
            .with_elements(vec![a, b]);
        let outcome = orchestrator
            .copy_elements(&request, &Actor::admin(1))
            .unwrap();

        assert_eq!(outcome.copied, 2);
        assert!(outcome.failed.is_empty());

        let copies = target_elements(&store, 20, 2);
        assert_eq!(copies.len(), 2);
        assert!(copies.iter().all(|e| e.page_id == 20 && e.language == 2));

        // C stays untouched on the source page.
        let source = target_elements(&store, 10, 1);
        assert_eq!(source.len(), 3);
        assert!(source.iter().any(|e| e.uid == c));
        assert!(target_elements(&store, 20, 1).is_empty());
    }

    #[test]
    fn test_copy_preserves_visual_order() {
        let store = store_with_pages();
        store.insert_element(&element(0, 10, 1, 0, 1)).unwrap();
        store.insert_element(&element(0, 10, 1, 0, 2)).unwrap();
        store.insert_element(&element(0, 10, 1, 0, 3)).unwrap();

        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        let request = CopyRequest::new(10, 20, 1);
        let outcome = orchestrator
            .copy_elements(&request, &Actor::admin(1))
            .unwrap();
        assert_eq!(outcome.copied, 3);

        // Ascending sort order on the target matches the source order.
        let copies = target_elements(&store, 20, 1);
        let headers: Vec<&str> = copies.iter().map(|e| e.header.as_str()).collect();
        assert_eq!(headers, vec!["Element 1", "Element 2", "Element 3"]);
    }

    #[test]
    fn test_container_copy_carries_children() {
        let store = store_with_pages();
        let mut container = element(0, 10, 1, 0, 1);
        container.ctype = "container".to_string();
        let container_src = store.insert_element(&container).unwrap();
        let mut child = element(0, 10, 1, 0, 2);
        child.container_parent = container_src;
        store.insert_element(&child).unwrap();

        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        let request = CopyRequest::new(10, 20, 1).to_language(2);
        let outcome = orchestrator
            .copy_elements(&request, &Actor::admin(1))
            .unwrap();

        // The child is never a candidate of its own.
        assert_eq!(outcome.copied, 1);

        let copies = target_elements(&store, 20, 2);
        assert_eq!(copies.len(), 1);
        let container_copy = copies[0].uid;

        let all = store
            .query_elements(&ElementFilter::new(20, 2, 0).with_container_children())
            .unwrap();
        assert_eq!(all.len(), 2);
        let child_copy = all.iter().find(|e| e.uid != container_copy).unwrap();
        assert_eq!(child_copy.container_parent, container_copy);
        assert_eq!(child_copy.language, 2);
    }

    #[test]
    fn test_failed_element_recorded_and_batch_continues() {
        let store = store_with_pages();
        let a = store.insert_element(&element(0, 10, 1, 0, 1)).unwrap();
        let b = store.insert_element(&element(0, 10, 1, 0, 2)).unwrap();
        let c = store.insert_element(&element(0, 10, 1, 0, 3)).unwrap();
        let faulty = FaultyStore {
            inner: &store,
            fail_uid: b,
        };

        let orchestrator = CopyOrchestrator::new(&faulty, &PagePermissions);
        let outcome = orchestrator
            .copy_elements(&CopyRequest::new(10, 20, 1), &Actor::admin(1))
            .unwrap();

        assert_eq!(outcome.copied, 2);
        assert_eq!(outcome.failed, vec![b]);

        // The surviving copies keep their relative order.
        let headers: Vec<String> = target_elements(&store, 20, 1)
            .into_iter()
            .map(|e| e.header)
            .collect();
        assert_eq!(
            headers,
            vec![format!("Element {a}"), format!("Element {c}")]
        );
    }

    #[test]
    fn test_empty_candidate_set_returns_zero() {
        let store = store_with_pages();
        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        let outcome = orchestrator
            .copy_elements(&CopyRequest::new(10, 20, 1), &Actor::admin(1))
            .unwrap();
        assert_eq!(outcome.copied, 0);
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn test_unknown_uids_silently_excluded() {
        let store = store_with_pages();
        let a = store.insert_element(&element(0, 10, 1, 0, 1)).unwrap();

        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        let request = CopyRequest::new(10, 20, 1).with_elements(vec![a, 9999]);
        let outcome = orchestrator
            .copy_elements(&request, &Actor::admin(1))
            .unwrap();
        assert_eq!(outcome.copied, 1);
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn test_same_language_issues_no_update_write() {
        let store = store_with_pages();
        store.insert_element(&element(0, 10, 1, 0, 1)).unwrap();
        let recording = RecordingStore {
            inner: &store,
            updates: Cell::new(0),
        };

        let orchestrator = CopyOrchestrator::new(&recording, &PagePermissions);
        let outcome = orchestrator
            .copy_elements(&CopyRequest::new(10, 20, 1), &Actor::admin(1))
            .unwrap();

        assert_eq!(outcome.copied, 1);
        assert_eq!(recording.updates.get(), 0);
        assert_eq!(target_elements(&store, 20, 1).len(), 1);
    }

    #[test]
    fn test_permission_denied_copies_nothing() {
        let store = store_with_pages();
        store.insert_element(&element(0, 10, 1, 0, 1)).unwrap();

        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        // Non-admin with no page ownership: read check on the source fails.
        let err = orchestrator
            .copy_elements(&CopyRequest::new(10, 20, 1), &Actor::user(7))
            .unwrap_err();
        assert!(matches!(err, PagecopyError::PermissionDenied(_)));
        assert!(target_elements(&store, 20, 1).is_empty());
    }

    #[test]
    fn test_missing_target_page_is_permission_denied() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert_page(&page(10)).unwrap();

        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        let err = orchestrator
            .copy_elements(&CopyRequest::new(10, 99, 1), &Actor::admin(1))
            .unwrap_err();
        assert!(matches!(err, PagecopyError::PermissionDenied(_)));
    }

    #[test]
    fn test_reinvocation_creates_independent_copies() {
        let store = store_with_pages();
        store.insert_element(&element(0, 10, 1, 0, 1)).unwrap();

        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        let request = CopyRequest::new(10, 20, 1);
        orchestrator
            .copy_elements(&request, &Actor::admin(1))
            .unwrap();
        orchestrator
            .copy_elements(&request, &Actor::admin(1))
            .unwrap();

        assert_eq!(target_elements(&store, 20, 1).len(), 2);
    }

    #[test]
    fn test_never_hide_forces_copies_visible() {
        let store = store_with_pages();
        let mut hidden = element(0, 10, 1, 0, 1);
        hidden.hidden = true;
        store.insert_element(&hidden).unwrap();

        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);
        orchestrator
            .copy_elements(&CopyRequest::new(10, 20, 1), &Actor::admin(1))
            .unwrap();
        assert!(!target_elements(&store, 20, 1)[0].hidden);

        orchestrator
            .copy_elements(
                &CopyRequest::new(10, 20, 1).keep_hidden_state(),
                &Actor::admin(1),
            )
            .unwrap();
        let copies = target_elements(&store, 20, 1);
        assert!(copies.iter().any(|e| e.hidden));
    }

    #[test]
    fn test_invalid_request_rejected() {
        let store = store_with_pages();
        let orchestrator = CopyOrchestrator::new(&store, &PagePermissions);

        let err = orchestrator
            .copy_elements(&CopyRequest::new(0, 20, 1), &Actor::admin(1))
            .unwrap_err();
        assert!(matches!(err, PagecopyError::InvalidArgument(_)));

        let err = orchestrator
            .copy_elements(&CopyRequest::new(10, 20, -1), &Actor::admin(1))
            .unwrap_err();
        assert!(matches!(err, PagecopyError::InvalidArgument(_)));
    }
}
