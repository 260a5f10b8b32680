//! Pagecopy Core - Content element selection and copy orchestration
//!
//! This crate provides the core functionality for copying content elements
//! between pages of a content-management backend:
//!
//! - **Element**: Content element model (page, language, layout column, sort order)
//! - **Access**: Explicit actor values and mask-based page permission checks (read=1, edit=16)
//! - **Store**: Record-store boundary trait with a SQLite implementation
//! - **Query**: Element Query Service - per-column listing for UI selection
//! - **Copy**: Copy Orchestrator - permission-gated, per-element record copies
//!   with optional language retargeting and partial-failure tracking
//!
//! # Architecture
//!
//! The core is deliberately thin: it reads candidate elements through the
//! store boundary and issues one copy-record operation per element, strictly
//! sequentially, with a fresh copy context each time. A single element's
//! failure is logged and recorded but never aborts the batch.

pub mod access;
pub mod copy;
pub mod element;
pub mod error;
pub mod query;
pub mod store;

pub use access::{AccessPolicy, Actor, PagePermissions, PageRecord, Permission};
pub use copy::{CopyContext, CopyOrchestrator, CopyOutcome, CopyRequest};
pub use element::{ContentElement, DEFAULT_LANGUAGE};
pub use error::{PagecopyError, Result, StoreError};
pub use query::ElementQuery;
pub use store::{ElementFilter, FieldValue, RecordStore, SortOrder};
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
