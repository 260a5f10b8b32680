//! HTTP endpoint handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use pagecopy_core::{
    Actor, ContentElement, CopyOrchestrator, CopyRequest, ElementQuery, PagecopyError,
};

use crate::{auth, AppState};

/// Parameters for the get-elements endpoint (query string or JSON body)
#[derive(Debug, Default, Deserialize)]
pub struct GetElementsParams {
    #[serde(default, rename = "pageId")]
    pub page_id: i64,
    #[serde(default, rename = "languageId")]
    pub language_id: i64,
}

/// Body of the copy endpoint
#[derive(Debug, Deserialize)]
pub struct CopyParams {
    #[serde(default, rename = "sourcePid")]
    pub source_pid: i64,
    #[serde(default, rename = "targetPid")]
    pub target_pid: i64,
    #[serde(default, rename = "languageId")]
    pub language_id: i64,
    #[serde(default, rename = "targetLanguageUid")]
    pub target_language_uid: Option<i64>,
    #[serde(default, rename = "elementUids")]
    pub element_uids: Vec<i64>,
    #[serde(default = "default_never_hide", rename = "neverHideAtCopy")]
    pub never_hide_at_copy: bool,
}

fn default_never_hide() -> bool {
    true
}

fn error_response(err: &PagecopyError) -> (StatusCode, Json<Value>) {
    match err {
        PagecopyError::InvalidArgument(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Invalid parameters",
            })),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": format!("Error: {other}"),
            })),
        ),
    }
}

fn lock_poisoned() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Error: store lock poisoned",
        })),
    )
}

fn elements_response(grouped: BTreeMap<i64, Vec<ContentElement>>) -> Value {
    let columns: serde_json::Map<String, Value> = grouped
        .into_iter()
        .map(|(col_pos, elements)| {
            let rows: Vec<Value> = elements
                .iter()
                .map(|e| {
                    json!({
                        "uid": e.uid,
                        "header": e.header,
                        "CType": e.ctype,
                        "colPos": e.col_pos,
                    })
                })
                .collect();
            (col_pos.to_string(), Value::Array(rows))
        })
        .collect();
    Value::Object(columns)
}

/// Get content elements for a page and language (query-string variant)
pub async fn get_elements_query(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<GetElementsParams>,
) -> (StatusCode, Json<Value>) {
    get_elements(&state, auth::actor_from_headers(&headers), params)
}

/// Get content elements for a page and language (JSON body variant)
pub async fn get_elements_body(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(params): Json<GetElementsParams>,
) -> (StatusCode, Json<Value>) {
    get_elements(&state, auth::actor_from_headers(&headers), params)
}

fn get_elements(
    state: &AppState,
    actor: Actor,
    params: GetElementsParams,
) -> (StatusCode, Json<Value>) {
    let Ok(store) = state.store.lock() else {
        return lock_poisoned();
    };

    let query = ElementQuery::new(&*store);
    match query.list(&actor, params.page_id, params.language_id) {
        Ok(grouped) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "contentElements": elements_response(grouped),
            })),
        ),
        Err(err) => error_response(&err),
    }
}

/// Copy content elements from the source page to the target page
pub async fn copy_elements(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(params): Json<CopyParams>,
) -> (StatusCode, Json<Value>) {
    let actor = auth::actor_from_headers(&headers);

    let mut request = CopyRequest::new(params.source_pid, params.target_pid, params.language_id)
        .to_language(params.target_language_uid.unwrap_or(params.language_id))
        .with_elements(params.element_uids.clone());
    if !params.never_hide_at_copy {
        request = request.keep_hidden_state();
    }

    let Ok(store) = state.store.lock() else {
        return lock_poisoned();
    };

    let orchestrator = CopyOrchestrator::new(&*store, &state.policy);
    match orchestrator.copy_elements(&request, &actor) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!(
                    "Successfully copied {} content element(s) to page {}",
                    outcome.copied, params.target_pid
                ),
                "count": outcome.copied,
            })),
        ),
        Err(err) => error_response(&err),
    }
}

/// Liveness plus store row counts
pub async fn get_status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let Ok(store) = state.store.lock() else {
        return lock_poisoned();
    };

    let pages = store.count_pages().unwrap_or(0);
    let elements = store.count_elements().unwrap_or(0);
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "pages": pages,
            "elements": elements,
        })),
    )
}
