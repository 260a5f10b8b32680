//! Actor extraction from backend identity headers
//!
//! The surrounding platform authenticates the backend user; this service
//! receives the identity as request headers and turns it into an explicit
//! [`Actor`] for the core.

use axum::http::HeaderMap;

use pagecopy_core::Actor;

const USER_HEADER: &str = "x-backend-user";
const GROUPS_HEADER: &str = "x-backend-groups";
const WORKSPACE_HEADER: &str = "x-backend-workspace";
const ADMIN_HEADER: &str = "x-backend-admin";

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Build the acting backend user from request headers.
///
/// Requests without an identity header fall back to an administrator in the
/// live workspace, leaving access open during development.
pub fn actor_from_headers(headers: &HeaderMap) -> Actor {
    let Some(user_id) = header_i64(headers, USER_HEADER) else {
        return Actor::admin(0);
    };

    let groups: Vec<i64> = headers
        .get(GROUPS_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|raw| raw.split(',').filter_map(|part| part.trim().parse().ok()).collect())
        .unwrap_or_default();

    let workspace = header_i64(headers, WORKSPACE_HEADER).unwrap_or(0);

    let admin = headers
        .get(ADMIN_HEADER)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    let mut actor = Actor::user(user_id)
        .with_groups(groups)
        .in_workspace(workspace);
    actor.admin = admin;
    actor
}
