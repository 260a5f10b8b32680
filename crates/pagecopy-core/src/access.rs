//! Page-level authorization
//!
//! The platform's ambient backend-user global is replaced by an explicit
//! [`Actor`] value passed into every orchestrator call.

use serde::{Deserialize, Serialize};

/// The backend user performing an operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Backend user id
    pub user_id: i64,
    /// Group memberships
    pub groups: Vec<i64>,
    /// Current draft workspace (0 = live)
    pub workspace: i64,
    /// Admins pass every permission check
    pub admin: bool,
}

impl Actor {
    /// A regular backend user in the live workspace
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id,
            groups: Vec::new(),
            workspace: 0,
            admin: false,
        }
    }

    /// An administrator in the live workspace
    pub fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            groups: Vec::new(),
            workspace: 0,
            admin: true,
        }
    }

    pub fn with_groups(mut self, groups: Vec<i64>) -> Self {
        self.groups = groups;
        self
    }

    pub fn in_workspace(mut self, workspace: i64) -> Self {
        self.workspace = workspace;
        self
    }
}

/// Page permission required for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Show the page and read its records
    Read,
    /// Edit records on the page
    Edit,
}

impl Permission {
    /// Bit in the page permission masks
    pub fn mask(self) -> i64 {
        match self {
            Permission::Read => 1,
            Permission::Edit => 16,
        }
    }
}

/// A page record as consulted by permission checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub uid: i64,
    pub title: String,
    /// Owning backend user
    pub perms_user_id: i64,
    /// Owning group
    pub perms_group_id: i64,
    /// Permission mask for the owner
    pub perms_user: i64,
    /// Permission mask for members of the owning group
    pub perms_group: i64,
    /// Permission mask for everybody else
    pub perms_everybody: i64,
}

/// Authorization boundary consumed by the copy orchestrator
pub trait AccessPolicy {
    /// Whether the actor holds the given permission on the page
    fn has_access(&self, actor: &Actor, page: &PageRecord, permission: Permission) -> bool;
}

/// Mask-based page permission evaluation.
///
/// The actor's effective mask is the union of the everybody mask, the owner
/// mask when the actor owns the page, and the group mask when the actor is a
/// member of the owning group.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagePermissions;

impl AccessPolicy for PagePermissions {
    fn has_access(&self, actor: &Actor, page: &PageRecord, permission: Permission) -> bool {
        if actor.admin {
            return true;
        }

        let mut effective = page.perms_everybody;
        if page.perms_user_id != 0 && actor.user_id == page.perms_user_id {
            effective |= page.perms_user;
        }
        if page.perms_group_id != 0 && actor.groups.contains(&page.perms_group_id) {
            effective |= page.perms_group;
        }

        effective & permission.mask() != 0
    }
}
