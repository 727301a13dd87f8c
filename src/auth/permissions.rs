//! Capability bits and permission predicates
//!
//! A user's permissions are a single `u32` bitmask. Each [`Capability`] owns one
//! bit position. Positions are append-only: never reorder or reuse a position,
//! or tokens already in circulation silently change meaning.

use crate::auth::error::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission bitmask as stored on users and embedded in session tokens
pub type PermissionMask = u32;

/// A single authorized action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Capability {
    /// bit 0
    ViewAllProjects = 0,
    /// bit 1
    ReviewProjects = 1,
    /// bit 2
    ManageUsers = 2,
    /// bit 3
    ManagePermissions = 3,
    /// bit 4
    SubmitProject = 4,
    /// bit 5
    CommentOnProjects = 5,
    /// bit 6
    InvestInProjects = 6,
    /// bit 7
    ManageDocuments = 7,
    /// bit 8
    ManageInvestments = 8,
    /// bit 9
    ManageTeam = 9,
    /// bit 10
    IsAdmin = 10,
}

impl Capability {
    /// Every defined capability in bit order. New capabilities go at the end.
    pub const ALL: [Capability; 11] = [
        Capability::ViewAllProjects,
        Capability::ReviewProjects,
        Capability::ManageUsers,
        Capability::ManagePermissions,
        Capability::SubmitProject,
        Capability::CommentOnProjects,
        Capability::InvestInProjects,
        Capability::ManageDocuments,
        Capability::ManageInvestments,
        Capability::ManageTeam,
        Capability::IsAdmin,
    ];

    /// The bit this capability occupies in a [`PermissionMask`]
    pub const fn bit(self) -> PermissionMask {
        1 << (self as u8)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewAllProjects => "view_all_projects",
            Capability::ReviewProjects => "review_projects",
            Capability::ManageUsers => "manage_users",
            Capability::ManagePermissions => "manage_permissions",
            Capability::SubmitProject => "submit_project",
            Capability::CommentOnProjects => "comment_on_projects",
            Capability::InvestInProjects => "invest_in_projects",
            Capability::ManageDocuments => "manage_documents",
            Capability::ManageInvestments => "manage_investments",
            Capability::ManageTeam => "manage_team",
            Capability::IsAdmin => "is_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Individual bits
// ============================================

pub const PERM_VIEW_ALL_PROJECTS: PermissionMask = Capability::ViewAllProjects.bit();
pub const PERM_REVIEW_PROJECTS: PermissionMask = Capability::ReviewProjects.bit();
pub const PERM_MANAGE_USERS: PermissionMask = Capability::ManageUsers.bit();
pub const PERM_MANAGE_PERMISSIONS: PermissionMask = Capability::ManagePermissions.bit();
pub const PERM_SUBMIT_PROJECT: PermissionMask = Capability::SubmitProject.bit();
pub const PERM_COMMENT_ON_PROJECTS: PermissionMask = Capability::CommentOnProjects.bit();
pub const PERM_INVEST_IN_PROJECTS: PermissionMask = Capability::InvestInProjects.bit();
pub const PERM_MANAGE_DOCUMENTS: PermissionMask = Capability::ManageDocuments.bit();
pub const PERM_MANAGE_INVESTMENTS: PermissionMask = Capability::ManageInvestments.bit();
pub const PERM_MANAGE_TEAM: PermissionMask = Capability::ManageTeam.bit();
pub const PERM_IS_ADMIN: PermissionMask = Capability::IsAdmin.bit();

/// Mask of every bit that has a defined meaning
pub const VALID_PERMISSION_BITS: PermissionMask = (1 << Capability::ALL.len()) - 1;

// ============================================
// Role presets
// ============================================

pub const PERM_ADMIN: PermissionMask = VALID_PERMISSION_BITS;

pub const PERM_STARTUP_OWNER: PermissionMask = PERM_VIEW_ALL_PROJECTS
    | PERM_SUBMIT_PROJECT
    | PERM_COMMENT_ON_PROJECTS
    | PERM_MANAGE_DOCUMENTS
    | PERM_MANAGE_TEAM;

pub const PERM_INVESTOR: PermissionMask = PERM_VIEW_ALL_PROJECTS
    | PERM_COMMENT_ON_PROJECTS
    | PERM_INVEST_IN_PROJECTS
    | PERM_MANAGE_INVESTMENTS;

pub const PERM_REGULAR: PermissionMask = 0;

// ============================================
// Predicates
// ============================================

pub fn has_permission(mask: PermissionMask, capability: Capability) -> bool {
    mask & capability.bit() != 0
}

/// True when every listed capability is set. Vacuously true for an empty list.
pub fn has_all_permissions(mask: PermissionMask, capabilities: &[Capability]) -> bool {
    capabilities.iter().all(|c| has_permission(mask, *c))
}

/// True when at least one listed capability is set
pub fn has_any_permission(mask: PermissionMask, capabilities: &[Capability]) -> bool {
    capabilities.iter().any(|c| has_permission(mask, *c))
}

pub fn all_valid_bits() -> PermissionMask {
    VALID_PERMISSION_BITS
}

/// Reject a mask carrying bits outside the defined capability set
pub fn validate_permissions(mask: PermissionMask) -> Result<PermissionMask, AuthError> {
    let unknown = mask & !VALID_PERMISSION_BITS;
    if unknown != 0 {
        return Err(AuthError::InvalidPermissionBits(unknown));
    }
    Ok(mask)
}

/// Decompose a mask into its named capabilities, in bit order
pub fn capabilities(mask: PermissionMask) -> Vec<Capability> {
    Capability::ALL
        .iter()
        .copied()
        .filter(|c| has_permission(mask, *c))
        .collect()
}
