//! User and permission administration handlers

use crate::auth::permissions::{self, Capability, PermissionMask};
use crate::auth::{require_all, require_any, Credential, Role};
use crate::error::AppError;
use crate::state::SharedState;
use crate::users::UserResponse;
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub success: bool,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Only users holding this capability, by name
    pub capability: Option<String>,
}

/// New permissions, either as a raw bitmask or as capability names
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionsRequest {
    pub permissions: Option<PermissionMask>,
    pub capabilities: Option<Vec<Capability>>,
}

impl UpdatePermissionsRequest {
    fn into_mask(self) -> Result<PermissionMask, AppError> {
        match (self.permissions, self.capabilities) {
            (Some(mask), None) => Ok(mask),
            (None, Some(caps)) => Ok(caps.iter().fold(0, |acc, c| acc | c.bit())),
            _ => Err(AppError::BadRequest(
                "Provide exactly one of `permissions` or `capabilities`".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserUpdatedResponse {
    pub success: bool,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct CapabilityInfo {
    pub name: Capability,
    pub bit: PermissionMask,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCatalogue {
    pub success: bool,
    pub capabilities: Vec<CapabilityInfo>,
    pub presets: BTreeMap<String, PermissionMask>,
    pub valid_bits: PermissionMask,
}

/// GET /api/users
///
/// Requires `manage_users` or `manage_permissions`. `?capability=<name>`
/// narrows the list to users holding that capability.
pub async fn list_users(
    State(state): State<SharedState>,
    Extension(credential): Extension<Credential>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UsersListResponse>, AppError> {
    require_any(
        &credential,
        &[Capability::ManageUsers, Capability::ManagePermissions],
    )?;

    let filter = query
        .capability
        .as_deref()
        .map(|name| {
            Capability::parse(name)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown capability: {}", name)))
        })
        .transpose()?;

    let users = state
        .users
        .list()
        .await
        .into_iter()
        .filter(|u| filter.map_or(true, |c| permissions::has_permission(u.permissions, c)))
        .collect();

    Ok(Json(UsersListResponse {
        success: true,
        users,
    }))
}

/// PUT /api/users/{id}/permissions
///
/// Requires `manage_permissions`. The target's existing tokens keep their old
/// bitmask until refreshed.
pub async fn update_permissions(
    State(state): State<SharedState>,
    Extension(credential): Extension<Credential>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdatePermissionsRequest>,
) -> Result<Json<UserUpdatedResponse>, AppError> {
    require_all(&credential, &[Capability::ManagePermissions])?;

    let target = Uuid::parse_str(&user_id)
        .map_err(|_| AppError::BadRequest("Invalid user ID format".to_string()))?;

    let user = state.users.update_permissions(target, req.into_mask()?).await?;

    Ok(Json(UserUpdatedResponse {
        success: true,
        user: UserResponse::from(&user),
    }))
}

/// GET /api/permissions
///
/// Capability bits and role presets.
pub async fn permission_catalogue() -> Json<PermissionCatalogue> {
    Json(PermissionCatalogue {
        success: true,
        capabilities: Capability::ALL
            .iter()
            .map(|c| CapabilityInfo {
                name: *c,
                bit: c.bit(),
            })
            .collect(),
        presets: Role::ALL
            .iter()
            .map(|r| (r.to_string(), r.default_permissions()))
            .collect(),
        valid_bits: permissions::all_valid_bits(),
    })
}
