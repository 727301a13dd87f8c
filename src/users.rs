//! User management module
//!
//! In-memory user storage. Besides profile data each user owns a token salt
//! and a permission bitmask, both consumed by the token layer.

use crate::auth::permissions::{self, Capability, PermissionMask};
use crate::auth::{hash_password, Role};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

const SALT_LENGTH: usize = 32;

/// User model
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub permissions: PermissionMask,
    /// Appended to the session secret when signing this user's tokens
    pub token_salt: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New user with the role's preset permissions and a fresh salt
    pub fn new(email: String, password_hash: String, name: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            role,
            permissions: role.default_permissions(),
            token_salt: generate_salt(),
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User response (without sensitive data)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub permissions: PermissionMask,
    pub capabilities: Vec<Capability>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            permissions: user.permissions,
            capabilities: permissions::capabilities(user.permissions),
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}

/// In-memory user store
pub struct UserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    email_index: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            email_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new user
    pub async fn create(&self, user: User) -> Result<User, AppError> {
        // Lock order: email_index, then users
        let mut email_index = self.email_index.write().await;
        let mut users = self.users.write().await;

        let key = user.email.to_lowercase();
        if email_index.contains_key(&key) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        email_index.insert(key, user.id);
        users.insert(user.id, user.clone());

        Ok(user)
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let email_index = self.email_index.read().await;
        let users = self.users.read().await;

        email_index
            .get(&email.to_lowercase())
            .and_then(|id| users.get(id).cloned())
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Option<User> {
        let users = self.users.read().await;
        users.get(&id).cloned()
    }

    /// Current token salt for a user, if the user exists
    pub async fn salt_for(&self, id: Uuid) -> Option<String> {
        let users = self.users.read().await;
        users.get(&id).map(|u| u.token_salt.clone())
    }

    /// List all users
    pub async fn list(&self) -> Vec<UserResponse> {
        let users = self.users.read().await;
        let mut list: Vec<UserResponse> = users.values().map(UserResponse::from).collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        list
    }

    /// Replace a user's permission bitmask
    ///
    /// Tokens already issued keep their old bitmask until they are refreshed.
    pub async fn update_permissions(
        &self,
        id: Uuid,
        mask: PermissionMask,
    ) -> Result<User, AppError> {
        let mask = permissions::validate_permissions(mask)?;
        let mut users = self.users.write().await;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let previous = user.permissions;
        user.permissions = mask;
        user.updated_at = Utc::now();

        info!(user_id = %id, previous, current = mask, "Updated user permissions");
        Ok(user.clone())
    }

    /// Give a user a fresh salt, invalidating every token signed with the old one
    pub async fn rotate_salt(&self, id: Uuid) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        user.token_salt = generate_salt();
        user.updated_at = Utc::now();

        info!(user_id = %id, "Rotated token salt");
        Ok(user.clone())
    }

    /// Mark the user owning `email` as verified
    pub async fn mark_email_verified(&self, email: &str) -> Result<User, AppError> {
        let id = self
            .email_index
            .read()
            .await
            .get(&email.to_lowercase())
            .copied()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !user.email_verified {
            user.email_verified = true;
            user.updated_at = Utc::now();
            info!(user_id = %id, "Email verified");
        }
        Ok(user.clone())
    }

    /// Create the bootstrap administrator unless the email is already taken
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.find_by_email(email).await.is_some() {
            return Ok(());
        }

        let mut admin = User::new(
            email.to_string(),
            hash_password(password)?,
            "Administrator".to_string(),
            Role::Admin,
        );
        admin.email_verified = true;

        self.create(admin).await?;
        info!(email, "Seeded administrator account");
        Ok(())
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
