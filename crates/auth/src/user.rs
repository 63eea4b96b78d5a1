//! User directory: roles, account status, and the `users` collection.

use serde::{Deserialize, Serialize};

use stockroom_core::{DocumentId, DomainError, DomainResult, UserId};
use stockroom_store::{DocumentStore, Query, ServerInstant, encode};

const COLLECTION: &str = "users";

// ─────────────────────────────────────────────────────────────────────────────
// Roles & Status
// ─────────────────────────────────────────────────────────────────────────────

/// Application role. A closed set: exhaustive matching catches any
/// forgotten branch when a role is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    WarehouseStaff,
    Supplier,
    Internal,
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::WarehouseStaff => write!(f, "warehouse_staff"),
            Role::Supplier => write!(f, "supplier"),
            Role::Internal => write!(f, "internal"),
        }
    }
}

/// Account approval status.
///
/// New sign-ups start pending; an admin approves or rejects. Rejected
/// accounts are retained (no hard delete in the user lifecycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity & Directory Record
// ─────────────────────────────────────────────────────────────────────────────

/// Identity as reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub auth_id: UserId,
    pub email: String,
    pub display_name: String,
}

/// A user directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: DocumentId,
    pub created_at: ServerInstant,
    pub updated_at: ServerInstant,
    pub auth_id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// Input for provisioning a directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub auth_id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository
// ─────────────────────────────────────────────────────────────────────────────

/// `users` collection access.
///
/// Records are created at first sign-in or by admin provisioning, mutated on
/// profile edits and role/status changes, and never hard-deleted.
pub struct UserRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> UserRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Look up the directory record for a signed-in identity, creating a
    /// pending one on first sign-in.
    pub fn ensure_signed_in(&self, identity: &AuthUser) -> DomainResult<User> {
        if let Some(existing) = self.find_by_auth_id(identity.auth_id)? {
            return Ok(existing);
        }

        self.provision(NewUser {
            auth_id: identity.auth_id,
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            role: Role::Internal,
            status: AccountStatus::Pending,
            phone: None,
            company: None,
        })
    }

    /// Create a directory record (admin provisioning or first sign-in).
    pub fn provision(&self, new: NewUser) -> DomainResult<User> {
        if new.email.trim().is_empty() || !new.email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        if new.display_name.trim().is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }

        let record = NewUser {
            email: new.email.trim().to_lowercase(),
            display_name: new.display_name.trim().to_string(),
            ..new
        };

        let doc = self
            .store
            .add(COLLECTION, encode(&record)?)
            .map_err(|e| {
                tracing::error!(error = %e, "creating user record failed");
                DomainError::from(e)
            })?;

        tracing::info!(user = %record.auth_id, role = %record.role, "user record created");
        Ok(doc.decode()?)
    }

    pub fn get(&self, id: DocumentId) -> DomainResult<Option<User>> {
        let doc = self.store.get(COLLECTION, id).map_err(|e| {
            tracing::error!(error = %e, "fetching user failed");
            DomainError::from(e)
        })?;
        doc.map(|d| d.decode().map_err(DomainError::from)).transpose()
    }

    pub fn find_by_auth_id(&self, auth_id: UserId) -> DomainResult<Option<User>> {
        let query = Query::where_eq("auth_id", serde_json::json!(auth_id));
        let docs = self.store.query(COLLECTION, &query).map_err(|e| {
            tracing::error!(error = %e, "user lookup failed");
            DomainError::from(e)
        })?;
        docs.first()
            .map(|d| d.decode().map_err(DomainError::from))
            .transpose()
    }

    pub fn list(&self) -> DomainResult<Vec<User>> {
        let docs = self
            .store
            .query(COLLECTION, &Query::all().oldest_first())
            .map_err(|e| {
                tracing::error!(error = %e, "listing users failed");
                DomainError::from(e)
            })?;
        docs.iter()
            .map(|d| d.decode().map_err(DomainError::from))
            .collect()
    }

    pub fn update_profile(&self, id: DocumentId, patch: ProfilePatch) -> DomainResult<User> {
        if let Some(name) = &patch.display_name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("display name cannot be empty"));
            }
        }

        let doc = self
            .store
            .update(COLLECTION, id, encode(&patch)?)
            .map_err(|e| {
                tracing::error!(error = %e, "profile update failed");
                DomainError::from(e)
            })?;
        Ok(doc.decode()?)
    }

    pub fn set_role(&self, id: DocumentId, role: Role) -> DomainResult<User> {
        let doc = self
            .store
            .update(COLLECTION, id, serde_json::json!({ "role": role }))
            .map_err(|e| {
                tracing::error!(error = %e, "role change failed");
                DomainError::from(e)
            })?;
        tracing::info!(user = %id, role = %role, "role changed");
        Ok(doc.decode()?)
    }

    pub fn set_status(&self, id: DocumentId, status: AccountStatus) -> DomainResult<User> {
        let doc = self
            .store
            .update(COLLECTION, id, serde_json::json!({ "status": status }))
            .map_err(|e| {
                tracing::error!(error = %e, "status change failed");
                DomainError::from(e)
            })?;
        Ok(doc.decode()?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockroom_store::InMemoryStore;

    use super::*;

    fn repo() -> UserRepository<Arc<InMemoryStore>> {
        UserRepository::new(Arc::new(InMemoryStore::new()))
    }

    fn identity(email: &str) -> AuthUser {
        AuthUser {
            auth_id: UserId::new(),
            email: email.to_string(),
            display_name: "Alice Smith".to_string(),
        }
    }

    #[test]
    fn first_sign_in_creates_pending_internal_user() {
        let repo = repo();
        let user = repo.ensure_signed_in(&identity("alice@example.com")).unwrap();

        assert_eq!(user.status, AccountStatus::Pending);
        assert_eq!(user.role, Role::Internal);
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn repeated_sign_in_reuses_the_record() {
        let repo = repo();
        let id = identity("alice@example.com");

        let first = repo.ensure_signed_in(&id).unwrap();
        let second = repo.ensure_signed_in(&id).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn provision_rejects_malformed_email() {
        let repo = repo();
        let result = repo.provision(NewUser {
            auth_id: UserId::new(),
            email: "not-an-email".to_string(),
            display_name: "Bob".to_string(),
            role: Role::Supplier,
            status: AccountStatus::Approved,
            phone: None,
            company: None,
        });
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn provision_normalizes_email_and_name() {
        let repo = repo();
        let user = repo
            .provision(NewUser {
                auth_id: UserId::new(),
                email: "  Carol@Example.COM ".to_string(),
                display_name: "  Carol  ".to_string(),
                role: Role::WarehouseStaff,
                status: AccountStatus::Approved,
                phone: None,
                company: None,
            })
            .unwrap();
        assert_eq!(user.email, "carol@example.com");
        assert_eq!(user.display_name, "Carol");
    }

    #[test]
    fn role_and_status_changes_round_trip() {
        let repo = repo();
        let user = repo.ensure_signed_in(&identity("dave@example.com")).unwrap();

        let user = repo.set_role(user.id, Role::Supplier).unwrap();
        assert_eq!(user.role, Role::Supplier);

        let user = repo.set_status(user.id, AccountStatus::Approved).unwrap();
        assert_eq!(user.status, AccountStatus::Approved);
        assert!(user.updated_at > user.created_at);
    }

    #[test]
    fn profile_patch_leaves_absent_fields_untouched() {
        let repo = repo();
        let user = repo.ensure_signed_in(&identity("eve@example.com")).unwrap();

        let user = repo
            .update_profile(
                user.id,
                ProfilePatch {
                    phone: Some("+1 555 0100".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(user.phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(user.display_name, "Alice Smith");
        assert_eq!(user.company, None);
    }

    #[test]
    fn missing_user_is_not_found() {
        let repo = repo();
        let result = repo.set_role(DocumentId::new(), Role::Admin);
        assert_eq!(result, Err(DomainError::NotFound));
    }
}
