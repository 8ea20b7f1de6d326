use uuid::Uuid;

use crate::error::DomainError;

/// The identity of whoever is calling a service operation.
///
/// Passed explicitly to every operation instead of being looked up from an
/// ambient session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewer {
    pub user_id: Option<Uuid>,
    pub is_admin: bool,
}

impl Viewer {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            is_admin: false,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            is_admin: true,
        }
    }

    /// The authenticated user id, or `Unauthorized` for guests.
    pub fn require_user(&self) -> Result<Uuid, DomainError> {
        self.user_id.ok_or(DomainError::Unauthorized)
    }

    pub fn is_owner(&self, owner_id: Uuid) -> bool {
        self.user_id == Some(owner_id)
    }

    /// Owners and administrators may manage a resource.
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.is_admin || self.is_owner(owner_id)
    }

    /// Fails with `Unauthorized` for guests and `Forbidden` for everyone else
    /// who is neither the owner nor an administrator.
    pub fn ensure_can_manage(&self, owner_id: Uuid, what: &str) -> Result<(), DomainError> {
        self.require_user()?;
        if self.can_manage(owner_id) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "only the author or an administrator may modify this {what}"
            )))
        }
    }

    pub fn ensure_admin(&self) -> Result<(), DomainError> {
        self.require_user()?;
        if self.is_admin {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "administrator role required".to_string(),
            ))
        }
    }
}
