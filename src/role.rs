use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Caller role, pre-validated upstream and trusted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Participant,
    Viewer,
}

impl Role {
    /// Only admins may drive the captions enable/disable edges and
    /// start or stop recordings.
    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Participant => write!(f, "participant"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

/// Capability check at the entry of every admin-gated operation.
pub fn ensure_admin(role: Role, action: &str) -> CoreResult<()> {
    if role.can_moderate() {
        Ok(())
    } else {
        Err(CoreError::PermissionDenied(format!(
            "role '{}' may not {}",
            role, action
        )))
    }
}
