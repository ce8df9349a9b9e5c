use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles stored in `profiles.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

/// Row visibility for a store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Clinic(Uuid),
    All,
}

impl Scope {
    pub fn allows(&self, clinic_id: Uuid) -> bool {
        match self {
            Scope::Clinic(id) => *id == clinic_id,
            Scope::All => true,
        }
    }

    pub fn clinic_id(&self) -> Option<Uuid> {
        match self {
            Scope::Clinic(id) => Some(*id),
            Scope::All => None,
        }
    }
}

/// Caller identity threaded through every adapter call.
///
/// A clinic is identified by the id of the profile that owns it, so
/// `clinic_id` is the authenticated user's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub clinic_id: Uuid,
    pub role: Role,
}

impl TenantContext {
    pub fn new(clinic_id: Uuid, role: Role) -> Self {
        Self { clinic_id, role }
    }

    pub fn admin(clinic_id: Uuid) -> Self {
        Self::new(clinic_id, Role::Admin)
    }

    pub fn super_admin(clinic_id: Uuid) -> Self {
        Self::new(clinic_id, Role::SuperAdmin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Super admins read across every clinic; everyone else only their own.
    pub fn scope(&self) -> Scope {
        if self.is_super_admin() {
            Scope::All
        } else {
            Scope::Clinic(self.clinic_id)
        }
    }
}
