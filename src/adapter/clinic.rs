use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{required, ClinicAdapter};
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::Profile;
use crate::scheduling::revenue::total_revenue;
use crate::tenant::{Role, Scope, TenantContext};

/// The caller's own clinic profile.
#[derive(Debug, Clone, Serialize)]
pub struct ClinicInfo {
    pub clinic_id: Uuid,
    pub email: String,
    pub clinic_name: Option<String>,
    pub role: String,
}

impl From<Profile> for ClinicInfo {
    fn from(p: Profile) -> Self {
        Self {
            clinic_id: p.id,
            email: p.email,
            clinic_name: p.clinic_name,
            role: p.role,
        }
    }
}

/// System-wide counters for super admins. Every profile owns one clinic, so
/// `total_clinics` is also the account count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub total_clinics: i64,
    pub total_patients: i64,
    pub total_controls: i64,
    pub total_revenue: i64,
    /// `0` when there are no clinics.
    pub average_revenue_per_clinic: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

fn ensure_super_admin(tenant: &TenantContext) -> SchedulingResult<()> {
    if tenant.is_super_admin() {
        Ok(())
    } else {
        Err(SchedulingError::Forbidden("super_admin role required".into()))
    }
}

impl ClinicAdapter {
    pub async fn get_clinic(&self, tenant: &TenantContext) -> SchedulingResult<ClinicInfo> {
        self.store
            .get_profile(tenant.clinic_id)
            .await?
            .map(ClinicInfo::from)
            .ok_or(SchedulingError::NotFound("clinic"))
    }

    pub async fn update_clinic_name(&self, tenant: &TenantContext, name: &str) -> SchedulingResult<ClinicInfo> {
        let name = required(name, "clinic_name")?;
        let profile = self
            .store
            .update_profile_clinic_name(tenant.clinic_id, &name)
            .await?
            .ok_or(SchedulingError::NotFound("clinic"))?;
        tracing::info!(clinic_id = %tenant.clinic_id, "clinic renamed");
        Ok(profile.into())
    }

    pub async fn list_profiles(&self, tenant: &TenantContext) -> SchedulingResult<Vec<Profile>> {
        ensure_super_admin(tenant)?;
        Ok(self.store.list_profiles().await?)
    }

    pub async fn update_profile_role(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        update: RoleUpdate,
    ) -> SchedulingResult<Profile> {
        ensure_super_admin(tenant)?;
        if id == tenant.clinic_id && update.role != Role::SuperAdmin {
            return Err(SchedulingError::validation("cannot demote your own account"));
        }
        let profile = self
            .store
            .update_profile_role(id, update.role.as_str())
            .await?
            .ok_or(SchedulingError::NotFound("profile"))?;
        tracing::info!(profile_id = %id, role = update.role.as_str(), "profile role changed");
        Ok(profile)
    }

    pub async fn system_stats(&self, tenant: &TenantContext) -> SchedulingResult<SystemStats> {
        ensure_super_admin(tenant)?;
        let total_clinics = self.store.count_profiles().await?;
        let total_patients = self.store.count_patients(Scope::All).await?;
        let total_controls = self.store.count_controls(Scope::All).await?;
        let total_revenue = total_revenue(&self.store.list_costs(Scope::All).await?);
        let average_revenue_per_clinic = if total_clinics > 0 {
            total_revenue / total_clinics
        } else {
            0
        };
        Ok(SystemStats {
            total_clinics,
            total_patients,
            total_controls,
            total_revenue,
            average_revenue_per_clinic,
        })
    }
}
