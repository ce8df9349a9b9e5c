use uuid::Uuid;

use super::ClinicAdapter;
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::Notification;
use crate::tenant::TenantContext;

const NOTIFICATION_PAGE: i64 = 100;

impl ClinicAdapter {
    /// Newest first.
    pub async fn list_notifications(&self, tenant: &TenantContext) -> SchedulingResult<Vec<Notification>> {
        Ok(self
            .store
            .list_notifications(tenant.scope(), NOTIFICATION_PAGE)
            .await?)
    }

    /// Badge counter. A store failure reads as zero.
    pub async fn unread_notification_count(&self, tenant: &TenantContext) -> i64 {
        match self.store.count_unread_notifications(tenant.scope()).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "unread notification count failed");
                0
            }
        }
    }

    pub async fn mark_notification_read(&self, tenant: &TenantContext, id: Uuid) -> SchedulingResult<()> {
        if self.store.mark_notification_read(tenant.scope(), id).await? {
            Ok(())
        } else {
            Err(SchedulingError::NotFound("notification"))
        }
    }

    /// Returns how many rows flipped to read.
    pub async fn mark_all_notifications_read(&self, tenant: &TenantContext) -> SchedulingResult<u64> {
        Ok(self.store.mark_all_notifications_read(tenant.scope()).await?)
    }

    pub async fn delete_notification(&self, tenant: &TenantContext, id: Uuid) -> SchedulingResult<()> {
        if self.store.delete_notification(tenant.scope(), id).await? {
            Ok(())
        } else {
            Err(SchedulingError::NotFound("notification"))
        }
    }
}
