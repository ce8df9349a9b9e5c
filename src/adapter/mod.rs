//! Tenant-scoped gateway between callers and the [`ClinicStore`].
//!
//! Every operation takes the caller's [`TenantContext`], validates raw input
//! before touching the store, and maps store failures to
//! [`SchedulingError::Persistence`] with the store message preserved.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{NotificationKind, Patient};
use crate::store::{ClinicStore, NewNotification};
use crate::tenant::TenantContext;

mod clinic;
mod controls;
mod notifications;
mod patients;
mod reports;
mod schedules;

pub use clinic::{ClinicInfo, RoleUpdate, SystemStats};
pub use controls::{AppointmentFilter, ControlCategory, CreateControlInput, StatusUpdate};
pub use patients::{CreatePatientInput, PatientOverview, UpdatePatientInput};
pub use reports::{CalendarQuery, DashboardStats};
pub use schedules::{CreateScheduleInput, ScheduleFilter, UpdateScheduleInput};

/// Time of day used when a control is created with a date only.
pub const DEFAULT_CONTROL_TIME: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

#[derive(Clone)]
pub struct ClinicAdapter {
    store: Arc<dyn ClinicStore>,
}

impl ClinicAdapter {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ClinicStore {
        self.store.as_ref()
    }

    /// The patient behind a new control or schedule, if the caller can see
    /// it. Rows are filed under the patient's clinic.
    async fn visible_patient(&self, tenant: &TenantContext, patient_id: Uuid) -> SchedulingResult<Patient> {
        self.store
            .get_patient(tenant.scope(), patient_id)
            .await?
            .ok_or(SchedulingError::NotFound("patient"))
    }

    /// Insert a notification row for `clinic_id`. Failures are logged and
    /// swallowed.
    async fn notify(
        &self,
        clinic_id: Uuid,
        kind: NotificationKind,
        message: String,
        patient_id: Option<Uuid>,
        control_id: Option<Uuid>,
    ) {
        let new = NewNotification {
            clinic_id,
            patient_id,
            control_id,
            kind,
            message,
        };
        if let Err(e) = self.store.insert_notification(new).await {
            tracing::warn!(kind = kind.as_str(), error = %e, "notification insert failed");
        }
    }
}

/* -------------------------
   Input parsing
--------------------------*/

/// Trimmed, non-empty text.
fn required(raw: &str, field: &str) -> SchedulingResult<String> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(SchedulingError::validation(format!("{field} is required")));
    }
    Ok(v.to_string())
}

/// `None` for missing or blank text.
fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_uuid(raw: &str, field: &str) -> SchedulingResult<Uuid> {
    let v = required(raw, field)?;
    Uuid::parse_str(&v).map_err(|_| SchedulingError::validation(format!("{field} must be a UUID")))
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 instant.
pub fn parse_date(raw: &str, field: &str) -> SchedulingResult<NaiveDate> {
    let v = required(raw, field)?;
    if let Ok(d) = NaiveDate::parse_from_str(&v, "%Y-%m-%d") {
        return Ok(d);
    }
    DateTime::parse_from_rfc3339(&v)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| SchedulingError::validation(format!("{field} must be YYYY-MM-DD")))
}

fn parse_time(raw: &str, field: &str) -> SchedulingResult<NaiveTime> {
    let v = raw.trim();
    NaiveTime::parse_from_str(v, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M:%S"))
        .map_err(|_| SchedulingError::validation(format!("{field} must be HH:MM")))
}

/// Field present as `null` becomes `Some(None)`; absent fields stay `None`
/// through `#[serde(default)]`.
pub(crate) fn deserialize_double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

fn non_negative_cents(cents: Option<i64>, field: &str) -> SchedulingResult<Option<i64>> {
    match cents {
        Some(c) if c < 0 => Err(SchedulingError::validation(format!(
            "{field} must not be negative"
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(parse_date("2024-06-15", "date").unwrap(), d);
        assert_eq!(parse_date(" 2024-06-15T10:30:00Z ", "date").unwrap(), d);
        assert!(matches!(parse_date("15/06/2024", "date"), Err(SchedulingError::Validation(_))));
        assert!(matches!(parse_date("  ", "date"), Err(SchedulingError::Validation(_))));
    }

    #[test]
    fn times_accept_minutes_and_seconds() {
        assert_eq!(parse_time("14:30", "t").unwrap(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(parse_time("08:05:09", "t").unwrap(), NaiveTime::from_hms_opt(8, 5, 9).unwrap());
        assert!(parse_time("25:00", "t").is_err());
    }

    #[test]
    fn uuid_and_cents_checks() {
        assert!(parse_uuid("", "patient_id").is_err());
        assert!(parse_uuid("abc", "patient_id").is_err());
        assert!(parse_uuid(&Uuid::new_v4().to_string(), "patient_id").is_ok());
        assert!(non_negative_cents(Some(-1), "cost").is_err());
        assert_eq!(non_negative_cents(Some(0), "cost").unwrap(), Some(0));
    }
}
