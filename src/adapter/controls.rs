use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::{
    non_negative_cents, optional_text, parse_date, parse_time, parse_uuid, required,
    ClinicAdapter, DEFAULT_CONTROL_TIME,
};
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{Control, NotificationKind};
use crate::scheduling::revenue::CONTROL_COST_TYPE;
use crate::scheduling::status::ControlStatus;
use crate::store::{ControlQuery, NewControl, NewCost};
use crate::tenant::TenantContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCategory {
    /// `[midnight(now), midnight(now) + 1 day)`
    Today,
    /// `scheduled_date >= now`
    Upcoming,
    #[default]
    All,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// `None` or `"all"` disables the filter.
    pub status: Option<String>,
    pub category: ControlCategory,
}

impl AppointmentFilter {
    /// Resolve the category against `now` and intersect it with the explicit
    /// range.
    fn to_query(&self, now: DateTime<Utc>) -> ControlQuery {
        let (mut from, mut to) = (self.from, self.to);
        match self.category {
            ControlCategory::Today => {
                let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();
                let next = midnight + Duration::days(1);
                from = Some(from.map_or(midnight, |f| f.max(midnight)));
                to = Some(to.map_or(next, |t| t.min(next)));
            }
            ControlCategory::Upcoming => {
                from = Some(from.map_or(now, |f| f.max(now)));
            }
            ControlCategory::All => {}
        }
        ControlQuery {
            patient_id: self.patient_id,
            from,
            to,
            status: self
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty() && *s != "all")
                .map(str::to_string),
        }
    }
}

/// Raw form data for a new control.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateControlInput {
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub control_type: String,
    /// `YYYY-MM-DD` or an RFC 3339 instant.
    #[serde(default)]
    pub scheduled_date: String,
    /// `HH:MM`; ignored when `scheduled_date` already carries a time.
    pub scheduled_time: Option<String>,
    pub cost_cents: Option<i64>,
    pub notes: Option<String>,
}

struct ValidControl {
    patient_id: Uuid,
    control_type: String,
    scheduled_date: DateTime<Utc>,
    cost_cents: Option<i64>,
    notes: Option<String>,
}

impl CreateControlInput {
    fn validate(self) -> SchedulingResult<ValidControl> {
        let patient_id = parse_uuid(&self.patient_id, "patient_id")?;
        let control_type = required(&self.control_type, "control_type")?;
        let scheduled_date = match DateTime::parse_from_rfc3339(self.scheduled_date.trim()) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                let date = parse_date(&self.scheduled_date, "scheduled_date")?;
                let time = match self.scheduled_time.as_deref().map(str::trim) {
                    Some(t) if !t.is_empty() => parse_time(t, "scheduled_time")?,
                    _ => DEFAULT_CONTROL_TIME,
                };
                date.and_time(time).and_utc()
            }
        };
        let cost_cents = non_negative_cents(self.cost_cents, "cost_cents")?;
        Ok(ValidControl {
            patient_id,
            control_type,
            scheduled_date,
            cost_cents,
            notes: optional_text(self.notes),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: ControlStatus,
    pub cost_cents: Option<i64>,
}

/// Ledger row for `control`, filed under the clinic that owns it.
fn linked_cost(control: &Control, amount_cents: i64) -> NewCost {
    NewCost {
        clinic_id: control.clinic_id,
        control_id: Some(control.id),
        amount_cents,
        cost_type: CONTROL_COST_TYPE.to_string(),
        description: Some(format!("Control fee for {}", control.control_type)),
        cost_date: control.scheduled_date.date_naive(),
    }
}

fn consistency_gap(control_id: Uuid, message: String) -> SchedulingError {
    tracing::error!(%control_id, error = %message, "control saved but linked cost write failed");
    SchedulingError::ConsistencyGap { control_id, message }
}

impl ClinicAdapter {
    pub async fn list_appointments(
        &self,
        tenant: &TenantContext,
        filter: &AppointmentFilter,
        now: DateTime<Utc>,
    ) -> SchedulingResult<Vec<Control>> {
        let query = filter.to_query(now);
        let rows = self.store.list_controls(tenant.scope(), &query).await?;
        Ok(rows)
    }

    pub async fn get_appointment(&self, tenant: &TenantContext, id: Uuid) -> SchedulingResult<Control> {
        self.store
            .get_control(tenant.scope(), id)
            .await?
            .ok_or(SchedulingError::NotFound("control"))
    }

    /// Insert a control in `scheduled` state and, when it carries a cost, its
    /// ledger row.
    pub async fn create_appointment(
        &self,
        tenant: &TenantContext,
        input: CreateControlInput,
    ) -> SchedulingResult<Control> {
        let valid = input.validate()?;
        let patient = self.visible_patient(tenant, valid.patient_id).await?;

        let control = self
            .store
            .insert_control(NewControl {
                clinic_id: patient.clinic_id,
                patient_id: valid.patient_id,
                control_type: valid.control_type,
                scheduled_date: valid.scheduled_date,
                status: ControlStatus::Scheduled.as_str().to_string(),
                cost_cents: valid.cost_cents,
                notes: valid.notes,
            })
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "control insert failed");
                SchedulingError::from(e)
            })?;

        if let Some(amount) = control.cost_cents.filter(|c| *c > 0) {
            if let Err(e) = self.store.insert_cost(linked_cost(&control, amount)).await {
                return Err(consistency_gap(control.id, e.message));
            }
        }

        tracing::info!(control_id = %control.id, clinic_id = %control.clinic_id, "control created");

        self.notify(
            control.clinic_id,
            NotificationKind::ControlReminder,
            format!(
                "{} scheduled for {} on {}",
                control.control_type,
                control.patient_display(),
                control.scheduled_date.format("%Y-%m-%d %H:%M")
            ),
            Some(control.patient_id),
            Some(control.id),
        )
        .await;

        Ok(control)
    }

    /// Set the status unconditionally. A supplied cost is written to the
    /// control and mirrored to its ledger row (`0` removes the row).
    pub async fn update_appointment_status(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        update: StatusUpdate,
    ) -> SchedulingResult<Control> {
        let cost = non_negative_cents(update.cost_cents, "cost_cents")?;
        let scope = tenant.scope();

        let control = self
            .store
            .update_control_status(scope, id, update.status.as_str(), cost.map(|c| (c > 0).then_some(c)))
            .await?
            .ok_or(SchedulingError::NotFound("control"))?;

        match cost {
            Some(amount) if amount > 0 => {
                if let Err(e) = self.store.upsert_control_cost(linked_cost(&control, amount)).await {
                    return Err(consistency_gap(control.id, e.message));
                }
            }
            Some(_) => {
                if let Err(e) = self.store.delete_control_cost(scope, control.id).await {
                    return Err(consistency_gap(control.id, e.message));
                }
            }
            None => {}
        }

        tracing::info!(control_id = %control.id, status = %update.status, "control status updated");

        if update.status == ControlStatus::Completed {
            self.notify(
                control.clinic_id,
                NotificationKind::ControlCompleted,
                format!("{} completed for {}", control.control_type, control.patient_display()),
                Some(control.patient_id),
                Some(control.id),
            )
            .await;
        }

        Ok(control)
    }

    /// Move a control to a new start instant.
    pub async fn reschedule_appointment(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        start: DateTime<Utc>,
    ) -> SchedulingResult<Control> {
        let control = self
            .store
            .update_control_date(tenant.scope(), id, start)
            .await
            .map_err(|e| {
                tracing::warn!(control_id = %id, error = %e, "reschedule failed");
                SchedulingError::from(e)
            })?
            .ok_or(SchedulingError::NotFound("control"))?;
        tracing::info!(control_id = %id, start = %start, "control rescheduled");
        Ok(control)
    }
}
