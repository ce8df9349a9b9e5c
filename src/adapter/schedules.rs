use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::{
    deserialize_double_option, non_negative_cents, parse_date, parse_uuid, required, ClinicAdapter,
};
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{ControlSchedule, Cost, NotificationKind};
use crate::scheduling::recurrence::Frequency;
use crate::store::{NewSchedule, SchedulePatch, ScheduleQuery};
use crate::tenant::TenantContext;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFilter {
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateScheduleInput {
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub control_type: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub start_date: String,
    pub end_date: Option<String>,
    pub cost_cents: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateScheduleInput {
    pub control_type: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub end_date: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub cost_cents: Option<Option<i64>>,
}

fn check_range(start: NaiveDate, end: Option<NaiveDate>) -> SchedulingResult<()> {
    match end {
        Some(end) if end < start => Err(SchedulingError::validation(
            "end_date must not be before start_date",
        )),
        _ => Ok(()),
    }
}

fn optional_date(raw: Option<&str>) -> SchedulingResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(v) => parse_date(v, "end_date").map(Some),
        None => Ok(None),
    }
}

impl UpdateScheduleInput {
    /// Syntax checks only; the date range is checked against the stored row.
    fn to_patch(&self) -> SchedulingResult<SchedulePatch> {
        let control_type = match &self.control_type {
            Some(t) => Some(required(t, "control_type")?),
            None => None,
        };
        let frequency = match &self.frequency {
            Some(f) => Some(f.parse::<Frequency>()?.as_str().to_string()),
            None => None,
        };
        let start_date = match &self.start_date {
            Some(d) => Some(parse_date(d, "start_date")?),
            None => None,
        };
        let end_date = match &self.end_date {
            Some(d) => Some(optional_date(d.as_deref())?),
            None => None,
        };
        let cost_cents = match self.cost_cents {
            Some(c) => Some(non_negative_cents(c, "cost_cents")?),
            None => None,
        };
        Ok(SchedulePatch {
            control_type,
            frequency,
            start_date,
            end_date,
            is_active: self.is_active,
            cost_cents,
        })
    }
}

impl ClinicAdapter {
    pub async fn list_schedules(
        &self,
        tenant: &TenantContext,
        filter: &ScheduleFilter,
    ) -> SchedulingResult<Vec<ControlSchedule>> {
        let query = ScheduleQuery {
            patient_id: filter.patient_id,
            active_only: filter.active_only,
        };
        Ok(self.store.list_schedules(tenant.scope(), &query).await?)
    }

    pub async fn get_schedule(&self, tenant: &TenantContext, id: Uuid) -> SchedulingResult<ControlSchedule> {
        self.store
            .get_schedule(tenant.scope(), id)
            .await?
            .ok_or(SchedulingError::NotFound("schedule"))
    }

    pub async fn create_schedule(
        &self,
        tenant: &TenantContext,
        input: CreateScheduleInput,
    ) -> SchedulingResult<ControlSchedule> {
        let patient_id = parse_uuid(&input.patient_id, "patient_id")?;
        let control_type = required(&input.control_type, "control_type")?;
        let frequency: Frequency = required(&input.frequency, "frequency")?.parse()?;
        let start_date = parse_date(&input.start_date, "start_date")?;
        let end_date = optional_date(input.end_date.as_deref())?;
        check_range(start_date, end_date)?;
        let cost_cents = non_negative_cents(input.cost_cents, "cost_cents")?;
        let patient = self.visible_patient(tenant, patient_id).await?;

        let schedule = self
            .store
            .insert_schedule(NewSchedule {
                clinic_id: patient.clinic_id,
                patient_id,
                control_type,
                frequency: frequency.as_str().to_string(),
                start_date,
                end_date,
                is_active: input.is_active.unwrap_or(true),
                cost_cents,
            })
            .await?;

        tracing::info!(schedule_id = %schedule.id, frequency = %frequency, "schedule created");

        self.notify(
            schedule.clinic_id,
            NotificationKind::ScheduleCreated,
            format!(
                "{} {} schedule created starting {}",
                frequency, schedule.control_type, schedule.start_date
            ),
            Some(schedule.patient_id),
            None,
        )
        .await;

        Ok(schedule)
    }

    pub async fn update_schedule(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        input: UpdateScheduleInput,
    ) -> SchedulingResult<ControlSchedule> {
        let patch = input.to_patch()?;
        let scope = tenant.scope();

        if patch.start_date.is_some() || patch.end_date.is_some() {
            let current = self
                .store
                .get_schedule(scope, id)
                .await?
                .ok_or(SchedulingError::NotFound("schedule"))?;
            let start = patch.start_date.unwrap_or(current.start_date);
            let end = patch.end_date.unwrap_or(current.end_date);
            check_range(start, end)?;
        }

        let schedule = self
            .store
            .update_schedule(scope, id, &patch)
            .await?
            .ok_or(SchedulingError::NotFound("schedule"))?;

        tracing::info!(schedule_id = %schedule.id, "schedule updated");

        self.notify(
            schedule.clinic_id,
            NotificationKind::ScheduleUpdated,
            format!("{} schedule updated", schedule.control_type),
            Some(schedule.patient_id),
            None,
        )
        .await;

        Ok(schedule)
    }

    pub async fn list_costs(&self, tenant: &TenantContext) -> SchedulingResult<Vec<Cost>> {
        Ok(self.store.list_costs(tenant.scope()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_normalizes_frequency_and_clears_end() {
        let input: UpdateScheduleInput =
            serde_json::from_str(r#"{"frequency":"Weekly","end_date":null}"#).unwrap();
        let patch = input.to_patch().unwrap();
        assert_eq!(patch.frequency.as_deref(), Some("weekly"));
        assert_eq!(patch.end_date, Some(None));
        assert_eq!(patch.cost_cents, None);
    }

    #[test]
    fn patch_rejects_unknown_frequency() {
        let input = UpdateScheduleInput {
            frequency: Some("biweekly".into()),
            ..Default::default()
        };
        assert!(matches!(input.to_patch(), Err(SchedulingError::Validation(_))));
    }

    #[test]
    fn range_check() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert!(check_range(a, Some(b)).is_err());
        assert!(check_range(a, Some(a)).is_ok());
        assert!(check_range(a, None).is_ok());
    }
}
