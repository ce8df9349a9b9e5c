use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::controls::{AppointmentFilter, ControlCategory};
use super::{parse_date, ClinicAdapter};
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{Control, PatientBrief};
use crate::scheduling::calendar::{build_calendar, CalendarEvent, CalendarSettings};
use crate::scheduling::export::controls_csv;
use crate::scheduling::recurrence::{count_occurrences, DateWindow};
use crate::scheduling::revenue::{monthly_revenue, summarize, RevenueReport};
use crate::store::{ControlQuery, ScheduleQuery};
use crate::tenant::TenantContext;

/// Days ahead counted as "upcoming" for schedule occurrences on the dashboard.
const UPCOMING_DAYS: u64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub status: Option<String>,
}

impl CalendarQuery {
    /// Parse into a window of at most `max_days` days.
    pub fn window(&self, max_days: i64) -> SchedulingResult<DateWindow> {
        let from = parse_date(&self.from, "from")?;
        let to = parse_date(&self.to, "to")?;
        if to <= from {
            return Err(SchedulingError::validation("to must be after from"));
        }
        if (to - from).num_days() > max_days {
            return Err(SchedulingError::validation(format!(
                "calendar window must not exceed {max_days} days"
            )));
        }
        Ok(DateWindow::new(from, to))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_patients: i64,
    pub upcoming_controls: usize,
    pub upcoming_scheduled_occurrences: usize,
    pub today_controls: usize,
    pub this_month_revenue: i64,
    pub today: Vec<Control>,
}

impl ClinicAdapter {
    /// Real controls and virtual schedule occurrences inside `window`.
    pub async fn calendar_events(
        &self,
        tenant: &TenantContext,
        window: DateWindow,
        status: Option<&str>,
        settings: &CalendarSettings,
    ) -> SchedulingResult<Vec<CalendarEvent>> {
        let scope = tenant.scope();
        let query = ControlQuery {
            from: Some(window.from.and_time(NaiveTime::MIN).and_utc()),
            to: Some(window.to.and_time(NaiveTime::MIN).and_utc()),
            ..Default::default()
        };
        let controls = self.store.list_controls(scope, &query).await?;
        let schedules = self
            .store
            .list_schedules(
                scope,
                &ScheduleQuery {
                    patient_id: None,
                    active_only: true,
                },
            )
            .await?;

        let mut ids: Vec<Uuid> = schedules.iter().map(|s| s.patient_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let patients: HashMap<Uuid, PatientBrief> = self
            .store
            .list_patients_by_ids(scope, &ids)
            .await?
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    PatientBrief {
                        first_name: p.first_name,
                        last_name: p.last_name,
                    },
                )
            })
            .collect();

        build_calendar(&controls, &schedules, &patients, window, settings, status)
    }

    pub async fn revenue_report(&self, tenant: &TenantContext, month: u32, year: i32) -> SchedulingResult<RevenueReport> {
        if !(1..=12).contains(&month) {
            return Err(SchedulingError::validation("month must be between 1 and 12"));
        }
        let scope = tenant.scope();
        let costs = self.store.list_costs(scope).await?;
        let controls = self.store.list_controls(scope, &ControlQuery::default()).await?;
        Ok(summarize(&costs, &controls, month, year))
    }

    pub async fn export_controls_csv(&self, tenant: &TenantContext) -> SchedulingResult<String> {
        let controls = self
            .store
            .list_controls(tenant.scope(), &ControlQuery::default())
            .await?;
        Ok(controls_csv(&controls))
    }

    pub async fn dashboard(&self, tenant: &TenantContext, now: DateTime<Utc>) -> SchedulingResult<DashboardStats> {
        let total_patients = self.store.count_patients(tenant.scope()).await?;
        let upcoming = self
            .list_appointments(
                tenant,
                &AppointmentFilter {
                    category: ControlCategory::Upcoming,
                    ..Default::default()
                },
                now,
            )
            .await?;
        let today = self
            .list_appointments(
                tenant,
                &AppointmentFilter {
                    category: ControlCategory::Today,
                    ..Default::default()
                },
                now,
            )
            .await?;

        let schedules = self
            .store
            .list_schedules(
                tenant.scope(),
                &ScheduleQuery {
                    patient_id: None,
                    active_only: true,
                },
            )
            .await?;
        let start = now.date_naive();
        let window = DateWindow::new(
            start,
            start.checked_add_days(Days::new(UPCOMING_DAYS)).unwrap_or(start),
        );
        let upcoming_scheduled_occurrences = count_occurrences(&schedules, window)?;

        let costs = self.store.list_costs(tenant.scope()).await?;

        Ok(DashboardStats {
            total_patients,
            upcoming_controls: upcoming.len(),
            upcoming_scheduled_occurrences,
            today_controls: today.len(),
            this_month_revenue: monthly_revenue(&costs, now.month(), now.year()),
            today,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_window_bounds() {
        let q = CalendarQuery {
            from: "2024-06-01".into(),
            to: "2024-07-01".into(),
            status: None,
        };
        assert_eq!(q.window(366).unwrap().to, chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert!(q.window(10).is_err());

        let backwards = CalendarQuery {
            from: "2024-07-01".into(),
            to: "2024-06-01".into(),
            status: None,
        };
        assert!(matches!(backwards.window(366), Err(SchedulingError::Validation(_))));
    }
}
