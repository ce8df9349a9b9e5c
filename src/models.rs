use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::adapter::ClinicAdapter;
use crate::scheduling::calendar::CalendarSettings;
use crate::scheduling::status::ControlStatus;
use crate::store::ClinicStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClinicStore>,
    pub calendar: CalendarSettings,
    pub calendar_max_window_days: i64,
}

impl AppState {
    pub fn adapter(&self) -> ClinicAdapter {
        ClinicAdapter::new(self.store.clone())
    }
}

/* -------------------------
   API envelope
--------------------------*/

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct OkData {
    pub ok: bool,
}

/* -------------------------
   Store rows
--------------------------*/

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub clinic_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Name fields pulled in by the patient join of a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientBrief {
    pub first_name: String,
    pub last_name: String,
}

impl PatientBrief {
    pub const PLACEHOLDER: &'static str = "Unknown patient";

    pub fn display(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Display name for an optional join; missing patients get a placeholder.
    pub fn display_or_placeholder(brief: Option<&PatientBrief>) -> String {
        brief
            .map(PatientBrief::display)
            .unwrap_or_else(|| Self::PLACEHOLDER.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub control_type: String,
    pub scheduled_date: DateTime<Utc>,
    /// Free text in the store; see [`ControlStatus::parse`].
    pub status: String,
    pub cost_cents: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `None` when the referenced patient no longer exists.
    pub patient: Option<PatientBrief>,
}

impl Control {
    pub fn known_status(&self) -> Option<ControlStatus> {
        ControlStatus::parse(&self.status)
    }

    pub fn patient_display(&self) -> String {
        PatientBrief::display_or_placeholder(self.patient.as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ControlSchedule {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub control_type: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub cost_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cost {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub control_id: Option<Uuid>,
    pub amount_cents: i64,
    pub cost_type: String,
    pub description: Option<String>,
    pub cost_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub control_id: Option<Uuid>,
    pub notification_type: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Events that produce a notification row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ControlReminder,
    ControlCompleted,
    ScheduleCreated,
    ScheduleUpdated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ControlReminder => "control_reminder",
            NotificationKind::ControlCompleted => "control_completed",
            NotificationKind::ScheduleCreated => "schedule_created",
            NotificationKind::ScheduleUpdated => "schedule_updated",
        }
    }
}
