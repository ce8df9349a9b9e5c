//! Row-level access to the relational store.
//!
//! [`ClinicStore`] is the query/mutation surface the adapter talks to. It
//! knows nothing about validation or side effects: every method is one
//! select, insert, update or delete, filtered by the [`Scope`] it is given.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Control, ControlSchedule, Cost, Notification, NotificationKind, Patient, Profile,
};
use crate::tenant::Scope;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error object returned by the store. The message is surfaced verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::new(format!("db error: {e}"))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An unexpired, unrevoked session joined with its profile.
#[derive(Debug, Clone)]
pub struct SessionPrincipal {
    pub session_token_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
}

/* -------------------------
   Query filters
--------------------------*/

/// Control selection. Range bounds are half-open: `from <= t < to`.
#[derive(Debug, Clone, Default)]
pub struct ControlQuery {
    pub patient_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleQuery {
    pub patient_id: Option<Uuid>,
    pub active_only: bool,
}

#[derive(Debug, Clone)]
pub struct PatientQuery {
    pub search: Option<String>,
    pub limit: i64,
}

impl Default for PatientQuery {
    fn default() -> Self {
        Self {
            search: None,
            limit: 50,
        }
    }
}

/* -------------------------
   Inserts and patches
--------------------------*/

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub clinic_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub medical_history: Option<String>,
}

/// Outer `None` keeps the column; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub medical_history: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewControl {
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub control_type: String,
    pub scheduled_date: DateTime<Utc>,
    pub status: String,
    pub cost_cents: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCost {
    pub clinic_id: Uuid,
    pub control_id: Option<Uuid>,
    pub amount_cents: i64,
    pub cost_type: String,
    pub description: Option<String>,
    pub cost_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub control_type: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub cost_cents: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct SchedulePatch {
    pub control_type: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
    pub cost_cents: Option<Option<i64>>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub clinic_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub control_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub message: String,
}

#[async_trait]
pub trait ClinicStore: Send + Sync {
    // sessions & profiles
    async fn find_session(&self, token_hash: &str) -> StoreResult<Option<SessionPrincipal>>;
    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>>;
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>>;
    async fn count_profiles(&self) -> StoreResult<i64>;
    async fn update_profile_clinic_name(&self, id: Uuid, clinic_name: &str) -> StoreResult<Option<Profile>>;
    async fn update_profile_role(&self, id: Uuid, role: &str) -> StoreResult<Option<Profile>>;

    // patients
    async fn list_patients(&self, scope: Scope, query: &PatientQuery) -> StoreResult<Vec<Patient>>;
    async fn get_patient(&self, scope: Scope, id: Uuid) -> StoreResult<Option<Patient>>;
    async fn list_patients_by_ids(&self, scope: Scope, ids: &[Uuid]) -> StoreResult<Vec<Patient>>;
    async fn count_patients(&self, scope: Scope) -> StoreResult<i64>;
    async fn insert_patient(&self, new: NewPatient) -> StoreResult<Patient>;
    async fn update_patient(&self, scope: Scope, id: Uuid, patch: &PatientPatch) -> StoreResult<Option<Patient>>;

    // controls (always returned with the patient join applied; a patient
    // from another clinic never joins)
    async fn list_controls(&self, scope: Scope, query: &ControlQuery) -> StoreResult<Vec<Control>>;
    async fn get_control(&self, scope: Scope, id: Uuid) -> StoreResult<Option<Control>>;
    async fn count_controls(&self, scope: Scope) -> StoreResult<i64>;
    async fn insert_control(&self, new: NewControl) -> StoreResult<Control>;
    async fn update_control_status(
        &self,
        scope: Scope,
        id: Uuid,
        status: &str,
        cost_cents: Option<Option<i64>>,
    ) -> StoreResult<Option<Control>>;
    async fn update_control_date(
        &self,
        scope: Scope,
        id: Uuid,
        scheduled_date: DateTime<Utc>,
    ) -> StoreResult<Option<Control>>;

    // cost ledger
    async fn list_costs(&self, scope: Scope) -> StoreResult<Vec<Cost>>;
    async fn insert_cost(&self, new: NewCost) -> StoreResult<Cost>;
    /// Upsert keyed on `control_id`.
    async fn upsert_control_cost(&self, new: NewCost) -> StoreResult<Cost>;
    async fn delete_control_cost(&self, scope: Scope, control_id: Uuid) -> StoreResult<bool>;

    // recurrence rules
    async fn list_schedules(&self, scope: Scope, query: &ScheduleQuery) -> StoreResult<Vec<ControlSchedule>>;
    async fn get_schedule(&self, scope: Scope, id: Uuid) -> StoreResult<Option<ControlSchedule>>;
    async fn insert_schedule(&self, new: NewSchedule) -> StoreResult<ControlSchedule>;
    async fn update_schedule(
        &self,
        scope: Scope,
        id: Uuid,
        patch: &SchedulePatch,
    ) -> StoreResult<Option<ControlSchedule>>;

    // notifications
    async fn list_notifications(&self, scope: Scope, limit: i64) -> StoreResult<Vec<Notification>>;
    async fn count_unread_notifications(&self, scope: Scope) -> StoreResult<i64>;
    async fn insert_notification(&self, new: NewNotification) -> StoreResult<Notification>;
    async fn mark_notification_read(&self, scope: Scope, id: Uuid) -> StoreResult<bool>;
    async fn mark_all_notifications_read(&self, scope: Scope) -> StoreResult<u64>;
    async fn delete_notification(&self, scope: Scope, id: Uuid) -> StoreResult<bool>;
}
