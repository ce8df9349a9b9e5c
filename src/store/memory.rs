//! In-process store used for local development and by the test suite.
//!
//! Every trait call is counted per operation name, and individual operations
//! can be told to fail with a given message to exercise error paths.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    ClinicStore, ControlQuery, NewControl, NewCost, NewNotification, NewPatient, NewSchedule,
    PatientPatch, PatientQuery, SchedulePatch, ScheduleQuery, SessionPrincipal, StoreError,
    StoreResult,
};
use crate::models::{
    Control, ControlSchedule, Cost, Notification, Patient, PatientBrief, Profile,
};
use crate::tenant::{Role, Scope};

#[derive(Default)]
struct Tables {
    sessions: HashMap<String, SessionPrincipal>,
    profiles: Vec<Profile>,
    patients: Vec<Patient>,
    controls: Vec<Control>,
    costs: Vec<Cost>,
    schedules: Vec<ControlSchedule>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
struct CallLog {
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    log: Mutex<CallLog>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of trait calls made so far.
    pub fn calls(&self) -> usize {
        lock(&self.log).calls.values().sum()
    }

    pub fn calls_to(&self, op: &str) -> usize {
        lock(&self.log).calls.get(op).copied().unwrap_or(0)
    }

    /// Make every later call to `op` fail with `message`.
    pub fn fail_on(&self, op: &'static str, message: impl Into<String>) {
        lock(&self.log).failures.insert(op, message.into());
    }

    pub fn clear_failures(&self) {
        lock(&self.log).failures.clear();
    }

    /// Register a profile and a live session for it.
    pub fn seed_session(&self, token_hash: &str, user_id: Uuid, role: Role, email: &str) {
        let now = Utc::now();
        let mut t = lock(&self.tables);
        if !t.profiles.iter().any(|p| p.id == user_id) {
            t.profiles.push(Profile {
                id: user_id,
                email: email.to_string(),
                role: role.as_str().to_string(),
                clinic_name: None,
                created_at: now,
                updated_at: now,
            });
        }
        t.sessions.insert(
            token_hash.to_string(),
            SessionPrincipal {
                session_token_id: Uuid::new_v4(),
                user_id,
                role: role.as_str().to_string(),
            },
        );
    }

    /// Drop a patient row directly, leaving its controls dangling.
    pub fn remove_patient(&self, id: Uuid) {
        lock(&self.tables).patients.retain(|p| p.id != id);
    }

    /// Snapshot of the ledger regardless of tenant.
    pub fn all_costs(&self) -> Vec<Cost> {
        lock(&self.tables).costs.clone()
    }

    fn enter(&self, op: &'static str) -> StoreResult<()> {
        let mut log = lock(&self.log);
        *log.calls.entry(op).or_insert(0) += 1;
        match log.failures.get(op) {
            Some(message) => Err(StoreError::new(message.clone())),
            None => Ok(()),
        }
    }
}

fn brief_for(patients: &[Patient], clinic_id: Uuid, patient_id: Uuid) -> Option<PatientBrief> {
    patients
        .iter()
        .find(|p| p.id == patient_id && p.clinic_id == clinic_id)
        .map(|p| PatientBrief {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
        })
}

fn with_patient(mut control: Control, patients: &[Patient]) -> Control {
    control.patient = brief_for(patients, control.clinic_id, control.patient_id);
    control
}

fn control_matches(c: &Control, query: &ControlQuery) -> bool {
    query.patient_id.is_none_or(|id| c.patient_id == id)
        && query.from.is_none_or(|from| c.scheduled_date >= from)
        && query.to.is_none_or(|to| c.scheduled_date < to)
        && query.status.as_deref().is_none_or(|s| c.status == s)
}

fn patient_matches(p: &Patient, search: Option<&str>) -> bool {
    let Some(needle) = search.map(str::to_lowercase).filter(|s| !s.is_empty()) else {
        return true;
    };
    p.first_name.to_lowercase().contains(&needle)
        || p.last_name.to_lowercase().contains(&needle)
        || p.email
            .as_deref()
            .is_some_and(|e| e.to_lowercase().contains(&needle))
}

#[async_trait]
impl ClinicStore for MemoryStore {
    async fn find_session(&self, token_hash: &str) -> StoreResult<Option<SessionPrincipal>> {
        self.enter("find_session")?;
        Ok(lock(&self.tables).sessions.get(token_hash).cloned())
    }

    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        self.enter("get_profile")?;
        Ok(lock(&self.tables).profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        self.enter("list_profiles")?;
        let mut rows = lock(&self.tables).profiles.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_profiles(&self) -> StoreResult<i64> {
        self.enter("count_profiles")?;
        Ok(lock(&self.tables).profiles.len() as i64)
    }

    async fn update_profile_clinic_name(&self, id: Uuid, clinic_name: &str) -> StoreResult<Option<Profile>> {
        self.enter("update_profile_clinic_name")?;
        let mut t = lock(&self.tables);
        Ok(t.profiles.iter_mut().find(|p| p.id == id).map(|p| {
            p.clinic_name = Some(clinic_name.to_string());
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn update_profile_role(&self, id: Uuid, role: &str) -> StoreResult<Option<Profile>> {
        self.enter("update_profile_role")?;
        let mut t = lock(&self.tables);
        Ok(t.profiles.iter_mut().find(|p| p.id == id).map(|p| {
            p.role = role.to_string();
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn list_patients(&self, scope: Scope, query: &PatientQuery) -> StoreResult<Vec<Patient>> {
        self.enter("list_patients")?;
        let t = lock(&self.tables);
        let mut rows: Vec<Patient> = t
            .patients
            .iter()
            .filter(|p| scope.allows(p.clinic_id) && patient_matches(p, query.search.as_deref()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(query.limit.max(0) as usize);
        Ok(rows)
    }

    async fn get_patient(&self, scope: Scope, id: Uuid) -> StoreResult<Option<Patient>> {
        self.enter("get_patient")?;
        Ok(lock(&self.tables)
            .patients
            .iter()
            .find(|p| p.id == id && scope.allows(p.clinic_id))
            .cloned())
    }

    async fn list_patients_by_ids(&self, scope: Scope, ids: &[Uuid]) -> StoreResult<Vec<Patient>> {
        self.enter("list_patients_by_ids")?;
        Ok(lock(&self.tables)
            .patients
            .iter()
            .filter(|p| ids.contains(&p.id) && scope.allows(p.clinic_id))
            .cloned()
            .collect())
    }

    async fn count_patients(&self, scope: Scope) -> StoreResult<i64> {
        self.enter("count_patients")?;
        Ok(lock(&self.tables)
            .patients
            .iter()
            .filter(|p| scope.allows(p.clinic_id))
            .count() as i64)
    }

    async fn insert_patient(&self, new: NewPatient) -> StoreResult<Patient> {
        self.enter("insert_patient")?;
        let now = Utc::now();
        let row = Patient {
            id: Uuid::new_v4(),
            clinic_id: new.clinic_id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            date_of_birth: new.date_of_birth,
            medical_history: new.medical_history,
            created_at: now,
            updated_at: now,
        };
        lock(&self.tables).patients.push(row.clone());
        Ok(row)
    }

    async fn update_patient(&self, scope: Scope, id: Uuid, patch: &PatientPatch) -> StoreResult<Option<Patient>> {
        self.enter("update_patient")?;
        let mut t = lock(&self.tables);
        let Some(p) = t
            .patients
            .iter_mut()
            .find(|p| p.id == id && scope.allows(p.clinic_id))
        else {
            return Ok(None);
        };
        if let Some(v) = &patch.first_name {
            p.first_name = v.clone();
        }
        if let Some(v) = &patch.last_name {
            p.last_name = v.clone();
        }
        if let Some(v) = &patch.email {
            p.email = v.clone();
        }
        if let Some(v) = &patch.phone {
            p.phone = v.clone();
        }
        if let Some(v) = patch.date_of_birth {
            p.date_of_birth = v;
        }
        if let Some(v) = &patch.medical_history {
            p.medical_history = v.clone();
        }
        p.updated_at = Utc::now();
        Ok(Some(p.clone()))
    }

    async fn list_controls(&self, scope: Scope, query: &ControlQuery) -> StoreResult<Vec<Control>> {
        self.enter("list_controls")?;
        let t = lock(&self.tables);
        let mut rows: Vec<Control> = t
            .controls
            .iter()
            .filter(|c| scope.allows(c.clinic_id) && control_matches(c, query))
            .map(|c| with_patient(c.clone(), &t.patients))
            .collect();
        rows.sort_by(|a, b| a.scheduled_date.cmp(&b.scheduled_date));
        Ok(rows)
    }

    async fn get_control(&self, scope: Scope, id: Uuid) -> StoreResult<Option<Control>> {
        self.enter("get_control")?;
        let t = lock(&self.tables);
        Ok(t.controls
            .iter()
            .find(|c| c.id == id && scope.allows(c.clinic_id))
            .map(|c| with_patient(c.clone(), &t.patients)))
    }

    async fn count_controls(&self, scope: Scope) -> StoreResult<i64> {
        self.enter("count_controls")?;
        Ok(lock(&self.tables)
            .controls
            .iter()
            .filter(|c| scope.allows(c.clinic_id))
            .count() as i64)
    }

    async fn insert_control(&self, new: NewControl) -> StoreResult<Control> {
        self.enter("insert_control")?;
        let now = Utc::now();
        let row = Control {
            id: Uuid::new_v4(),
            clinic_id: new.clinic_id,
            patient_id: new.patient_id,
            control_type: new.control_type,
            scheduled_date: new.scheduled_date,
            status: new.status,
            cost_cents: new.cost_cents,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            patient: None,
        };
        let mut t = lock(&self.tables);
        t.controls.push(row.clone());
        Ok(with_patient(row, &t.patients))
    }

    async fn update_control_status(
        &self,
        scope: Scope,
        id: Uuid,
        status: &str,
        cost_cents: Option<Option<i64>>,
    ) -> StoreResult<Option<Control>> {
        self.enter("update_control_status")?;
        let mut t = lock(&self.tables);
        let Some(c) = t
            .controls
            .iter_mut()
            .find(|c| c.id == id && scope.allows(c.clinic_id))
        else {
            return Ok(None);
        };
        c.status = status.to_string();
        if let Some(cost) = cost_cents {
            c.cost_cents = cost;
        }
        c.updated_at = Utc::now();
        let row = c.clone();
        Ok(Some(with_patient(row, &t.patients)))
    }

    async fn update_control_date(
        &self,
        scope: Scope,
        id: Uuid,
        scheduled_date: DateTime<Utc>,
    ) -> StoreResult<Option<Control>> {
        self.enter("update_control_date")?;
        let mut t = lock(&self.tables);
        let Some(c) = t
            .controls
            .iter_mut()
            .find(|c| c.id == id && scope.allows(c.clinic_id))
        else {
            return Ok(None);
        };
        c.scheduled_date = scheduled_date;
        c.updated_at = Utc::now();
        let row = c.clone();
        Ok(Some(with_patient(row, &t.patients)))
    }

    async fn list_costs(&self, scope: Scope) -> StoreResult<Vec<Cost>> {
        self.enter("list_costs")?;
        let mut rows: Vec<Cost> = lock(&self.tables)
            .costs
            .iter()
            .filter(|c| scope.allows(c.clinic_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.cost_date.cmp(&b.cost_date));
        Ok(rows)
    }

    async fn insert_cost(&self, new: NewCost) -> StoreResult<Cost> {
        self.enter("insert_cost")?;
        let row = Cost {
            id: Uuid::new_v4(),
            clinic_id: new.clinic_id,
            control_id: new.control_id,
            amount_cents: new.amount_cents,
            cost_type: new.cost_type,
            description: new.description,
            cost_date: new.cost_date,
            created_at: Utc::now(),
        };
        lock(&self.tables).costs.push(row.clone());
        Ok(row)
    }

    async fn upsert_control_cost(&self, new: NewCost) -> StoreResult<Cost> {
        self.enter("upsert_control_cost")?;
        let mut t = lock(&self.tables);
        if let Some(existing) = t
            .costs
            .iter_mut()
            .find(|c| c.control_id.is_some() && c.control_id == new.control_id)
        {
            existing.amount_cents = new.amount_cents;
            existing.cost_type = new.cost_type;
            existing.description = new.description;
            existing.cost_date = new.cost_date;
            return Ok(existing.clone());
        }
        let row = Cost {
            id: Uuid::new_v4(),
            clinic_id: new.clinic_id,
            control_id: new.control_id,
            amount_cents: new.amount_cents,
            cost_type: new.cost_type,
            description: new.description,
            cost_date: new.cost_date,
            created_at: Utc::now(),
        };
        t.costs.push(row.clone());
        Ok(row)
    }

    async fn delete_control_cost(&self, scope: Scope, control_id: Uuid) -> StoreResult<bool> {
        self.enter("delete_control_cost")?;
        let mut t = lock(&self.tables);
        let before = t.costs.len();
        t.costs
            .retain(|c| !(c.control_id == Some(control_id) && scope.allows(c.clinic_id)));
        Ok(t.costs.len() != before)
    }

    async fn list_schedules(&self, scope: Scope, query: &ScheduleQuery) -> StoreResult<Vec<ControlSchedule>> {
        self.enter("list_schedules")?;
        let mut rows: Vec<ControlSchedule> = lock(&self.tables)
            .schedules
            .iter()
            .filter(|s| {
                scope.allows(s.clinic_id)
                    && query.patient_id.is_none_or(|id| s.patient_id == id)
                    && (!query.active_only || s.is_active)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(rows)
    }

    async fn get_schedule(&self, scope: Scope, id: Uuid) -> StoreResult<Option<ControlSchedule>> {
        self.enter("get_schedule")?;
        Ok(lock(&self.tables)
            .schedules
            .iter()
            .find(|s| s.id == id && scope.allows(s.clinic_id))
            .cloned())
    }

    async fn insert_schedule(&self, new: NewSchedule) -> StoreResult<ControlSchedule> {
        self.enter("insert_schedule")?;
        let now = Utc::now();
        let row = ControlSchedule {
            id: Uuid::new_v4(),
            clinic_id: new.clinic_id,
            patient_id: new.patient_id,
            control_type: new.control_type,
            frequency: new.frequency,
            start_date: new.start_date,
            end_date: new.end_date,
            is_active: new.is_active,
            cost_cents: new.cost_cents,
            created_at: now,
            updated_at: now,
        };
        lock(&self.tables).schedules.push(row.clone());
        Ok(row)
    }

    async fn update_schedule(
        &self,
        scope: Scope,
        id: Uuid,
        patch: &SchedulePatch,
    ) -> StoreResult<Option<ControlSchedule>> {
        self.enter("update_schedule")?;
        let mut t = lock(&self.tables);
        let Some(s) = t
            .schedules
            .iter_mut()
            .find(|s| s.id == id && scope.allows(s.clinic_id))
        else {
            return Ok(None);
        };
        if let Some(v) = &patch.control_type {
            s.control_type = v.clone();
        }
        if let Some(v) = &patch.frequency {
            s.frequency = v.clone();
        }
        if let Some(v) = patch.start_date {
            s.start_date = v;
        }
        if let Some(v) = patch.end_date {
            s.end_date = v;
        }
        if let Some(v) = patch.is_active {
            s.is_active = v;
        }
        if let Some(v) = patch.cost_cents {
            s.cost_cents = v;
        }
        s.updated_at = Utc::now();
        Ok(Some(s.clone()))
    }

    async fn list_notifications(&self, scope: Scope, limit: i64) -> StoreResult<Vec<Notification>> {
        self.enter("list_notifications")?;
        let mut rows: Vec<Notification> = lock(&self.tables)
            .notifications
            .iter()
            .filter(|n| scope.allows(n.clinic_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn count_unread_notifications(&self, scope: Scope) -> StoreResult<i64> {
        self.enter("count_unread_notifications")?;
        Ok(lock(&self.tables)
            .notifications
            .iter()
            .filter(|n| scope.allows(n.clinic_id) && !n.is_read)
            .count() as i64)
    }

    async fn insert_notification(&self, new: NewNotification) -> StoreResult<Notification> {
        self.enter("insert_notification")?;
        let row = Notification {
            id: Uuid::new_v4(),
            clinic_id: new.clinic_id,
            patient_id: new.patient_id,
            control_id: new.control_id,
            notification_type: new.kind.as_str().to_string(),
            message: new.message,
            is_read: false,
            created_at: Utc::now(),
        };
        lock(&self.tables).notifications.push(row.clone());
        Ok(row)
    }

    async fn mark_notification_read(&self, scope: Scope, id: Uuid) -> StoreResult<bool> {
        self.enter("mark_notification_read")?;
        let mut t = lock(&self.tables);
        match t
            .notifications
            .iter_mut()
            .find(|n| n.id == id && scope.allows(n.clinic_id))
        {
            Some(n) => {
                n.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, scope: Scope) -> StoreResult<u64> {
        self.enter("mark_all_notifications_read")?;
        let mut t = lock(&self.tables);
        let mut touched = 0;
        for n in t
            .notifications
            .iter_mut()
            .filter(|n| scope.allows(n.clinic_id) && !n.is_read)
        {
            n.is_read = true;
            touched += 1;
        }
        Ok(touched)
    }

    async fn delete_notification(&self, scope: Scope, id: Uuid) -> StoreResult<bool> {
        self.enter("delete_notification")?;
        let mut t = lock(&self.tables);
        let before = t.notifications.len();
        t.notifications
            .retain(|n| !(n.id == id && scope.allows(n.clinic_id)));
        Ok(t.notifications.len() != before)
    }
}
