// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    ClinicStore, ControlQuery, NewControl, NewCost, NewNotification, NewPatient, NewSchedule,
    PatientPatch, PatientQuery, SchedulePatch, ScheduleQuery, SessionPrincipal, StoreResult,
};
use crate::models::{
    Control, ControlSchedule, Cost, Notification, Patient, PatientBrief, Profile,
};
use crate::tenant::Scope;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/* ============================================================
   Row shapes
   ============================================================ */

const PATIENT_COLUMNS: &str = "id, clinic_id, first_name, last_name, email, phone, date_of_birth, \
     medical_history, created_at, updated_at";

const SCHEDULE_COLUMNS: &str = "id, clinic_id, patient_id, control_type, frequency, start_date, \
     end_date, is_active, cost_cents, created_at, updated_at";

const COST_COLUMNS: &str =
    "id, clinic_id, control_id, amount_cents, cost_type, description, cost_date, created_at";

const NOTIFICATION_COLUMNS: &str =
    "id, clinic_id, patient_id, control_id, notification_type, message, is_read, created_at";

const PROFILE_COLUMNS: &str = "id, email, role, clinic_name, created_at, updated_at";

// `c` is the control row, `p` the (possibly missing) patient.
const CONTROL_SELECT: &str = r#"
    SELECT
      c.id, c.clinic_id, c.patient_id, c.control_type, c.scheduled_date,
      c.status, c.cost_cents, c.notes, c.created_at, c.updated_at,
      p.first_name AS patient_first_name,
      p.last_name  AS patient_last_name
"#;

#[derive(Debug, sqlx::FromRow)]
struct ControlJoinRow {
    id: Uuid,
    clinic_id: Uuid,
    patient_id: Uuid,
    control_type: String,
    scheduled_date: DateTime<Utc>,
    status: String,
    cost_cents: Option<i64>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    patient_first_name: Option<String>,
    patient_last_name: Option<String>,
}

impl From<ControlJoinRow> for Control {
    fn from(r: ControlJoinRow) -> Self {
        let patient = match (r.patient_first_name, r.patient_last_name) {
            (Some(first_name), Some(last_name)) => Some(PatientBrief {
                first_name,
                last_name,
            }),
            _ => None,
        };
        Control {
            id: r.id,
            clinic_id: r.clinic_id,
            patient_id: r.patient_id,
            control_type: r.control_type,
            scheduled_date: r.scheduled_date,
            status: r.status,
            cost_cents: r.cost_cents,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
            patient,
        }
    }
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: Scope, column: &str) {
    if let Scope::Clinic(clinic_id) = scope {
        qb.push(format!(" AND {column} = ")).push_bind(clinic_id);
    }
}

/* ============================================================
   ClinicStore
   ============================================================ */

#[async_trait]
impl ClinicStore for PgStore {
    async fn find_session(&self, token_hash: &str) -> StoreResult<Option<SessionPrincipal>> {
        #[derive(sqlx::FromRow)]
        struct SessionLookupRow {
            session_token_id: Uuid,
            user_id: Uuid,
            role: String,
        }

        let row: Option<SessionLookupRow> = sqlx::query_as::<_, SessionLookupRow>(
            r#"
            SELECT st.session_token_id, st.user_id, p.role
            FROM session_token st
            JOIN profiles p ON p.id = st.user_id
            WHERE st.session_token_hash = $1
              AND st.revoked_at IS NULL
              AND st.expires_at > now()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Touch last_seen_at (best-effort)
        if let Err(e) = sqlx::query(
            r#"
            UPDATE session_token
            SET last_seen_at = now()
            WHERE session_token_id = $1
            "#,
        )
        .bind(row.session_token_id)
        .execute(&self.pool)
        .await
        {
            tracing::debug!(error = %e, "could not touch session last_seen_at");
        }

        Ok(Some(SessionPrincipal {
            session_token_id: row.session_token_id,
            user_id: row.user_id,
            role: row.role,
        }))
    }

    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at DESC LIMIT 200"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_profiles(&self) -> StoreResult<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn update_profile_clinic_name(&self, id: Uuid, clinic_name: &str) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET clinic_name = $2, updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(clinic_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_profile_role(&self, id: Uuid, role: &str) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET role = $2, updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /* -------------------------
       patients
    --------------------------*/

    async fn list_patients(&self, scope: Scope, query: &PatientQuery) -> StoreResult<Vec<Patient>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE TRUE"
        ));
        push_scope(&mut qb, scope, "clinic_id");

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let like = format!("%{search}%");
            qb.push(" AND (first_name ILIKE ")
                .push_bind(like.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(like.clone())
                .push(" OR email ILIKE ")
                .push_bind(like)
                .push(")");
        }

        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(query.limit);

        let rows = qb
            .build_query_as::<Patient>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_patient(&self, scope: Scope, id: Uuid) -> StoreResult<Option<Patient>> {
        let row = sqlx::query_as::<_, Patient>(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
            "#
        ))
        .bind(id)
        .bind(scope.clinic_id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_patients_by_ids(&self, scope: Scope, ids: &[Uuid]) -> StoreResult<Vec<Patient>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Patient>(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE id = ANY($1)
              AND ($2::uuid IS NULL OR clinic_id = $2)
            "#
        ))
        .bind(ids)
        .bind(scope.clinic_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_patients(&self, scope: Scope) -> StoreResult<i64> {
        let n: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM patients
            WHERE ($1::uuid IS NULL OR clinic_id = $1)
            "#,
        )
        .bind(scope.clinic_id())
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    async fn insert_patient(&self, new: NewPatient) -> StoreResult<Patient> {
        let row = sqlx::query_as::<_, Patient>(&format!(
            r#"
            INSERT INTO patients (clinic_id, first_name, last_name, email, phone, date_of_birth, medical_history)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING {PATIENT_COLUMNS}
            "#
        ))
        .bind(new.clinic_id)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.date_of_birth)
        .bind(new.medical_history)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_patient(&self, scope: Scope, id: Uuid, patch: &PatientPatch) -> StoreResult<Option<Patient>> {
        // Double options: the flag says "field present", the value may be NULL.
        let row = sqlx::query_as::<_, Patient>(&format!(
            r#"
            UPDATE patients
            SET first_name      = COALESCE($3, first_name),
                last_name       = COALESCE($4, last_name),
                email           = CASE WHEN $5 THEN $6 ELSE email END,
                phone           = CASE WHEN $7 THEN $8 ELSE phone END,
                date_of_birth   = CASE WHEN $9 THEN $10 ELSE date_of_birth END,
                medical_history = CASE WHEN $11 THEN $12 ELSE medical_history END,
                updated_at = now()
            WHERE id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
            RETURNING {PATIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.clinic_id())
        .bind(patch.first_name.as_deref())
        .bind(patch.last_name.as_deref())
        .bind(patch.email.is_some())
        .bind(patch.email.clone().flatten())
        .bind(patch.phone.is_some())
        .bind(patch.phone.clone().flatten())
        .bind(patch.date_of_birth.is_some())
        .bind(patch.date_of_birth.flatten())
        .bind(patch.medical_history.is_some())
        .bind(patch.medical_history.clone().flatten())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /* -------------------------
       controls
    --------------------------*/

    async fn list_controls(&self, scope: Scope, query: &ControlQuery) -> StoreResult<Vec<Control>> {
        let mut qb = QueryBuilder::<Postgres>::new(CONTROL_SELECT);
        qb.push(" FROM controls c LEFT JOIN patients p ON p.id = c.patient_id AND p.clinic_id = c.clinic_id WHERE TRUE");
        push_scope(&mut qb, scope, "c.clinic_id");

        if let Some(patient_id) = query.patient_id {
            qb.push(" AND c.patient_id = ").push_bind(patient_id);
        }
        if let Some(from) = query.from {
            qb.push(" AND c.scheduled_date >= ").push_bind(from);
        }
        if let Some(to) = query.to {
            qb.push(" AND c.scheduled_date < ").push_bind(to);
        }
        if let Some(status) = &query.status {
            qb.push(" AND c.status = ").push_bind(status.clone());
        }
        qb.push(" ORDER BY c.scheduled_date ASC, c.id ASC");

        let rows = qb
            .build_query_as::<ControlJoinRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Control::from).collect())
    }

    async fn count_controls(&self, scope: Scope) -> StoreResult<i64> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM controls WHERE ($1::uuid IS NULL OR clinic_id = $1)",
        )
        .bind(scope.clinic_id())
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    async fn get_control(&self, scope: Scope, id: Uuid) -> StoreResult<Option<Control>> {
        let row = sqlx::query_as::<_, ControlJoinRow>(&format!(
            r#"
            {CONTROL_SELECT}
            FROM controls c
            LEFT JOIN patients p ON p.id = c.patient_id AND p.clinic_id = c.clinic_id
            WHERE c.id = $1
              AND ($2::uuid IS NULL OR c.clinic_id = $2)
            "#
        ))
        .bind(id)
        .bind(scope.clinic_id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Control::from))
    }

    async fn insert_control(&self, new: NewControl) -> StoreResult<Control> {
        let row = sqlx::query_as::<_, ControlJoinRow>(&format!(
            r#"
            WITH c AS (
              INSERT INTO controls (clinic_id, patient_id, control_type, scheduled_date, status, cost_cents, notes)
              VALUES ($1,$2,$3,$4,$5,$6,$7)
              RETURNING *
            )
            {CONTROL_SELECT}
            FROM c
            LEFT JOIN patients p ON p.id = c.patient_id AND p.clinic_id = c.clinic_id
            "#
        ))
        .bind(new.clinic_id)
        .bind(new.patient_id)
        .bind(new.control_type)
        .bind(new.scheduled_date)
        .bind(new.status)
        .bind(new.cost_cents)
        .bind(new.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_control_status(
        &self,
        scope: Scope,
        id: Uuid,
        status: &str,
        cost_cents: Option<Option<i64>>,
    ) -> StoreResult<Option<Control>> {
        let row = sqlx::query_as::<_, ControlJoinRow>(&format!(
            r#"
            WITH c AS (
              UPDATE controls
              SET status = $3,
                  cost_cents = CASE WHEN $4 THEN $5 ELSE cost_cents END,
                  updated_at = now()
              WHERE id = $1
                AND ($2::uuid IS NULL OR clinic_id = $2)
              RETURNING *
            )
            {CONTROL_SELECT}
            FROM c
            LEFT JOIN patients p ON p.id = c.patient_id AND p.clinic_id = c.clinic_id
            "#
        ))
        .bind(id)
        .bind(scope.clinic_id())
        .bind(status)
        .bind(cost_cents.is_some())
        .bind(cost_cents.flatten())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Control::from))
    }

    async fn update_control_date(
        &self,
        scope: Scope,
        id: Uuid,
        scheduled_date: DateTime<Utc>,
    ) -> StoreResult<Option<Control>> {
        let row = sqlx::query_as::<_, ControlJoinRow>(&format!(
            r#"
            WITH c AS (
              UPDATE controls
              SET scheduled_date = $3, updated_at = now()
              WHERE id = $1
                AND ($2::uuid IS NULL OR clinic_id = $2)
              RETURNING *
            )
            {CONTROL_SELECT}
            FROM c
            LEFT JOIN patients p ON p.id = c.patient_id AND p.clinic_id = c.clinic_id
            "#
        ))
        .bind(id)
        .bind(scope.clinic_id())
        .bind(scheduled_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Control::from))
    }

    /* -------------------------
       costs
    --------------------------*/

    async fn list_costs(&self, scope: Scope) -> StoreResult<Vec<Cost>> {
        let rows = sqlx::query_as::<_, Cost>(&format!(
            r#"
            SELECT {COST_COLUMNS}
            FROM costs
            WHERE ($1::uuid IS NULL OR clinic_id = $1)
            ORDER BY cost_date ASC
            "#
        ))
        .bind(scope.clinic_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_cost(&self, new: NewCost) -> StoreResult<Cost> {
        let row = sqlx::query_as::<_, Cost>(&format!(
            r#"
            INSERT INTO costs (clinic_id, control_id, amount_cents, cost_type, description, cost_date)
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING {COST_COLUMNS}
            "#
        ))
        .bind(new.clinic_id)
        .bind(new.control_id)
        .bind(new.amount_cents)
        .bind(new.cost_type)
        .bind(new.description)
        .bind(new.cost_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert_control_cost(&self, new: NewCost) -> StoreResult<Cost> {
        let row = sqlx::query_as::<_, Cost>(&format!(
            r#"
            INSERT INTO costs (clinic_id, control_id, amount_cents, cost_type, description, cost_date)
            VALUES ($1,$2,$3,$4,$5,$6)
            ON CONFLICT (control_id)
            DO UPDATE SET amount_cents = EXCLUDED.amount_cents,
                          cost_type    = EXCLUDED.cost_type,
                          description  = EXCLUDED.description,
                          cost_date    = EXCLUDED.cost_date
            RETURNING {COST_COLUMNS}
            "#
        ))
        .bind(new.clinic_id)
        .bind(new.control_id)
        .bind(new.amount_cents)
        .bind(new.cost_type)
        .bind(new.description)
        .bind(new.cost_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_control_cost(&self, scope: Scope, control_id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM costs
            WHERE control_id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
            "#,
        )
        .bind(control_id)
        .bind(scope.clinic_id())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    /* -------------------------
       schedules
    --------------------------*/

    async fn list_schedules(&self, scope: Scope, query: &ScheduleQuery) -> StoreResult<Vec<ControlSchedule>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {SCHEDULE_COLUMNS} FROM control_schedules WHERE TRUE"
        ));
        push_scope(&mut qb, scope, "clinic_id");
        if let Some(patient_id) = query.patient_id {
            qb.push(" AND patient_id = ").push_bind(patient_id);
        }
        if query.active_only {
            qb.push(" AND is_active = TRUE");
        }
        qb.push(" ORDER BY start_date ASC, id ASC");

        let rows = qb
            .build_query_as::<ControlSchedule>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_schedule(&self, scope: Scope, id: Uuid) -> StoreResult<Option<ControlSchedule>> {
        let row = sqlx::query_as::<_, ControlSchedule>(&format!(
            r#"
            SELECT {SCHEDULE_COLUMNS}
            FROM control_schedules
            WHERE id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
            "#
        ))
        .bind(id)
        .bind(scope.clinic_id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_schedule(&self, new: NewSchedule) -> StoreResult<ControlSchedule> {
        let row = sqlx::query_as::<_, ControlSchedule>(&format!(
            r#"
            INSERT INTO control_schedules
              (clinic_id, patient_id, control_type, frequency, start_date, end_date, is_active, cost_cents)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(new.clinic_id)
        .bind(new.patient_id)
        .bind(new.control_type)
        .bind(new.frequency)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.is_active)
        .bind(new.cost_cents)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_schedule(
        &self,
        scope: Scope,
        id: Uuid,
        patch: &SchedulePatch,
    ) -> StoreResult<Option<ControlSchedule>> {
        let row = sqlx::query_as::<_, ControlSchedule>(&format!(
            r#"
            UPDATE control_schedules
            SET control_type = COALESCE($3, control_type),
                frequency    = COALESCE($4, frequency),
                start_date   = COALESCE($5, start_date),
                end_date     = CASE WHEN $6 THEN $7 ELSE end_date END,
                is_active    = COALESCE($8, is_active),
                cost_cents   = CASE WHEN $9 THEN $10 ELSE cost_cents END,
                updated_at = now()
            WHERE id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.clinic_id())
        .bind(patch.control_type.as_deref())
        .bind(patch.frequency.as_deref())
        .bind(patch.start_date)
        .bind(patch.end_date.is_some())
        .bind(patch.end_date.flatten())
        .bind(patch.is_active)
        .bind(patch.cost_cents.is_some())
        .bind(patch.cost_cents.flatten())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /* -------------------------
       notifications
    --------------------------*/

    async fn list_notifications(&self, scope: Scope, limit: i64) -> StoreResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE ($1::uuid IS NULL OR clinic_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(scope.clinic_id())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_unread_notifications(&self, scope: Scope) -> StoreResult<i64> {
        let n: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE is_read = FALSE
              AND ($1::uuid IS NULL OR clinic_id = $1)
            "#,
        )
        .bind(scope.clinic_id())
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    async fn insert_notification(&self, new: NewNotification) -> StoreResult<Notification> {
        let row = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (clinic_id, patient_id, control_id, notification_type, message, is_read)
            VALUES ($1,$2,$3,$4,$5, FALSE)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(new.clinic_id)
        .bind(new.patient_id)
        .bind(new.control_id)
        .bind(new.kind.as_str())
        .bind(new.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn mark_notification_read(&self, scope: Scope, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
            "#,
        )
        .bind(id)
        .bind(scope.clinic_id())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&self, scope: Scope) -> StoreResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE is_read = FALSE
              AND ($1::uuid IS NULL OR clinic_id = $1)
            "#,
        )
        .bind(scope.clinic_id())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn delete_notification(&self, scope: Scope, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE id = $1
              AND ($2::uuid IS NULL OR clinic_id = $2)
            "#,
        )
        .bind(id)
        .bind(scope.clinic_id())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
