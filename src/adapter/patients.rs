use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{deserialize_double_option, optional_text, required, ClinicAdapter};
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{Control, ControlSchedule, Patient};
use crate::store::{ControlQuery, NewPatient, PatientPatch, PatientQuery, ScheduleQuery};
use crate::tenant::TenantContext;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePatientInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePatientInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub medical_history: Option<Option<String>>,
}

/// Patient detail page: the patient plus everything scheduled for them.
#[derive(Debug, Clone, Serialize)]
pub struct PatientOverview {
    pub patient: Patient,
    pub controls: Vec<Control>,
    pub schedules: Vec<ControlSchedule>,
}

impl ClinicAdapter {
    pub async fn list_patients(
        &self,
        tenant: &TenantContext,
        search: Option<&str>,
        limit: Option<i64>,
    ) -> SchedulingResult<Vec<Patient>> {
        let query = PatientQuery {
            search: search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            limit: limit.unwrap_or(50).clamp(1, 200),
        };
        Ok(self.store.list_patients(tenant.scope(), &query).await?)
    }

    pub async fn get_patient(&self, tenant: &TenantContext, id: Uuid) -> SchedulingResult<Patient> {
        self.store
            .get_patient(tenant.scope(), id)
            .await?
            .ok_or(SchedulingError::NotFound("patient"))
    }

    pub async fn create_patient(
        &self,
        tenant: &TenantContext,
        input: CreatePatientInput,
    ) -> SchedulingResult<Patient> {
        let first_name = required(&input.first_name, "first_name")?;
        let last_name = required(&input.last_name, "last_name")?;

        let patient = self
            .store
            .insert_patient(NewPatient {
                clinic_id: tenant.clinic_id,
                first_name,
                last_name,
                email: optional_text(input.email),
                phone: optional_text(input.phone),
                date_of_birth: input.date_of_birth,
                medical_history: optional_text(input.medical_history),
            })
            .await?;
        tracing::info!(patient_id = %patient.id, "patient created");
        Ok(patient)
    }

    pub async fn update_patient(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        input: UpdatePatientInput,
    ) -> SchedulingResult<Patient> {
        let first_name = match &input.first_name {
            Some(v) => Some(required(v, "first_name")?),
            None => None,
        };
        let last_name = match &input.last_name {
            Some(v) => Some(required(v, "last_name")?),
            None => None,
        };
        let patch = PatientPatch {
            first_name,
            last_name,
            email: input.email.map(optional_text),
            phone: input.phone.map(optional_text),
            date_of_birth: input.date_of_birth,
            medical_history: input.medical_history.map(optional_text),
        };

        self.store
            .update_patient(tenant.scope(), id, &patch)
            .await?
            .ok_or(SchedulingError::NotFound("patient"))
    }

    pub async fn patient_overview(&self, tenant: &TenantContext, id: Uuid) -> SchedulingResult<PatientOverview> {
        let scope = tenant.scope();
        let patient = self.get_patient(tenant, id).await?;
        let controls = self
            .store
            .list_controls(
                scope,
                &ControlQuery {
                    patient_id: Some(id),
                    ..Default::default()
                },
            )
            .await?;
        let schedules = self
            .store
            .list_schedules(
                scope,
                &ScheduleQuery {
                    patient_id: Some(id),
                    active_only: false,
                },
            )
            .await?;
        Ok(PatientOverview {
            patient,
            controls,
            schedules,
        })
    }
}
