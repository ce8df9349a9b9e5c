//! Calendar event modelling: real controls and virtual schedule occurrences
//! merged into one ordered sequence.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::adapter::ClinicAdapter;
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{Control, ControlSchedule, PatientBrief};
use crate::scheduling::recurrence::{expand_schedule, DateWindow};
use crate::scheduling::status::{badge_for, BadgeColor, ControlStatus};
use crate::tenant::TenantContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSettings {
    pub duration: Duration,
    /// Time of day given to schedule occurrences, which only carry a date.
    pub occurrence_time: NaiveTime,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            duration: Duration::minutes(60),
            occurrence_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Control,
    Schedule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: String,
    pub control_type: String,
    pub cost: i64,
    pub notes: String,
    pub patient_id: Uuid,
    pub source: EventSource,
    pub badge: BadgeColor,
}

impl CalendarEvent {
    pub fn is_virtual(&self) -> bool {
        self.source == EventSource::Schedule
    }
}

fn title(patient: Option<&PatientBrief>, control_type: &str) -> String {
    format!(
        "{} - {}",
        PatientBrief::display_or_placeholder(patient),
        control_type
    )
}

pub fn event_from_control(control: &Control, settings: &CalendarSettings) -> CalendarEvent {
    CalendarEvent {
        id: control.id.to_string(),
        title: title(control.patient.as_ref(), &control.control_type),
        start: control.scheduled_date,
        end: control.scheduled_date + settings.duration,
        status: control.status.clone(),
        control_type: control.control_type.clone(),
        cost: control.cost_cents.unwrap_or(0),
        notes: control.notes.clone().unwrap_or_default(),
        patient_id: control.patient_id,
        source: EventSource::Control,
        badge: badge_for(&control.status),
    }
}

/// Virtual events for one schedule inside `window`.
pub fn events_from_schedule(
    schedule: &ControlSchedule,
    patient: Option<&PatientBrief>,
    window: DateWindow,
    settings: &CalendarSettings,
) -> SchedulingResult<Vec<CalendarEvent>> {
    let occurrences = expand_schedule(schedule, window)?;
    Ok(occurrences
        .map(|date| {
            let start = date.and_time(settings.occurrence_time).and_utc();
            CalendarEvent {
                id: format!("{}:{}", schedule.id, date.format("%Y-%m-%d")),
                title: title(patient, &schedule.control_type),
                start,
                end: start + settings.duration,
                status: ControlStatus::Scheduled.as_str().to_string(),
                control_type: schedule.control_type.clone(),
                cost: schedule.cost_cents.unwrap_or(0),
                notes: String::new(),
                patient_id: schedule.patient_id,
                source: EventSource::Schedule,
                badge: ControlStatus::Scheduled.badge(),
            }
        })
        .collect())
}

/// Merge real and virtual events for `window`, ordered by start then id.
///
/// A virtual occurrence is dropped when a real control already exists for the
/// same patient, control type and day.
pub fn build_calendar(
    controls: &[Control],
    schedules: &[ControlSchedule],
    patients: &HashMap<Uuid, PatientBrief>,
    window: DateWindow,
    settings: &CalendarSettings,
    status: Option<&str>,
) -> SchedulingResult<Vec<CalendarEvent>> {
    let mut events: Vec<CalendarEvent> = controls
        .iter()
        .filter(|c| window.contains(c.scheduled_date.date_naive()))
        .map(|c| event_from_control(c, settings))
        .collect();

    let taken: HashSet<(Uuid, &str, NaiveDate)> = controls
        .iter()
        .map(|c| (c.patient_id, c.control_type.as_str(), c.scheduled_date.date_naive()))
        .collect();

    for s in schedules {
        for ev in events_from_schedule(s, patients.get(&s.patient_id), window, settings)? {
            if !taken.contains(&(ev.patient_id, ev.control_type.as_str(), ev.start.date_naive())) {
                events.push(ev);
            }
        }
    }

    if let Some(status) = status.filter(|s| *s != "all") {
        events.retain(|e| e.status == status);
    }

    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    Ok(events)
}

const OCCURRENCE_MOVE: &str = "schedule occurrences cannot be moved; edit the schedule instead";

/// Control id behind a calendar event id. Schedule occurrences are rejected.
pub fn movable_control_id(event_id: &str) -> SchedulingResult<Uuid> {
    if event_id.contains(':') {
        return Err(SchedulingError::validation(OCCURRENCE_MOVE));
    }
    Uuid::parse_str(event_id)
        .map_err(|_| SchedulingError::validation("calendar event id is not a control id"))
}

pub fn check_move(start: DateTime<Utc>, end: DateTime<Utc>) -> SchedulingResult<()> {
    if end <= start {
        return Err(SchedulingError::validation("end must be after start"));
    }
    Ok(())
}

/// Client-side calendar state with optimistic rescheduling.
///
/// `displayed` may run ahead of `committed` while a move is in flight; a
/// failed move restores the committed snapshot wholesale.
#[derive(Debug, Clone, Default)]
pub struct CalendarBoard {
    committed: Vec<CalendarEvent>,
    displayed: Vec<CalendarEvent>,
}

impl CalendarBoard {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            committed: events.clone(),
            displayed: events,
        }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.displayed
    }

    pub fn filtered<'a>(&'a self, status: Option<&'a str>) -> impl Iterator<Item = &'a CalendarEvent> + 'a {
        self.displayed
            .iter()
            .filter(move |e| status.is_none_or(|s| s == "all" || e.status == s))
    }

    fn apply_move(&mut self, id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> SchedulingResult<Uuid> {
        check_move(start, end)?;
        let ev = self
            .displayed
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(SchedulingError::NotFound("calendar event"))?;
        if ev.is_virtual() {
            return Err(SchedulingError::validation(OCCURRENCE_MOVE));
        }
        let control_id = movable_control_id(&ev.id)?;
        ev.start = start;
        ev.end = end;
        Ok(control_id)
    }

    /// Move an event locally, persist it, and roll back on failure.
    pub async fn reschedule(
        &mut self,
        adapter: &ClinicAdapter,
        tenant: &TenantContext,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulingResult<Control> {
        let control_id = self.apply_move(id, start, end)?;
        match adapter.reschedule_appointment(tenant, control_id, start).await {
            Ok(control) => {
                self.committed = self.displayed.clone();
                Ok(control)
            }
            Err(e) => {
                tracing::warn!(event_id = %id, error = %e, "reschedule failed; restoring calendar");
                self.displayed = self.committed.clone();
                Err(e)
            }
        }
    }
}
