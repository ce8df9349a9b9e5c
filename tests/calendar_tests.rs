use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use clinic_controls::adapter::{ClinicAdapter, CreateControlInput, CreatePatientInput, CreateScheduleInput};
use clinic_controls::error::SchedulingError;
use clinic_controls::scheduling::calendar::{CalendarBoard, CalendarSettings, EventSource};
use clinic_controls::scheduling::recurrence::DateWindow;
use clinic_controls::store::MemoryStore;
use clinic_controls::tenant::TenantContext;
use uuid::Uuid;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

async fn seeded() -> (Arc<MemoryStore>, ClinicAdapter, TenantContext, CalendarBoard) {
    let store = Arc::new(MemoryStore::new());
    let adapter = ClinicAdapter::new(store.clone());
    let tenant = TenantContext::admin(Uuid::new_v4());

    let p = adapter
        .create_patient(
            &tenant,
            CreatePatientInput {
                first_name: "Ana".into(),
                last_name: "Diaz".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    adapter
        .create_appointment(
            &tenant,
            CreateControlInput {
                patient_id: p.id.to_string(),
                control_type: "X-Ray".into(),
                scheduled_date: "2024-01-03".into(),
                scheduled_time: Some("11:30".into()),
                cost_cents: Some(8000),
                notes: Some("bring previous films".into()),
            },
        )
        .await
        .unwrap();
    adapter
        .create_schedule(
            &tenant,
            CreateScheduleInput {
                patient_id: p.id.to_string(),
                control_type: "Checkup".into(),
                frequency: "weekly".into(),
                start_date: "2024-01-01".into(),
                cost_cents: Some(3000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let events = adapter
        .calendar_events(
            &tenant,
            DateWindow::new(d(2024, 1, 1), d(2024, 1, 15)),
            None,
            &CalendarSettings::default(),
        )
        .await
        .unwrap();
    (store, adapter, tenant, CalendarBoard::new(events))
}

#[tokio::test]
async fn calendar_merges_controls_and_occurrences() {
    let (_store, _adapter, _tenant, board) = seeded().await;
    let events = board.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].source, EventSource::Schedule);
    assert_eq!(events[0].title, "Ana Diaz - Checkup");
    assert_eq!(events[0].cost, 3000);
    assert_eq!(events[1].source, EventSource::Control);
    assert_eq!(events[1].notes, "bring previous films");
    assert_eq!(events[2].start, Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap());
}

#[tokio::test]
async fn successful_move_is_committed() {
    let (_store, adapter, tenant, mut board) = seeded().await;
    let id = board.events()[1].id.clone();
    let start = Utc.with_ymd_and_hms(2024, 1, 12, 15, 0, 0).unwrap();

    let control = board
        .reschedule(&adapter, &tenant, &id, start, start + Duration::minutes(45))
        .await
        .unwrap();
    assert_eq!(control.scheduled_date, start);
    let moved = board.events().iter().find(|e| e.id == id).unwrap();
    assert_eq!(moved.start, start);
}

#[tokio::test]
async fn failed_move_restores_the_snapshot() {
    let (store, adapter, tenant, mut board) = seeded().await;
    let before = board.events().to_vec();
    let id = before[1].id.clone();
    store.fail_on("update_control_date", "write timeout");

    let start = Utc.with_ymd_and_hms(2024, 1, 12, 15, 0, 0).unwrap();
    let err = board
        .reschedule(&adapter, &tenant, &id, start, start + Duration::hours(1))
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::Persistence(ref m) if m == "write timeout"));
    assert_eq!(board.events(), before.as_slice());
}

#[tokio::test]
async fn occurrences_cannot_be_dragged() {
    let (store, adapter, tenant, mut board) = seeded().await;
    let id = board.events()[0].id.clone();
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();

    let err = board
        .reschedule(&adapter, &tenant, &id, start, start + Duration::hours(1))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
    assert_eq!(store.calls_to("update_control_date"), 0);
}

#[tokio::test]
async fn schedule_patients_load_in_one_call() {
    let (store, adapter, tenant, _board) = seeded().await;
    let other = adapter
        .create_patient(
            &tenant,
            CreatePatientInput {
                first_name: "Ben".into(),
                last_name: "Okafor".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    for frequency in ["monthly", "yearly"] {
        adapter
            .create_schedule(
                &tenant,
                CreateScheduleInput {
                    patient_id: other.id.to_string(),
                    control_type: "Cleaning".into(),
                    frequency: frequency.into(),
                    start_date: "2024-01-05".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    let lookups_before = store.calls_to("get_patient");
    let batches_before = store.calls_to("list_patients_by_ids");

    let events = adapter
        .calendar_events(
            &tenant,
            DateWindow::new(d(2024, 1, 1), d(2024, 1, 15)),
            None,
            &CalendarSettings::default(),
        )
        .await
        .unwrap();

    assert_eq!(store.calls_to("list_patients_by_ids"), batches_before + 1);
    assert_eq!(store.calls_to("get_patient"), lookups_before);
    assert_eq!(
        events.iter().filter(|e| e.title == "Ben Okafor - Cleaning").count(),
        2
    );
}
