use chrono::{NaiveDate, NaiveTime, Utc};
use clinic_controls::error::SchedulingError;
use clinic_controls::models::ControlSchedule;
use clinic_controls::scheduling::recurrence::{
    count_occurrences, expand_schedule, DateWindow, Frequency, RecurrenceRule,
};
use uuid::Uuid;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn schedule(frequency: &str, start: NaiveDate, end: Option<NaiveDate>, active: bool) -> ControlSchedule {
    ControlSchedule {
        id: Uuid::new_v4(),
        clinic_id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        control_type: "Checkup".into(),
        frequency: frequency.into(),
        start_date: start,
        end_date: end,
        is_active: active,
        cost_cents: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn weekly_window_is_half_open() {
    let s = schedule("weekly", d(2024, 1, 1), None, true);
    let got: Vec<_> = expand_schedule(&s, DateWindow::new(d(2024, 1, 1), d(2024, 1, 22)))
        .unwrap()
        .collect();
    assert_eq!(got, vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15)]);
}

#[test]
fn monthly_from_month_end_clamps_then_recovers() {
    let leap = RecurrenceRule::new(d(2024, 1, 31), None, Frequency::Monthly);
    let got: Vec<_> = leap
        .occurrences(DateWindow::new(d(2024, 1, 1), d(2024, 5, 1)))
        .collect();
    assert_eq!(got, vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]);

    let plain = RecurrenceRule::new(d(2023, 1, 31), None, Frequency::Monthly);
    let got: Vec<_> = plain
        .occurrences(DateWindow::new(d(2023, 2, 1), d(2023, 4, 1)))
        .collect();
    assert_eq!(got, vec![d(2023, 2, 28), d(2023, 3, 31)]);
}

#[test]
fn inactive_and_unknown_frequency() {
    let inactive = schedule("daily", d(2024, 1, 1), None, false);
    let window = DateWindow::new(d(2024, 1, 1), d(2024, 2, 1));
    assert_eq!(expand_schedule(&inactive, window).unwrap().count(), 0);

    let bad = schedule("every other tuesday", d(2024, 1, 1), None, true);
    assert!(matches!(
        expand_schedule(&bad, window),
        Err(SchedulingError::Validation(_))
    ));
    assert!(count_occurrences(&[inactive, bad], window).is_err());
}

#[test]
fn window_before_start_or_after_end_is_empty() {
    let s = schedule("daily", d(2024, 6, 1), Some(d(2024, 6, 10)), true);
    assert_eq!(expand_schedule(&s, DateWindow::new(d(2024, 1, 1), d(2024, 6, 1))).unwrap().count(), 0);
    assert_eq!(expand_schedule(&s, DateWindow::new(d(2024, 6, 11), d(2024, 7, 1))).unwrap().count(), 0);
    assert_eq!(expand_schedule(&s, DateWindow::new(d(2024, 1, 1), d(2025, 1, 1))).unwrap().count(), 10);
}

#[test]
fn occurrences_carry_time_of_day() {
    let rule = RecurrenceRule::new(d(2024, 3, 1), None, Frequency::Quarterly);
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let starts: Vec<_> = rule
        .occurrences(DateWindow::new(d(2024, 1, 1), d(2025, 1, 1)))
        .at(nine)
        .map(|t| t.to_rfc3339())
        .collect();
    assert_eq!(
        starts,
        vec![
            "2024-03-01T09:00:00+00:00",
            "2024-06-01T09:00:00+00:00",
            "2024-09-01T09:00:00+00:00",
            "2024-12-01T09:00:00+00:00",
        ]
    );
}

#[test]
fn totals_across_schedules() {
    let window = DateWindow::new(d(2024, 1, 1), d(2024, 2, 1));
    let schedules = vec![
        schedule("weekly", d(2024, 1, 1), None, true),
        schedule("monthly", d(2023, 12, 15), None, true),
        schedule("yearly", d(2020, 5, 5), None, true),
    ];
    assert_eq!(count_occurrences(&schedules, window).unwrap(), 5 + 1);
}
