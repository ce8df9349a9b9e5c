use chrono::{NaiveDate, Utc};
use clinic_controls::models::{Control, Cost};
use clinic_controls::scheduling::revenue::{
    monthly_revenue, revenue_by_control_type, status_distribution, summarize, total_revenue,
    yearly_revenue,
};
use clinic_controls::scheduling::status::ControlStatus;
use proptest::prelude::*;
use uuid::Uuid;

fn cost(amount_cents: i64, cost_type: &str, date: NaiveDate) -> Cost {
    Cost {
        id: Uuid::new_v4(),
        clinic_id: Uuid::nil(),
        control_id: None,
        amount_cents,
        cost_type: cost_type.into(),
        description: None,
        cost_date: date,
        created_at: Utc::now(),
    }
}

fn control(control_type: &str, status: &str, cost_cents: Option<i64>) -> Control {
    let now = Utc::now();
    Control {
        id: Uuid::new_v4(),
        clinic_id: Uuid::nil(),
        patient_id: Uuid::new_v4(),
        control_type: control_type.into(),
        scheduled_date: now,
        status: status.into(),
        cost_cents,
        notes: None,
        created_at: now,
        updated_at: now,
        patient: None,
    }
}

fn arb_cost() -> impl Strategy<Value = Cost> {
    (
        0i64..1_000_000,
        prop_oneof![Just("control"), Just("equipment"), Just("supplies")],
        2020i32..2026,
        1u32..=12,
        1u32..=28,
    )
        .prop_map(|(amount, ty, y, m, day)| cost(amount, ty, NaiveDate::from_ymd_opt(y, m, day).unwrap()))
}

fn arb_control() -> impl Strategy<Value = Control> {
    (
        prop_oneof![Just("Checkup"), Just("Cleaning"), Just("X-Ray")],
        prop_oneof![
            Just("scheduled"),
            Just("completed"),
            Just("cancelled"),
            Just("no_show"),
            Just("rescheduled"),
        ],
        proptest::option::of(0i64..100_000),
    )
        .prop_map(|(ty, status, cost)| control(ty, status, cost))
}

#[test]
fn equipment_costs_never_count_as_revenue() {
    let june = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let costs = vec![cost(5000, "control", june), cost(12_000, "equipment", june)];
    assert_eq!(monthly_revenue(&costs, 6, 2024), 5000);
    assert_eq!(yearly_revenue(&costs, 2024), 5000);
    assert_eq!(total_revenue(&costs), 5000);
}

#[test]
fn by_type_skips_controls_without_cost() {
    let controls = vec![
        control("Checkup", "completed", Some(5000)),
        control("Checkup", "scheduled", Some(2500)),
        control("Cleaning", "scheduled", None),
        control("X-Ray", "scheduled", Some(0)),
    ];
    let by_type = revenue_by_control_type(&controls);
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type["Checkup"], 7500);
}

#[test]
fn unknown_statuses_are_bucketed_as_other() {
    let controls = vec![
        control("Checkup", "completed", None),
        control("Checkup", "rescheduled", None),
        control("Checkup", "no_show", None),
    ];
    let dist = status_distribution(&controls);
    assert_eq!(dist.get(ControlStatus::Completed), 1);
    assert_eq!(dist.get(ControlStatus::NoShow), 1);
    assert_eq!(dist.other, 1);
    assert_eq!(dist.total(), 3);
}

#[test]
fn summary_combines_both_sources() {
    let june = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let may = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let costs = vec![cost(5000, "control", june), cost(1000, "control", may)];
    let controls = vec![control("Checkup", "completed", Some(5000))];
    let report = summarize(&costs, &controls, 6, 2024);
    assert_eq!(report.monthly, 5000);
    assert_eq!(report.yearly, 6000);
    assert_eq!(report.total, 6000);
    assert_eq!(report.monthly_breakdown["2024-05"], 1000);
    assert_eq!(report.by_status.completed, 1);
    assert_eq!(report.total_controls, 1);
}

proptest! {
    #[test]
    fn revenue_is_additive(a in proptest::collection::vec(arb_cost(), 0..30),
                           b in proptest::collection::vec(arb_cost(), 0..30),
                           month in 1u32..=12,
                           year in 2020i32..2026) {
        let joined: Vec<Cost> = a.iter().chain(b.iter()).cloned().collect();
        prop_assert_eq!(monthly_revenue(&joined, month, year), monthly_revenue(&a, month, year) + monthly_revenue(&b, month, year));
        prop_assert_eq!(yearly_revenue(&joined, year), yearly_revenue(&a, year) + yearly_revenue(&b, year));
        prop_assert_eq!(total_revenue(&joined), total_revenue(&a) + total_revenue(&b));
    }

    #[test]
    fn months_sum_to_year(costs in proptest::collection::vec(arb_cost(), 0..50), year in 2020i32..2026) {
        let by_month: i64 = (1..=12).map(|m| monthly_revenue(&costs, m, year)).sum();
        prop_assert_eq!(by_month, yearly_revenue(&costs, year));
    }

    #[test]
    fn distribution_covers_every_control(controls in proptest::collection::vec(arb_control(), 0..40)) {
        prop_assert_eq!(status_distribution(&controls).total(), controls.len());
    }
}
