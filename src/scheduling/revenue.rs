//! Revenue and status rollups over already-fetched rows.
//!
//! Two sources of revenue coexist: the cost ledger (`Cost` rows tagged
//! `"control"`) and the `cost_cents` stored on each control. Ledger-based
//! functions never read controls and vice versa.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::models::{Control, Cost};
use crate::scheduling::status::ControlStatus;

/// Only ledger rows with this tag count as revenue.
pub const CONTROL_COST_TYPE: &str = "control";

fn is_revenue(cost: &Cost) -> bool {
    cost.cost_type == CONTROL_COST_TYPE
}

/// Revenue for a calendar month (`month` is 1-based).
pub fn monthly_revenue(costs: &[Cost], month: u32, year: i32) -> i64 {
    costs
        .iter()
        .filter(|c| is_revenue(c) && c.cost_date.month() == month && c.cost_date.year() == year)
        .map(|c| c.amount_cents)
        .sum()
}

pub fn yearly_revenue(costs: &[Cost], year: i32) -> i64 {
    costs
        .iter()
        .filter(|c| is_revenue(c) && c.cost_date.year() == year)
        .map(|c| c.amount_cents)
        .sum()
}

pub fn total_revenue(costs: &[Cost]) -> i64 {
    costs
        .iter()
        .filter(|c| is_revenue(c))
        .map(|c| c.amount_cents)
        .sum()
}

/// Ledger revenue keyed by `"YYYY-MM"`.
pub fn monthly_breakdown(costs: &[Cost]) -> BTreeMap<String, i64> {
    let mut out = BTreeMap::new();
    for c in costs.iter().filter(|c| is_revenue(c)) {
        let key = format!("{:04}-{:02}", c.cost_date.year(), c.cost_date.month());
        *out.entry(key).or_insert(0) += c.amount_cents;
    }
    out
}

/// Sum of each control's own cost, grouped by control type. Controls without
/// a cost are skipped.
pub fn revenue_by_control_type(controls: &[Control]) -> BTreeMap<String, i64> {
    let mut out = BTreeMap::new();
    for c in controls {
        if let Some(cost) = c.cost_cents.filter(|v| *v != 0) {
            *out.entry(c.control_type.clone()).or_insert(0) += cost;
        }
    }
    out
}

/// Count per status. Unknown values land in `other`, so the buckets always
/// add up to the number of controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusDistribution {
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub no_show: usize,
    pub other: usize,
}

impl StatusDistribution {
    pub fn total(&self) -> usize {
        self.scheduled + self.completed + self.cancelled + self.no_show + self.other
    }

    pub fn get(&self, status: ControlStatus) -> usize {
        match status {
            ControlStatus::Scheduled => self.scheduled,
            ControlStatus::Completed => self.completed,
            ControlStatus::Cancelled => self.cancelled,
            ControlStatus::NoShow => self.no_show,
        }
    }
}

pub fn status_distribution(controls: &[Control]) -> StatusDistribution {
    let mut d = StatusDistribution::default();
    for c in controls {
        match c.known_status() {
            Some(ControlStatus::Scheduled) => d.scheduled += 1,
            Some(ControlStatus::Completed) => d.completed += 1,
            Some(ControlStatus::Cancelled) => d.cancelled += 1,
            Some(ControlStatus::NoShow) => d.no_show += 1,
            None => d.other += 1,
        }
    }
    d
}

/// Everything the reports view shows.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub month: u32,
    pub year: i32,
    pub monthly: i64,
    pub yearly: i64,
    pub total: i64,
    pub by_type: BTreeMap<String, i64>,
    pub by_status: StatusDistribution,
    pub monthly_breakdown: BTreeMap<String, i64>,
    pub total_controls: usize,
}

pub fn summarize(costs: &[Cost], controls: &[Control], month: u32, year: i32) -> RevenueReport {
    RevenueReport {
        month,
        year,
        monthly: monthly_revenue(costs, month, year),
        yearly: yearly_revenue(costs, year),
        total: total_revenue(costs),
        by_type: revenue_by_control_type(controls),
        by_status: status_distribution(controls),
        monthly_breakdown: monthly_breakdown(costs),
        total_controls: controls.len(),
    }
}
