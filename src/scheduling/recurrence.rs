//! Expansion of recurrence rules into concrete occurrence dates.
//!
//! Occurrence `n` is always computed from the rule's start date
//! (`start + n * step`), never from the previous occurrence. This keeps
//! month-end rules stable: a rule starting Jan 31 lands on Feb 29 (or 28) and
//! returns to Mar 31 afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SchedulingError, SchedulingResult};
use crate::models::ControlSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(u64),
    Months(u32),
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }

    fn step(&self) -> Step {
        match self {
            Frequency::Daily => Step::Days(1),
            Frequency::Weekly => Step::Days(7),
            Frequency::Monthly => Step::Months(1),
            Frequency::Quarterly => Step::Months(3),
            Frequency::Yearly => Step::Months(12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(SchedulingError::validation(format!(
                "unrecognized frequency {other:?}"
            ))),
        }
    }
}

/// Half-open display window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date < self.to
    }
}

/// A validated recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub frequency: Frequency,
    pub active: bool,
}

impl RecurrenceRule {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>, frequency: Frequency) -> Self {
        Self {
            start,
            end,
            frequency,
            active: true,
        }
    }

    pub fn from_schedule(schedule: &ControlSchedule) -> SchedulingResult<Self> {
        Ok(Self {
            start: schedule.start_date,
            end: schedule.end_date,
            frequency: schedule.frequency.parse()?,
            active: schedule.is_active,
        })
    }

    /// The `n`th occurrence ignoring windows and end dates.
    pub fn nth(&self, n: u32) -> Option<NaiveDate> {
        match self.frequency.step() {
            Step::Days(k) => self.start.checked_add_days(Days::new(k.checked_mul(n as u64)?)),
            Step::Months(m) => self.start.checked_add_months(Months::new(m.checked_mul(n)?)),
        }
    }

    /// Index of an occurrence on or before `date` such that every earlier
    /// index falls strictly before `date`.
    fn index_near(&self, date: NaiveDate) -> u32 {
        if date <= self.start {
            return 0;
        }
        let n = match self.frequency.step() {
            Step::Days(k) => (date - self.start).num_days() as u64 / k,
            Step::Months(m) => {
                let months = (date.year() - self.start.year()) as i64 * 12
                    + date.month() as i64
                    - self.start.month() as i64;
                months.max(0) as u64 / m as u64
            }
        };
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    /// Occurrences inside `window`, in ascending order.
    pub fn occurrences(&self, window: DateWindow) -> Occurrences {
        let lower = window.from.max(self.start);
        Occurrences {
            rule: *self,
            lower,
            upper: window.to,
            next: self.index_near(lower),
            done: !self.active || lower >= window.to,
        }
    }

    /// First occurrence on or after `date`, if the rule has not ended.
    pub fn next_on_or_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        if !self.active {
            return None;
        }
        let upper = self.end.and_then(|e| e.succ_opt()).unwrap_or(NaiveDate::MAX);
        self.occurrences(DateWindow::new(date, upper)).next()
    }
}

/// Lazy, finite iterator over a rule's occurrences. A clone is an
/// independent cursor at the same position.
#[derive(Debug, Clone)]
pub struct Occurrences {
    rule: RecurrenceRule,
    lower: NaiveDate,
    upper: NaiveDate,
    next: u32,
    done: bool,
}

impl Occurrences {
    /// Attach a time of day to every occurrence.
    pub fn at(self, time: NaiveTime) -> impl Iterator<Item = DateTime<Utc>> + Clone {
        self.map(move |d| d.and_time(time).and_utc())
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while !self.done {
            let Some(date) = self.rule.nth(self.next) else {
                self.done = true;
                break;
            };
            if date >= self.upper || self.rule.end.is_some_and(|end| date > end) {
                self.done = true;
                break;
            }
            self.next = match self.next.checked_add(1) {
                Some(n) => n,
                None => {
                    self.done = true;
                    u32::MAX
                }
            };
            if date >= self.lower {
                return Some(date);
            }
        }
        None
    }
}

/// Expand a stored schedule. Unknown frequencies are a validation error even
/// for inactive schedules.
pub fn expand_schedule(schedule: &ControlSchedule, window: DateWindow) -> SchedulingResult<Occurrences> {
    Ok(RecurrenceRule::from_schedule(schedule)?.occurrences(window))
}

/// Total occurrences across schedules inside `window`; used for the
/// "upcoming controls" counters.
pub fn count_occurrences(schedules: &[ControlSchedule], window: DateWindow) -> SchedulingResult<usize> {
    let mut total = 0;
    for s in schedules {
        total += expand_schedule(s, window)?.count();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_steps_one_day() {
        let rule = RecurrenceRule::new(d(2024, 2, 27), None, Frequency::Daily);
        let got: Vec<_> = rule.occurrences(DateWindow::new(d(2024, 2, 1), d(2024, 3, 2))).collect();
        assert_eq!(got, vec![d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]);
    }

    #[test]
    fn quarterly_and_yearly_steps() {
        let q = RecurrenceRule::new(d(2024, 1, 15), None, Frequency::Quarterly);
        let got: Vec<_> = q.occurrences(DateWindow::new(d(2024, 1, 1), d(2025, 1, 1))).collect();
        assert_eq!(got, vec![d(2024, 1, 15), d(2024, 4, 15), d(2024, 7, 15), d(2024, 10, 15)]);

        let y = RecurrenceRule::new(d(2024, 2, 29), None, Frequency::Yearly);
        let got: Vec<_> = y.occurrences(DateWindow::new(d(2024, 1, 1), d(2029, 1, 1))).collect();
        assert_eq!(
            got,
            vec![d(2024, 2, 29), d(2025, 2, 28), d(2026, 2, 28), d(2027, 2, 28), d(2028, 2, 29)]
        );
    }

    #[test]
    fn window_far_after_start_skips_ahead() {
        let rule = RecurrenceRule::new(d(2000, 1, 3), None, Frequency::Weekly);
        let mut it = rule.occurrences(DateWindow::new(d(2024, 1, 1), d(2024, 1, 15)));
        assert_eq!(it.next(), Some(d(2024, 1, 1)));
        assert_eq!(it.next(), Some(d(2024, 1, 8)));
        assert_eq!(it.next(), None);
        assert!(rule.index_near(d(2024, 1, 1)) > 1000);
    }

    #[test]
    fn end_date_is_inclusive() {
        let rule = RecurrenceRule::new(d(2024, 1, 1), Some(d(2024, 1, 15)), Frequency::Weekly);
        let got: Vec<_> = rule.occurrences(DateWindow::new(d(2024, 1, 1), d(2024, 12, 31))).collect();
        assert_eq!(got, vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15)]);
    }

    #[test]
    fn inactive_or_late_start_is_empty() {
        let mut rule = RecurrenceRule::new(d(2024, 1, 1), None, Frequency::Daily);
        rule.active = false;
        assert_eq!(rule.occurrences(DateWindow::new(d(2024, 1, 1), d(2024, 2, 1))).count(), 0);

        let late = RecurrenceRule::new(d(2024, 3, 1), None, Frequency::Daily);
        assert_eq!(late.occurrences(DateWindow::new(d(2024, 1, 1), d(2024, 2, 1))).count(), 0);
    }

    #[test]
    fn clone_gives_independent_cursor() {
        let rule = RecurrenceRule::new(d(2024, 1, 1), None, Frequency::Daily);
        let mut a = rule.occurrences(DateWindow::new(d(2024, 1, 1), d(2024, 1, 4)));
        a.next();
        let b = a.clone();
        assert_eq!(a.count(), 2);
        assert_eq!(b.count(), 2);
    }

    #[test]
    fn next_on_or_after_respects_end() {
        let rule = RecurrenceRule::new(d(2024, 1, 31), Some(d(2024, 3, 31)), Frequency::Monthly);
        assert_eq!(rule.next_on_or_after(d(2024, 2, 1)), Some(d(2024, 2, 29)));
        assert_eq!(rule.next_on_or_after(d(2024, 3, 31)), Some(d(2024, 3, 31)));
        assert_eq!(rule.next_on_or_after(d(2024, 4, 1)), None);
    }

    #[test]
    fn frequency_parse() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!(matches!(
            "fortnightly".parse::<Frequency>(),
            Err(SchedulingError::Validation(_))
        ));
    }
}
