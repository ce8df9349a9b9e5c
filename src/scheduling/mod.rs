//! Scheduling & revenue engine: pure logic over rows fetched by the adapter.

pub mod calendar;
pub mod export;
pub mod recurrence;
pub mod revenue;
pub mod status;

pub use calendar::{build_calendar, CalendarBoard, CalendarEvent, CalendarSettings, EventSource};
pub use recurrence::{DateWindow, Frequency, Occurrences, RecurrenceRule};
pub use revenue::{summarize, RevenueReport, StatusDistribution};
pub use status::ControlStatus;
