use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;

/// Lifecycle of a control. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

/// Badge colour used by every status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeColor {
    Blue,
    Green,
    Red,
    Yellow,
}

impl ControlStatus {
    pub const ALL: [ControlStatus; 4] = [
        ControlStatus::Scheduled,
        ControlStatus::Completed,
        ControlStatus::Cancelled,
        ControlStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlStatus::Scheduled => "scheduled",
            ControlStatus::Completed => "completed",
            ControlStatus::Cancelled => "cancelled",
            ControlStatus::NoShow => "no_show",
        }
    }

    /// Lenient parse used when reading rows back; unknown values are `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(ControlStatus::Scheduled),
            "completed" => Some(ControlStatus::Completed),
            "cancelled" => Some(ControlStatus::Cancelled),
            "no_show" => Some(ControlStatus::NoShow),
            _ => None,
        }
    }

    pub fn badge(&self) -> BadgeColor {
        match self {
            ControlStatus::Scheduled => BadgeColor::Blue,
            ControlStatus::Completed => BadgeColor::Green,
            ControlStatus::Cancelled => BadgeColor::Red,
            ControlStatus::NoShow => BadgeColor::Yellow,
        }
    }
}

/// Badge for a raw stored status; unrecognised values get the default.
pub fn badge_for(raw: &str) -> BadgeColor {
    ControlStatus::parse(raw)
        .map(|s| s.badge())
        .unwrap_or(BadgeColor::Blue)
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlStatus {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlStatus::parse(s).ok_or_else(|| {
            SchedulingError::validation(format!(
                "status must be one of scheduled, completed, cancelled, no_show (got {s:?})"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_known_values() {
        for s in ControlStatus::ALL {
            assert_eq!(ControlStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(ControlStatus::parse("No_Show"), Some(ControlStatus::NoShow));
        assert_eq!(ControlStatus::parse("rescheduled"), None);
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("postponed".parse::<ControlStatus>().is_err());
        assert_eq!("completed".parse::<ControlStatus>().unwrap(), ControlStatus::Completed);
    }

    #[test]
    fn unknown_status_falls_back_to_default_badge() {
        assert_eq!(badge_for("completed"), BadgeColor::Green);
        assert_eq!(badge_for("cancelled"), BadgeColor::Red);
        assert_eq!(badge_for("no_show"), BadgeColor::Yellow);
        assert_eq!(badge_for("whatever"), BadgeColor::Blue);
    }
}
