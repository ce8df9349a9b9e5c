use std::env;
use std::str::FromStr;

use anyhow::{bail, Context};
use chrono::{Duration, NaiveTime};

use crate::scheduling::calendar::CalendarSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub control_duration_minutes: i64,
    pub occurrence_time: NaiveTime,
    pub calendar_max_window_days: i64,
    pub dev_access_token: Option<String>,
}

/// `default` when `raw` is unset or blank; a malformed value is an error.
fn parse_or<T>(key: &str, raw: Option<&str>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("{key} is not a valid number: {v:?}")),
        None => Ok(default),
    }
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, env::var(key).ok().as_deref(), default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match env::var("STORE_BACKEND").as_deref().map(str::trim) {
            Ok("memory") => StoreBackend::Memory,
            Ok("postgres") | Ok("") | Err(_) => StoreBackend::Postgres,
            Ok(other) => bail!("STORE_BACKEND must be postgres or memory, got {other:?}"),
        };

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());
        if backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required when STORE_BACKEND=postgres");
        }

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let occurrence_time = match env::var("OCCURRENCE_TIME") {
            Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .with_context(|| format!("OCCURRENCE_TIME must be HH:MM, got {raw:?}"))?,
            Err(_) => CalendarSettings::default().occurrence_time,
        };

        let control_duration_minutes = parsed("CONTROL_DURATION_MINUTES", 60_i64)?;
        if control_duration_minutes <= 0 {
            bail!("CONTROL_DURATION_MINUTES must be positive");
        }

        let database_max_connections = parsed("DATABASE_MAX_CONNECTIONS", 5_u32)?;
        if database_max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be positive");
        }

        let calendar_max_window_days = parsed("CALENDAR_MAX_WINDOW_DAYS", 366_i64)?;
        if calendar_max_window_days <= 0 {
            bail!("CALENDAR_MAX_WINDOW_DAYS must be positive");
        }

        Ok(Self {
            backend,
            database_url,
            database_max_connections,
            bind_addr,
            control_duration_minutes,
            occurrence_time,
            calendar_max_window_days,
            dev_access_token: env::var("DEV_ACCESS_TOKEN").ok().filter(|s| !s.is_empty()),
        })
    }

    pub fn calendar_settings(&self) -> CalendarSettings {
        CalendarSettings {
            duration: Duration::minutes(self.control_duration_minutes),
            occurrence_time: self.occurrence_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_blank_falls_back_to_default() {
        assert_eq!(parse_or("CALENDAR_MAX_WINDOW_DAYS", None, 366_i64).unwrap(), 366);
        assert_eq!(parse_or("CALENDAR_MAX_WINDOW_DAYS", Some("  "), 366_i64).unwrap(), 366);
        assert_eq!(parse_or("DATABASE_MAX_CONNECTIONS", Some(" 12 "), 5_u32).unwrap(), 12);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = parse_or("DATABASE_MAX_CONNECTIONS", Some("ten"), 5_u32).unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
        assert!(parse_or("CALENDAR_MAX_WINDOW_DAYS", Some("-3x"), 366_i64).is_err());
        assert!(parse_or("DATABASE_MAX_CONNECTIONS", Some("-1"), 5_u32).is_err());
    }
}
