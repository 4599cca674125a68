//! Wall clock queries exposed to the guest.

use std::{str::FromStr, time::Duration};

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

/// Clock the guest asks about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    /// Game clock. Follows the local wall clock.
    #[default]
    Ingame,
    /// Coordinated universal time.
    Utc,
    /// Local wall clock.
    Local,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ingame" => Ok(Locale::Ingame),
            "utc" => Ok(Locale::Utc),
            "local" => Ok(Locale::Local),
            other => Err(format!("Unsupported locale '{}'", other)),
        }
    }
}

/// Time of day as fractional hours.
pub fn hours<T: Timelike>(time: &T) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0 + time.second() as f64 / 3600.0
}

/// Current time of day in hours, `0.0..24.0`.
pub fn time(locale: Locale) -> f64 {
    match locale {
        Locale::Utc => hours(&Utc::now()),
        Locale::Ingame | Locale::Local => hours(&Local::now()),
    }
}

/// Milliseconds since the epoch of the chosen clock.
///
/// The game clock counts from the start of the current year.
pub fn epoch(locale: Locale) -> i64 {
    match locale {
        Locale::Utc => Utc::now().timestamp_millis(),
        Locale::Local => local_millis(&Local::now().naive_local()),
        Locale::Ingame => ingame_millis(&Local::now().naive_local()),
    }
}

/// Days since the epoch, or day of the year for the game clock.
pub fn day(locale: Locale) -> i64 {
    match locale {
        Locale::Utc => Utc::now().timestamp() / 86_400,
        Locale::Local => local_millis(&Local::now().naive_local()) / 86_400_000,
        Locale::Ingame => Local::now().ordinal0().into(),
    }
}

/// Milliseconds since the epoch for a wall clock reading, ignoring its offset.
pub fn local_millis(now: &NaiveDateTime) -> i64 {
    Utc.from_utc_datetime(now).timestamp_millis()
}

/// Game clock milliseconds for a wall clock reading.
pub fn ingame_millis(now: &NaiveDateTime) -> i64 {
    i64::from(now.ordinal0()) * 86_400_000 + (hours(now) * 3_600_000.0).round() as i64
}

/// Delay from `now` until the next time the wall clock shows `hour`.
///
/// An alarm for the current instant is set a full day ahead.
pub fn until_time_of_day(hour: f64, now: &NaiveTime) -> Duration {
    let mut ahead = hour - hours(now);
    if ahead <= 0.0 {
        ahead += 24.0;
    }
    Duration::from_secs_f64(ahead * 3600.0)
}
