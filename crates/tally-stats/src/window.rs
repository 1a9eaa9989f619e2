//! Time windows and their lower bounds.
//!
//! A [`Window`] names a slice of history. [`resolve`] turns it into the
//! inclusive lower bound used by ledger queries, computed on the local
//! calendar of the process.

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tally_common::TallyError;
use tally_i18n::{Language, MessageKey, Messages};

/// Named slice of history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Since local midnight
    Today,
    /// Since local midnight of the most recent Monday
    Week,
    /// Everything
    #[default]
    Overall,
}

impl Window {
    /// Every window, narrowest first
    pub const ALL: [Self; 3] = [Self::Today, Self::Week, Self::Overall];

    /// Command-line name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Overall => "overall",
        }
    }

    /// Localized label
    pub fn label(self, language: Language) -> String {
        let key = match self {
            Self::Today => MessageKey::WindowToday,
            Self::Week => MessageKey::WindowWeek,
            Self::Overall => MessageKey::WindowOverall,
        };
        Messages::get(key, language)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Window {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|window| window.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TallyError::InvalidWindow(s.to_string()))
    }
}

/// Lower bound of `window` on the local calendar, `None` for [`Window::Overall`]
pub fn resolve(window: Window) -> Option<DateTime<Utc>> {
    resolve_at(window, &Local::now())
}

/// Lower bound of `window` relative to `now`, on `now`'s calendar
pub fn resolve_at<Tz: TimeZone>(window: Window, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    let day = match window {
        Window::Overall => return None,
        Window::Today => today,
        Window::Week => today - Duration::days(i64::from(today.weekday().num_days_from_monday())),
    };

    Some(start_of_day(&now.timezone(), day))
}

/// First instant of `day` in `tz`
///
/// Ambiguous midnights resolve to the earlier instant. Midnights skipped by
/// a DST gap resolve to the first valid instant after them.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);

    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(at) => at.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            // Gaps are at most a few hours; step forward a minute at a time.
            (1..=24 * 60)
                .map(|minutes| midnight + Duration::minutes(minutes))
                .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
                .map_or_else(
                    || Utc.from_utc_datetime(&midnight),
                    |at| at.with_timezone(&Utc),
                )
        }
    }
}
