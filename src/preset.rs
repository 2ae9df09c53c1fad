use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CivilDate, DAYS_PER_WEEK, DateRange, DECEMBER, JANUARY, JULY, JUNE, MONTHS_PER_QUARTER};

/// A named, parameterless rule mapping a reference day to a date range.
///
/// Presets are what the UI persists (never their resolved bounds), so
/// "Last 7 Days" reopened tomorrow reflects tomorrow. Resolution is pure:
/// the same preset and reference day always produce the same range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Today,
    Yesterday,
    Last7Days,
    Last14Days,
    Last30Days,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisQuarter,
    LastQuarter,
    ThisYear,
    LastYear,
    /// Last completed month (completed-period picker family)
    PastMonth,
    /// Last completed quarter (completed-period picker family)
    PastQuarter,
    /// Last completed half year: Jan-Jun once July starts, otherwise
    /// Jul-Dec of the previous year
    PastHalfYear,
}

impl Preset {
    /// Fallback used for unknown names and empty persisted state
    pub const DEFAULT: Self = Self::Last30Days;

    /// Every preset, in picker display order
    pub const ALL: [Self; 16] = [
        Self::Today,
        Self::Yesterday,
        Self::Last7Days,
        Self::Last14Days,
        Self::Last30Days,
        Self::ThisWeek,
        Self::LastWeek,
        Self::ThisMonth,
        Self::LastMonth,
        Self::ThisQuarter,
        Self::LastQuarter,
        Self::ThisYear,
        Self::LastYear,
        Self::PastMonth,
        Self::PastQuarter,
        Self::PastHalfYear,
    ];

    /// Stable identifier, the only form the UI should persist
    pub const fn name(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Last7Days => "last_7_days",
            Self::Last14Days => "last_14_days",
            Self::Last30Days => "last_30_days",
            Self::ThisWeek => "this_week",
            Self::LastWeek => "last_week",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::ThisQuarter => "this_quarter",
            Self::LastQuarter => "last_quarter",
            Self::ThisYear => "this_year",
            Self::LastYear => "last_year",
            Self::PastMonth => "past_month",
            Self::PastQuarter => "past_quarter",
            Self::PastHalfYear => "past_half_year",
        }
    }

    /// Human-readable picker label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::Last7Days => "Last 7 Days",
            Self::Last14Days => "Last 14 Days",
            Self::Last30Days => "Last 30 Days",
            Self::ThisWeek => "This Week",
            Self::LastWeek => "Last Week",
            Self::ThisMonth => "This Month",
            Self::LastMonth => "Last Month",
            Self::ThisQuarter => "This Quarter",
            Self::LastQuarter => "Last Quarter",
            Self::ThisYear => "This Year",
            Self::LastYear => "Last Year",
            Self::PastMonth => "Past Month",
            Self::PastQuarter => "Past Quarter",
            Self::PastHalfYear => "Past Half Year",
        }
    }

    /// Looks a preset up by its persisted name. Unknown names fall back
    /// to [`Preset::DEFAULT`] rather than failing, so stale persisted
    /// state never breaks a dashboard load.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == name.trim())
            .unwrap_or(Self::DEFAULT)
    }

    /// Resolves this preset against a reference day (the caller's
    /// "today", typically [`CivilDate::today_utc`] at the outermost call
    /// site). Pure and idempotent: no clock access happens here.
    pub fn resolve(self, reference: CivilDate) -> DateRange {
        match self {
            Self::Today => DateRange::from_ordered(reference, reference),
            Self::Yesterday => {
                let yesterday = reference.saturating_add_days(-1);
                DateRange::from_ordered(yesterday, yesterday)
            }
            Self::Last7Days => trailing_days(reference, 7),
            Self::Last14Days => trailing_days(reference, 14),
            Self::Last30Days => trailing_days(reference, 30),
            Self::ThisWeek => {
                DateRange::from_ordered(reference.start_of_week(), reference.end_of_week())
            }
            Self::LastWeek => {
                let in_last_week = reference.saturating_add_days(-DAYS_PER_WEEK);
                DateRange::from_ordered(in_last_week.start_of_week(), in_last_week.end_of_week())
            }
            Self::ThisMonth => {
                DateRange::from_ordered(reference.start_of_month(), reference.end_of_month())
            }
            Self::LastMonth | Self::PastMonth => {
                let in_last_month = reference.shift_months(-1);
                DateRange::from_ordered(
                    in_last_month.start_of_month(),
                    in_last_month.end_of_month(),
                )
            }
            Self::ThisQuarter => {
                DateRange::from_ordered(reference.start_of_quarter(), reference.end_of_quarter())
            }
            Self::LastQuarter | Self::PastQuarter => {
                let in_last_quarter = reference.shift_months(-i32::from(MONTHS_PER_QUARTER));
                DateRange::from_ordered(
                    in_last_quarter.start_of_quarter(),
                    in_last_quarter.end_of_quarter(),
                )
            }
            Self::ThisYear => {
                DateRange::from_ordered(reference.start_of_year(), reference.end_of_year())
            }
            Self::LastYear => {
                let in_last_year = reference.shift_years(-1);
                DateRange::from_ordered(in_last_year.start_of_year(), in_last_year.end_of_year())
            }
            Self::PastHalfYear => {
                if reference.month() >= JULY {
                    let year = reference.year();
                    DateRange::from_ordered(
                        CivilDate::from_parts_clamped(year, JANUARY, 1),
                        CivilDate::from_parts_clamped(year, JUNE, 30),
                    )
                } else {
                    let year = reference.shift_years(-1).year();
                    DateRange::from_ordered(
                        CivilDate::from_parts_clamped(year, JULY, 1),
                        CivilDate::from_parts_clamped(year, DECEMBER, 31),
                    )
                }
            }
        }
    }
}

/// The inclusive window of the trailing `days` days ending at `reference`
fn trailing_days(reference: CivilDate, days: i64) -> DateRange {
    DateRange::from_ordered(reference.saturating_add_days(-(days - 1)), reference)
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Preset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Persisted names from older builds resolve to the default rather
        // than failing deserialization.
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_name(&s))
    }
}
