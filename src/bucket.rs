use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CivilDate, DAYS_PER_WEEK, MONTHS_PER_QUARTER, ParseError, prelude::*};

/// Bucket size used to subdivide a date range for time-series display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Granularity {
    #[display(fmt = "daily")]
    Daily,
    #[display(fmt = "weekly")]
    Weekly,
    #[display(fmt = "monthly")]
    Monthly,
    #[display(fmt = "quarterly")]
    Quarterly,
    #[display(fmt = "yearly")]
    Yearly,
}

impl Granularity {
    /// Every supported granularity, coarsest last
    pub const ALL: [Self; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
    ];
}

impl FromStr for Granularity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(ParseError::InvalidGranularity(other.to_owned())),
        }
    }
}

impl Serialize for Granularity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One labeled sub-period of a resolved range, used as a chart axis tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// First day of the sub-period (for daily buckets, the day itself)
    pub anchor: CivilDate,
    /// Compact axis-tick label, e.g. "Jan 05", "W03", "Q1 24"
    pub short_label: String,
    /// Tooltip-length label, e.g. "Jan 05, 2024", "Week of Jan 15, 2024"
    pub full_label: String,
}

/// Lazy walk over the buckets of a date interval.
///
/// Finite, strictly ascending by anchor, and restartable (`Clone` before
/// iterating to keep a rewound copy). An inverted interval produces an
/// empty walk rather than an error, so "no data" stays a renderable state.
#[derive(Debug, Clone)]
pub struct Buckets {
    next_anchor: Option<CivilDate>,
    end: CivilDate,
    granularity: Granularity,
}

impl Buckets {
    /// Starts a walk over every period of `granularity` touching the
    /// inclusive interval `[start, end]`.
    ///
    /// The first anchor is the period start containing `start` (for daily
    /// buckets, `start` itself), so a range beginning mid-week or
    /// mid-quarter still reports the full containing period.
    pub fn over(start: CivilDate, end: CivilDate, granularity: Granularity) -> Self {
        let first = match granularity {
            Granularity::Daily => start,
            Granularity::Weekly => start.start_of_week(),
            Granularity::Monthly => start.start_of_month(),
            Granularity::Quarterly => start.start_of_quarter(),
            Granularity::Yearly => start.start_of_year(),
        };
        Self {
            next_anchor: (start <= end).then_some(first),
            end,
            granularity,
        }
    }

    fn advance(&self, anchor: CivilDate) -> CivilDate {
        match self.granularity {
            Granularity::Daily => anchor.saturating_add_days(1),
            Granularity::Weekly => anchor.saturating_add_days(DAYS_PER_WEEK),
            Granularity::Monthly => anchor.shift_months(1),
            Granularity::Quarterly => anchor.shift_months(i32::from(MONTHS_PER_QUARTER)),
            Granularity::Yearly => anchor.shift_years(1),
        }
    }

    fn label(&self, anchor: CivilDate) -> (String, String) {
        let month = anchor.month_typed();
        match self.granularity {
            Granularity::Daily => (
                format!("{} {:02}", month.short_name(), anchor.day()),
                format!("{} {:02}, {}", month.short_name(), anchor.day(), anchor.year()),
            ),
            Granularity::Weekly => (
                format!("W{:02}", anchor.iso_week()),
                format!(
                    "Week of {} {:02}, {}",
                    month.short_name(),
                    anchor.day(),
                    anchor.year()
                ),
            ),
            Granularity::Monthly => (
                format!("{} {:02}", month.short_name(), anchor.year() % 100),
                format!("{} {}", month.full_name(), anchor.year()),
            ),
            Granularity::Quarterly => (
                format!("Q{} {:02}", anchor.quarter(), anchor.year() % 100),
                format!("Q{} {}", anchor.quarter(), anchor.year()),
            ),
            Granularity::Yearly => {
                let label = format!("{:04}", anchor.year());
                (label.clone(), label)
            }
        }
    }
}

impl Iterator for Buckets {
    type Item = Bucket;

    fn next(&mut self) -> Option<Self::Item> {
        let anchor = self.next_anchor?;
        let following = self.advance(anchor);
        // The strict-progress check guards against stalling once the walk
        // saturates at the last representable day.
        self.next_anchor = (following > anchor && following <= self.end).then_some(following);

        let (short_label, full_label) = self.label(anchor);
        Some(Bucket {
            anchor,
            short_label,
            full_label,
        })
    }
}

impl std::iter::FusedIterator for Buckets {}
