use std::{cmp::Ordering, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Bucket, Buckets, CivilDate, DISPLAY_SEPARATOR, Granularity, ParseError, RANGE_SEPARATOR,
    prelude::*,
};

/// An inclusive range of calendar days.
/// The start date must be less than or equal to the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{start}/{end}")]
pub struct DateRange {
    start: CivilDate,
    end:   CivilDate,
}

/// Error type for range construction and validation.
///
/// Each variant carries the exact message a picker shows inline next to
/// its date inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Start date is after end date.
    #[error("Start date must be before end date")]
    StartAfterEnd { start: CivilDate, end: CivilDate },

    /// Range spans more days than the caller's data source allows.
    #[error("Date range cannot exceed {max_days} days")]
    TooLong { max_days: i64, actual_days: i64 },

    /// Start date lies after the reference date.
    #[error("Start date cannot be in the future")]
    StartInFuture {
        start: CivilDate,
        reference: CivilDate,
    },

    /// A supplied date could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(#[from] ParseError),

    /// Invalid range format.
    #[error("Invalid range format: {0}")]
    InvalidFormat(String),
}

/// How a comparison window is derived from a primary range.
///
/// "No comparison" is expressed as `Option<Comparison>` at the call
/// boundary, see [`comparison_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Comparison {
    /// The immediately preceding window of equal length.
    #[display(fmt = "previous_period")]
    PreviousPeriod,
    /// The same window one calendar year earlier.
    #[display(fmt = "year_over_year")]
    YearOverYear,
}

impl FromStr for Comparison {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "previous_period" => Ok(Self::PreviousPeriod),
            "year_over_year" => Ok(Self::YearOverYear),
            other => Err(ParseError::InvalidComparison(other.to_owned())),
        }
    }
}

/// Derives the comparison window for `primary`, or `None` when no
/// comparison was requested.
pub fn comparison_range(primary: &DateRange, comparison: Option<Comparison>) -> Option<DateRange> {
    comparison.map(|kind| primary.comparison(kind))
}

impl DateRange {
    /// Builds a range from bounds the caller has already ordered,
    /// swapping them if they arrive inverted.
    pub(crate) fn from_ordered(start: CivilDate, end: CivilDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end:   start,
            }
        }
    }

    /// Creates a new date range with validation.
    ///
    /// # Errors
    /// Returns `RangeError::StartAfterEnd` if start > end.
    pub fn new(start: CivilDate, end: CivilDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range after checking every custom-picker rule: bound
    /// order, maximum span, and no start after `reference` (the caller's
    /// "today").
    ///
    /// # Errors
    /// Returns the first failing rule as a `RangeError` whose message
    /// identifies it.
    pub fn validated(
        start: CivilDate,
        end: CivilDate,
        max_span_days: i64,
        reference: CivilDate,
    ) -> Result<Self, RangeError> {
        let range = Self::new(start, end)?;
        if range.span_days() > max_span_days {
            return Err(RangeError::TooLong {
                max_days: max_span_days,
                actual_days: range.span_days(),
            });
        }
        if start > reference {
            return Err(RangeError::StartInFuture { start, reference });
        }
        Ok(range)
    }

    /// Like [`DateRange::validated`], but from raw `YYYY-MM-DD` input
    /// strings, adding the malformed-date rule. This is the entry point
    /// for free-form picker input.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidDate` for unparseable input, otherwise
    /// whatever [`DateRange::validated`] returns.
    pub fn parse_validated(
        start: &str,
        end: &str,
        max_span_days: i64,
        reference: CivilDate,
    ) -> Result<Self, RangeError> {
        let start = start.parse::<CivilDate>()?;
        let end = end.parse::<CivilDate>()?;
        Self::validated(start, end, max_span_days, reference)
    }

    /// The inclusive window `[reference - days, reference]` a picker may
    /// offer for custom selection.
    pub fn lookback_window(reference: CivilDate, days: u32) -> Self {
        Self {
            start: reference.saturating_add_days(-i64::from(days)),
            end:   reference,
        }
    }

    /// Returns the start date of the range
    pub const fn start(&self) -> CivilDate {
        self.start
    }

    /// Returns the end date of the range
    pub const fn end(&self) -> CivilDate {
        self.end
    }

    /// Returns both start and end dates as a tuple
    pub const fn dates(&self) -> (CivilDate, CivilDate) {
        (self.start, self.end)
    }

    /// Whole days from start to end (0 for a single-day range)
    pub const fn span_days(&self) -> i64 {
        self.end.days_since(self.start)
    }

    /// Number of calendar days the range covers, inclusive
    pub const fn day_count(&self) -> i64 {
        self.span_days() + 1
    }

    /// Checks if the range contains a given date
    pub fn contains(&self, date: CivilDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Checks if this range shares any day with another range
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Derives the comparison window for trend deltas.
    ///
    /// `PreviousPeriod` shifts both bounds back by the span plus one day,
    /// producing the immediately preceding window of equal length that
    /// ends the day before this range starts. `YearOverYear` shifts both
    /// bounds back one calendar year (field-wise, so Feb 29 compares
    /// against Feb 28).
    pub fn comparison(&self, kind: Comparison) -> Self {
        match kind {
            Comparison::PreviousPeriod => {
                let shift = -(self.span_days() + 1);
                Self {
                    start: self.start.saturating_add_days(shift),
                    end:   self.end.saturating_add_days(shift),
                }
            }
            Comparison::YearOverYear => Self {
                start: self.start.shift_years(-1),
                end:   self.end.shift_years(-1),
            },
        }
    }

    /// Subdivides the range into labeled buckets of the given granularity
    pub fn buckets(&self, granularity: Granularity) -> Buckets {
        Buckets::over(self.start, self.end, granularity)
    }

    /// Eagerly collected form of [`DateRange::buckets`]
    pub fn bucket_vec(&self, granularity: Granularity) -> Vec<Bucket> {
        self.buckets(granularity).collect()
    }

    /// Human-readable label, e.g. "Jan 05, 2024 - Feb 01, 2024", or a
    /// single date when the range covers one day
    pub fn display_label(&self) -> String {
        let start = display_date(self.start);
        if self.start == self.end {
            return start;
        }
        let end = display_date(self.end);
        format!("{start}{DISPLAY_SEPARATOR}{end}")
    }
}

/// Formats one date the way range labels show it ("Jan 05, 2024")
fn display_date(date: CivilDate) -> String {
    format!(
        "{} {:02}, {}",
        date.month_typed().short_name(),
        date.day(),
        date.year()
    )
}

impl FromStr for DateRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // ISO 8601 extended format: use RANGE_SEPARATOR to separate start/end
        let separator_count = trimmed.matches(RANGE_SEPARATOR).count();

        match separator_count {
            0 => Err(RangeError::InvalidFormat(format!(
                "No range separator found (expected '{RANGE_SEPARATOR}'): {s}"
            ))),
            1 => {
                let pos = trimmed.find(RANGE_SEPARATOR).ok_or_else(|| {
                    RangeError::InvalidFormat(format!(
                        "Separator '{RANGE_SEPARATOR}' not found despite count == 1"
                    ))
                })?;
                let start_str = trimmed[..pos].trim();
                let end_str = trimmed[pos + 1..].trim();

                let start = start_str.parse::<CivilDate>()?;
                let end = end_str.parse::<CivilDate>()?;

                Self::new(start, end)
            },
            _ => Err(RangeError::InvalidFormat(format!(
                "Too many '{RANGE_SEPARATOR}' separators: expected 1, found {separator_count}"
            ))),
        }
    }
}

impl PartialOrd for DateRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateRange {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare start dates first, then end dates
        match self.start.cmp(&other.start) {
            Ordering::Equal => self.end.cmp(&other.end),
            ord => ord,
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, range};

    #[test]
    fn test_new_range_cases() {
        struct TestCase {
            start:          (u16, u8, u8),
            end:            (u16, u8, u8),
            should_succeed: bool,
            description:    &'static str,
        }

        let cases = [
            TestCase {
                start:          (2024, 1, 1),
                end:            (2024, 6, 30),
                should_succeed: true,
                description:    "valid range (start < end)",
            },
            TestCase {
                start:          (2024, 6, 30),
                end:            (2024, 1, 1),
                should_succeed: false,
                description:    "invalid range (start > end)",
            },
            TestCase {
                start:          (2024, 3, 15),
                end:            (2024, 3, 15),
                should_succeed: true,
                description:    "single day (start == end)",
            },
        ];

        for case in &cases {
            let (sy, sm, sd) = case.start;
            let (ey, em, ed) = case.end;
            let result = DateRange::new(date(sy, sm, sd), date(ey, em, ed));

            if case.should_succeed {
                assert!(result.is_ok(), "Expected success for: {}", case.description);
            } else {
                assert!(result.is_err(), "Expected failure for: {}", case.description);
            }
        }
    }

    #[test]
    fn test_accessors() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 20);
        let r = DateRange::new(start, end).expect("failed to construct range for accessor test");

        assert_eq!(r.start(), start);
        assert_eq!(r.end(), end);
        assert_eq!(r.dates(), (start, end));
    }

    #[test]
    fn test_span_and_day_count() {
        let r = range(2024, 1, 1, 2024, 1, 20);
        assert_eq!(r.span_days(), 19);
        assert_eq!(r.day_count(), 20);

        let single = range(2024, 1, 1, 2024, 1, 1);
        assert_eq!(single.span_days(), 0);
        assert_eq!(single.day_count(), 1);

        // Leap day counts
        let feb = range(2024, 2, 1, 2024, 3, 1);
        assert_eq!(feb.span_days(), 29);
    }

    #[test]
    fn test_contains() {
        let r = range(2024, 1, 10, 2024, 1, 20);

        assert!(r.contains(date(2024, 1, 10)));
        assert!(r.contains(date(2024, 1, 15)));
        assert!(r.contains(date(2024, 1, 20)));
        assert!(!r.contains(date(2024, 1, 9)));
        assert!(!r.contains(date(2024, 1, 21)));
    }

    #[test]
    fn test_overlaps() {
        let r1 = range(2024, 1, 1, 2024, 1, 31);
        let r2 = range(2024, 1, 31, 2024, 2, 15);
        let r3 = range(2024, 2, 16, 2024, 2, 29);

        assert!(r1.overlaps(&r2), "shared boundary day overlaps");
        assert!(r2.overlaps(&r1));
        assert!(!r1.overlaps(&r3));
        assert!(!r3.overlaps(&r1));
    }

    #[test]
    fn test_validated_accepts_in_bounds_range() {
        let reference = date(2024, 6, 1);
        let result = DateRange::validated(
            date(2024, 1, 1),
            date(2024, 1, 2),
            crate::DEFAULT_MAX_SPAN_DAYS,
            reference,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_validated_rejects_inverted_bounds() {
        let reference = date(2024, 6, 1);
        let result = DateRange::validated(date(2024, 1, 2), date(2024, 1, 1), 730, reference);
        let err = result.expect_err("inverted bounds should fail");
        assert!(matches!(err, RangeError::StartAfterEnd { .. }));
        assert_eq!(err.to_string(), "Start date must be before end date");
    }

    #[test]
    fn test_validated_rejects_over_long_range() {
        let reference = date(2026, 6, 1);
        let result = DateRange::validated(date(2024, 1, 1), date(2026, 1, 1), 730, reference);
        let err = result.expect_err("731-day span should exceed the 730-day cap");
        assert!(matches!(
            err,
            RangeError::TooLong {
                max_days: 730,
                actual_days: 731
            }
        ));
        assert_eq!(err.to_string(), "Date range cannot exceed 730 days");
    }

    #[test]
    fn test_validated_rejects_future_start() {
        let reference = date(2025, 6, 1);
        let result = DateRange::validated(date(2025, 7, 1), date(2025, 8, 1), 730, reference);
        let err = result.expect_err("start after reference should fail");
        assert!(matches!(err, RangeError::StartInFuture { .. }));
        assert_eq!(err.to_string(), "Start date cannot be in the future");
    }

    #[test]
    fn test_validated_allows_end_in_future() {
        // Only the start is constrained against the reference; an end past
        // "today" simply has no data yet.
        let reference = date(2025, 6, 1);
        let result = DateRange::validated(date(2025, 5, 1), date(2025, 7, 1), 730, reference);
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_validated_happy_path() {
        let reference = date(2024, 6, 1);
        let r = DateRange::parse_validated("2024-01-01", "2024-03-31", 730, reference)
            .expect("well-formed in-bounds input should validate");
        assert_eq!(r.start(), date(2024, 1, 1));
        assert_eq!(r.end(), date(2024, 3, 31));
    }

    #[test]
    fn test_parse_validated_rejects_malformed_date() {
        let reference = date(2024, 6, 1);
        let result = DateRange::parse_validated("not-a-date", "2024-03-31", 730, reference);
        let err = result.expect_err("malformed start should fail");
        assert!(matches!(err, RangeError::InvalidDate(_)));
        assert!(err.to_string().starts_with("Invalid date"));
    }

    #[test]
    fn test_lookback_window() {
        let reference = date(2024, 6, 1);
        let window = DateRange::lookback_window(reference, 365);
        assert_eq!(window.end(), reference);
        assert_eq!(window.span_days(), 365);
        assert_eq!(window.start(), date(2023, 6, 2));
    }

    #[test]
    fn test_comparison_previous_period_is_contiguous() {
        let primary = range(2024, 3, 11, 2024, 3, 17);
        let previous = primary.comparison(Comparison::PreviousPeriod);

        assert_eq!(previous.start(), date(2024, 3, 4));
        assert_eq!(previous.end(), date(2024, 3, 10));
        assert_eq!(previous.span_days(), primary.span_days());
        assert!(!previous.overlaps(&primary));
        assert_eq!(
            previous.end().checked_add_days(1),
            Some(primary.start()),
            "comparison window must end the day before the primary starts"
        );
    }

    #[test]
    fn test_comparison_previous_period_single_day() {
        let primary = range(2024, 5, 10, 2024, 5, 10);
        let previous = primary.comparison(Comparison::PreviousPeriod);
        assert_eq!(previous, range(2024, 5, 9, 2024, 5, 9));
    }

    #[test]
    fn test_comparison_year_over_year() {
        let primary = range(2024, 3, 1, 2024, 3, 31);
        let last_year = primary.comparison(Comparison::YearOverYear);
        assert_eq!(last_year, range(2023, 3, 1, 2023, 3, 31));
    }

    #[test]
    fn test_comparison_year_over_year_leap_day() {
        // Calendar-field decrement, not 365-day subtraction
        let primary = range(2024, 2, 29, 2024, 2, 29);
        let last_year = primary.comparison(Comparison::YearOverYear);
        assert_eq!(last_year, range(2023, 2, 28, 2023, 2, 28));
    }

    #[test]
    fn test_comparison_range_none_is_none() {
        let primary = range(2024, 3, 1, 2024, 3, 31);
        assert_eq!(comparison_range(&primary, None), None);
        assert_eq!(
            comparison_range(&primary, Some(Comparison::YearOverYear)),
            Some(range(2023, 3, 1, 2023, 3, 31))
        );
    }

    #[test]
    fn test_comparison_parse() {
        assert_eq!(
            "previous_period".parse::<Comparison>().unwrap(),
            Comparison::PreviousPeriod
        );
        assert_eq!(
            "year_over_year".parse::<Comparison>().unwrap(),
            Comparison::YearOverYear
        );
        assert!(matches!(
            "sideways".parse::<Comparison>(),
            Err(ParseError::InvalidComparison(_))
        ));
    }

    #[test]
    fn test_display_label() {
        let r = range(2024, 1, 5, 2024, 2, 1);
        assert_eq!(r.display_label(), "Jan 05, 2024 - Feb 01, 2024");
    }

    #[test]
    fn test_display_label_single_day() {
        let r = range(2024, 1, 5, 2024, 1, 5);
        assert_eq!(r.display_label(), "Jan 05, 2024");
    }

    #[test]
    fn test_display() {
        let r = range(2024, 1, 5, 2024, 2, 1);
        assert_eq!(r.to_string(), "2024-01-05/2024-02-01");
    }

    #[test]
    fn test_from_str() {
        let r = "2024-01-05/2024-02-01"
            .parse::<DateRange>()
            .expect("failed to parse range");
        assert_eq!(r, range(2024, 1, 5, 2024, 2, 1));
    }

    #[test]
    fn test_from_str_invalid_order() {
        let result = "2024-02-01/2024-01-05".parse::<DateRange>();
        assert!(matches!(result, Err(RangeError::StartAfterEnd { .. })));
    }

    #[test]
    fn test_from_str_separator_errors() {
        let result = "2024-01-05".parse::<DateRange>();
        let err = result.expect_err("missing separator should fail");
        assert!(err.to_string().contains("No range separator found"));

        let result = "2024-01-05/2024-02-01/2024-03-01".parse::<DateRange>();
        let err = result.expect_err("extra separator should fail");
        assert!(err.to_string().contains("Too many '/' separators"));
    }

    #[test]
    fn test_ordering() {
        let r1 = range(2024, 1, 1, 2024, 1, 31);
        let r2 = range(2024, 1, 1, 2024, 2, 29);
        let r3 = range(2024, 2, 1, 2024, 2, 15);

        assert!(r1 < r2, "same start orders by end");
        assert!(r2 < r3, "earlier start orders first");
    }

    #[test]
    fn test_serde_string_format() {
        let r = range(2024, 1, 5, 2024, 2, 1);
        let json = serde_json::to_string(&r).expect("failed to serialize range");
        assert_eq!(json, r#""2024-01-05/2024-02-01""#);

        let parsed: DateRange = serde_json::from_str(&json).expect("failed to deserialize range");
        assert_eq!(r, parsed);
    }

    #[test]
    fn test_serde_rejects_inverted_range() {
        let result: Result<DateRange, _> = serde_json::from_str(r#""2024-02-01/2024-01-05""#);
        assert!(result.is_err());
    }
}
