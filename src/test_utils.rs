//! Shared constructors for tests.

use crate::{CivilDate, DateRange};

/// Builds a `CivilDate`, panicking on invalid components (test input is
/// always literal)
pub fn date(year: u16, month: u8, day: u8) -> CivilDate {
    CivilDate::from_ymd(year, month, day).unwrap()
}

/// Builds a `DateRange` from two date component triples
pub fn range(
    start_year: u16,
    start_month: u8,
    start_day: u8,
    end_year: u16,
    end_month: u8,
    end_day: u8,
) -> DateRange {
    DateRange::new(
        date(start_year, start_month, start_day),
        date(end_year, end_month, end_day),
    )
    .unwrap()
}
