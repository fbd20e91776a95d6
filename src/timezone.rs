//! Resolves the server's local timezone for datetimes sent without an offset.

use std::fmt::Debug;

use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, OffsetResult, PrimitiveDateTimeExt, TimeZone, Tz};

use crate::Error;

/// A canonical timezone, e.g. "Europe/Moscow", resolved from its name.
#[derive(Clone, Copy)]
pub struct LocalTimezone {
    timezone: &'static Tz,
}

impl LocalTimezone {
    /// Look up the timezone with the canonical name `canonical_timezone`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone.
    pub fn new(canonical_timezone: &str) -> Result<Self, Error> {
        time_tz::timezones::get_by_name(canonical_timezone)
            .map(|timezone| Self { timezone })
            .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
    }

    /// The canonical name of the timezone.
    pub fn name(&self) -> &str {
        self.timezone.name()
    }

    /// The offset from UTC in this timezone at the instant `date_time`.
    pub fn offset_at(&self, date_time: &OffsetDateTime) -> UtcOffset {
        self.timezone.get_offset_utc(date_time).to_utc()
    }

    /// Attach this timezone's offset to a wall clock time that has none.
    ///
    /// A time that occurs twice when clocks go back resolves to the earlier
    /// instant. A time skipped when clocks go forward keeps the offset from
    /// before the transition.
    pub fn assume_local(&self, date_time: PrimitiveDateTime) -> OffsetDateTime {
        match date_time.assume_timezone(self.timezone) {
            OffsetResult::Some(local) => local,
            OffsetResult::Ambiguous(first, second) => first.min(second),
            OffsetResult::None => {
                let offset_before = self.offset_at(&(date_time.assume_utc() - Duration::DAY));
                date_time.assume_offset(offset_before)
            }
        }
    }
}

impl Debug for LocalTimezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LocalTimezone").field(&self.name()).finish()
    }
}
