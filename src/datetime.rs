//! Parsing and formatting of ISO 8601 datetimes.
//!
//! Accepted input looks like `YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z]`.
//! A single space may be used in place of the `T`, and offsets may also be
//! written as `+HHMM` or `+HH`. Datetimes without an offset are interpreted
//! in the server's local timezone.

use std::borrow::Cow;

use serde::Serializer;
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::timezone::LocalTimezone;

const DATE_TIME_FORMATS: [&[BorrowedFormatItem<'static>]; 3] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

const OFFSET_FORMATS: [&[BorrowedFormatItem<'static>]; 3] = [
    format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    format_description!("[offset_hour sign:mandatory][offset_minute]"),
    format_description!("[offset_hour sign:mandatory]"),
];

const DATE_TIME_OUTPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const MICROSECOND_OUTPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!(".[subsecond digits:6]");
const OFFSET_OUTPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

/// The length of the `YYYY-MM-DD` prefix.
const DATE_LENGTH: usize = 10;

/// Parse `value` as an ISO 8601 datetime, returning `None` if it is not one.
///
/// Fractional seconds are truncated to microseconds. If `value` has no UTC
/// offset, the offset of `local_timezone` is used.
pub fn parse_iso8601(value: &str, local_timezone: &LocalTimezone) -> Option<OffsetDateTime> {
    let (date_time, offset) = split_offset(value)?;
    let date_time = normalize_separator(date_time);

    let date_time = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(&date_time, format).ok())?;
    let date_time = date_time.replace_microsecond(date_time.microsecond()).ok()?;

    Some(match offset {
        Some(offset) => date_time.assume_offset(offset),
        None => local_timezone.assume_local(date_time),
    })
}

/// Split `value` into the datetime and its UTC offset, if it has one.
///
/// Returns `None` if there is something that looks like an offset but it cannot be parsed.
fn split_offset(value: &str) -> Option<(&str, Option<UtcOffset>)> {
    if let Some(date_time) = value.strip_suffix(['Z', 'z']) {
        return Some((date_time, Some(UtcOffset::UTC)));
    }

    // Skip the date so that its dashes are not mistaken for a negative offset.
    let time_start = DATE_LENGTH + 1;
    let Some(sign_position) = value
        .get(time_start..)
        .and_then(|time| time.rfind(['+', '-']))
    else {
        return Some((value, None));
    };

    let (date_time, offset) = value.split_at(time_start + sign_position);
    let offset = OFFSET_FORMATS
        .iter()
        .find_map(|format| UtcOffset::parse(offset, format).ok())?;

    Some((date_time.trim_end(), Some(offset)))
}

fn normalize_separator(date_time: &str) -> Cow<'_, str> {
    if date_time.as_bytes().get(DATE_LENGTH) == Some(&b' ') {
        Cow::Owned(format!(
            "{}T{}",
            &date_time[..DATE_LENGTH],
            &date_time[DATE_LENGTH + 1..]
        ))
    } else {
        Cow::Borrowed(date_time)
    }
}

/// Format `date_time` as an ISO 8601 string, e.g. "2022-07-10T00:00:00+03:00".
///
/// Microseconds are only included when they are non-zero and a zero offset is written as "Z".
///
/// # Errors
///
/// Returns an error if the year cannot be represented with four digits.
pub fn format_iso8601(date_time: &OffsetDateTime) -> Result<String, time::error::Format> {
    let mut formatted = date_time.format(DATE_TIME_OUTPUT_FORMAT)?;

    if date_time.microsecond() != 0 {
        formatted.push_str(&date_time.format(MICROSECOND_OUTPUT_FORMAT)?);
    }

    if date_time.offset().is_utc() {
        formatted.push('Z');
    } else {
        formatted.push_str(&date_time.format(OFFSET_OUTPUT_FORMAT)?);
    }

    Ok(formatted)
}

/// Serialize a datetime with [format_iso8601], for use with `#[serde(serialize_with)]`.
pub(crate) fn serialize_iso8601<S>(
    date_time: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = format_iso8601(date_time).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

#[cfg(test)]
mod parse_tests {
    use time::{OffsetDateTime, UtcOffset, macros::datetime};

    use crate::timezone::LocalTimezone;

    use super::parse_iso8601;

    fn parse_utc(value: &str) -> Option<OffsetDateTime> {
        parse_iso8601(value, &LocalTimezone::new("Etc/UTC").unwrap())
    }

    #[test]
    fn parses_datetime_with_offset() {
        let got = parse_utc("2022-07-10T00:00:00+03:00").expect("should parse");

        assert_eq!(got, datetime!(2022-07-10 00:00:00 +03:00));
        assert_eq!(got.offset(), UtcOffset::from_hms(3, 0, 0).unwrap());
    }

    #[test]
    fn parses_negative_and_compact_offsets() {
        assert_eq!(
            parse_utc("2022-07-10T00:00:00-05:30"),
            Some(datetime!(2022-07-10 00:00:00 -05:30))
        );
        assert_eq!(
            parse_utc("2022-07-10T00:00:00+0300"),
            Some(datetime!(2022-07-10 00:00:00 +03:00))
        );
        assert_eq!(
            parse_utc("2022-07-10T00:00:00+03"),
            Some(datetime!(2022-07-10 00:00:00 +03:00))
        );
    }

    #[test]
    fn parses_zulu_time() {
        assert_eq!(
            parse_utc("2022-07-10T12:30:00Z"),
            Some(datetime!(2022-07-10 12:30:00 UTC))
        );
    }

    #[test]
    fn seconds_and_fraction_are_optional() {
        assert_eq!(
            parse_utc("2022-07-10T12:30"),
            Some(datetime!(2022-07-10 12:30:00 UTC))
        );
        assert_eq!(
            parse_utc("2022-07-10T12:30:15.123456+01:00"),
            Some(datetime!(2022-07-10 12:30:15.123456 +01:00))
        );
    }

    #[test]
    fn truncates_fraction_to_microseconds() {
        assert_eq!(
            parse_utc("2022-07-10T12:30:15.123456789Z"),
            Some(datetime!(2022-07-10 12:30:15.123456 UTC))
        );
    }

    #[test]
    fn accepts_space_separator() {
        assert_eq!(
            parse_utc("2022-07-10 12:30:00"),
            Some(datetime!(2022-07-10 12:30:00 UTC))
        );
    }

    #[test]
    fn naive_datetime_uses_local_timezone() {
        let moscow = LocalTimezone::new("Europe/Moscow").unwrap();

        let got = parse_iso8601("2022-07-11T00:00:00", &moscow);

        assert_eq!(got, Some(datetime!(2022-07-11 00:00:00 +03:00)));
    }

    #[test]
    fn rejects_invalid_datetimes() {
        for value in [
            "",
            "1 января 2022",
            "01-07-2022",
            "2022-02-31T00:00:00",
            "2022-07-10",
            "2022-07-10T25:00:00",
            "2022-07-10T00:00:00+3",
            "2022-07-10T00:00:00 UTC",
        ] {
            assert_eq!(parse_utc(value), None, "{value:?} should not parse");
        }
    }
}

#[cfg(test)]
mod format_tests {
    use time::macros::datetime;

    use super::format_iso8601;

    #[test]
    fn formats_with_offset() {
        let got = format_iso8601(&datetime!(2022-07-10 00:00:00 +03:00)).unwrap();

        assert_eq!(got, "2022-07-10T00:00:00+03:00");
    }

    #[test]
    fn formats_utc_as_zulu() {
        let got = format_iso8601(&datetime!(2022-07-10 00:00:00 UTC)).unwrap();

        assert_eq!(got, "2022-07-10T00:00:00Z");
    }

    #[test]
    fn includes_non_zero_microseconds() {
        let got = format_iso8601(&datetime!(2022-07-10 00:00:00.0405 -04:00)).unwrap();

        assert_eq!(got, "2022-07-10T00:00:00.040500-04:00");
    }
}
