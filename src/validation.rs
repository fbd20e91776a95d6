//! Field-level validation of untyped request input.
//!
//! Validation never stops at the first problem: every invalid field is
//! reported in a single [ValidationErrors] map.

use std::collections::{BTreeMap, HashMap};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{datetime::parse_iso8601, timezone::LocalTimezone};

/// The field was not included in the request.
pub const REQUIRED_FIELD: &str = "Обязательное поле.";
/// The field was included but is blank.
pub const FIELD_CANNOT_BE_EMPTY: &str = "Это поле не может быть пустым.";
/// The field is not an ISO 8601 datetime.
pub const INCORRECT_DATETIME: &str = "Неправильный формат datetime. Используйте один из этих форматов:  YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";
/// The field is longer than [MAX_CHAR_FIELD_LENGTH] characters.
pub const INVALID_LENGTH: &str = "Убедитесь, что это значение содержит не более 20 символов.";
/// The field is not an integer.
pub const INCORRECT_NUMBER: &str = "Введите правильное число.";
/// The start of a date range is not before its end.
pub const START_DATE_NOT_BEFORE_END_DATE: &str =
    "Начальная дата и время должны быть меньше конечной.";
/// The field should be text but was sent as a list, object or boolean.
pub const NOT_A_VALID_STRING: &str = "Недопустимая строка.";
/// Another check already uses the check number.
pub const DUPLICATE_CHECK_NUMBER: &str = "check с таким check number уже существует.";

/// The maximum number of characters in a text field.
pub const MAX_CHAR_FIELD_LENGTH: usize = 20;

/// A single untyped input value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Text, or a number in its text form.
    Text(String),
    /// A value that is not text, e.g. a JSON list, object or boolean, in its JSON form.
    Structured(String),
}

impl RawValue {
    /// The value as text.
    pub fn as_str(&self) -> &str {
        match self {
            RawValue::Text(text) | RawValue::Structured(text) => text,
        }
    }
}

/// Untyped request fields keyed by field name, e.g. from a JSON object,
/// form body or query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields(HashMap<String, RawValue>);

impl RawFields {
    /// Build fields from values that may not all be text.
    ///
    /// Later values for the same key replace earlier ones.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (String, RawValue)>,
    {
        Self(values.into_iter().collect())
    }

    /// Get the raw value of `field` as text, or `None` if it was not sent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(RawValue::as_str)
    }

    /// Get the raw value of `field`, or `None` if it was not sent.
    pub fn value(&self, field: &str) -> Option<&RawValue> {
        self.0.get(field)
    }
}

impl<K, V> FromIterator<(K, V)> for RawFields
where
    K: Into<String>,
    V: Into<String>,
{
    /// Later values for the same key replace earlier ones.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_values(
            iter.into_iter()
                .map(|(key, value)| (key.into(), RawValue::Text(value.into()))),
        )
    }
}

/// Error messages for each invalid field, rendered as a 400 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Record `message` against `field`.
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.to_owned());
    }

    /// Whether no errors have been recorded.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The messages recorded for `field`, empty if the field is valid.
    #[cfg(test)]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

/// Validates fields one at a time, collecting every error along the way.
///
/// Each typed getter returns `None` and records an error if the field is
/// invalid, so callers can keep going and report everything at once.
pub struct FieldValidator<'a> {
    fields: &'a RawFields,
    errors: ValidationErrors,
}

impl<'a> FieldValidator<'a> {
    /// Create a validator for `fields`.
    pub fn new(fields: &'a RawFields) -> Self {
        Self {
            fields,
            errors: ValidationErrors::default(),
        }
    }

    /// A required text field of at most [MAX_CHAR_FIELD_LENGTH] characters.
    ///
    /// Surrounding whitespace is trimmed before the value is checked and returned.
    pub fn char_field(&mut self, field: &str) -> Option<String> {
        let value = match self.required(field)? {
            RawValue::Text(text) => text.trim(),
            RawValue::Structured(_) => {
                self.errors.add(field, NOT_A_VALID_STRING);
                return None;
            }
        };

        if value.is_empty() {
            self.errors.add(field, FIELD_CANNOT_BE_EMPTY);
            return None;
        }

        if value.chars().count() > MAX_CHAR_FIELD_LENGTH {
            self.errors.add(field, INVALID_LENGTH);
            return None;
        }

        Some(value.to_owned())
    }

    /// A required integer field.
    pub fn integer_field(&mut self, field: &str) -> Option<i64> {
        let value = self.required(field)?.as_str();

        match parse_integer(value) {
            Some(integer) => Some(integer),
            None => {
                self.errors.add(field, INCORRECT_NUMBER);
                None
            }
        }
    }

    /// A required ISO 8601 datetime field.
    ///
    /// Datetimes without an offset are placed in `local_timezone`.
    pub fn datetime_field(
        &mut self,
        field: &str,
        local_timezone: &LocalTimezone,
    ) -> Option<OffsetDateTime> {
        let value = self.required(field)?.as_str();

        match parse_iso8601(value, local_timezone) {
            Some(date_time) => Some(date_time),
            None => {
                self.errors.add(field, INCORRECT_DATETIME);
                None
            }
        }
    }

    /// Record an error that is not tied to parsing a single field.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.add(field, message);
    }

    /// Whether every field checked so far is valid.
    #[cfg(test)]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the validator, returning the errors collected.
    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    fn required(&mut self, field: &str) -> Option<&'a RawValue> {
        let value = self.fields.value(field);

        if value.is_none() {
            self.errors.add(field, REQUIRED_FIELD);
        }

        value
    }
}

/// Parse an integer the lenient way form input is usually typed.
///
/// Surrounding whitespace, a leading sign and a fractional part made only of
/// zeros (e.g. "10000.00") are accepted.
fn parse_integer(value: &str) -> Option<i64> {
    let value = value.trim();
    let value = match value.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|digit| digit == b'0') => whole,
        Some(_) => return None,
        None => value,
    };

    value.parse().ok()
}
