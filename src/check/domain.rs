//! Core check domain types.

use std::ops::RangeInclusive;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    datetime::serialize_iso8601,
    timezone::LocalTimezone,
    validation::{FieldValidator, RawFields, START_DATE_NOT_BEFORE_END_DATE, ValidationErrors},
};

/// A point-of-sale receipt.
///
/// Checks are created once and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    /// The receipt number, unique across all checks.
    pub check_number: String,
    /// When the receipt was issued, with the offset it was submitted with.
    #[serde(serialize_with = "serialize_iso8601")]
    pub check_issuance_time: OffsetDateTime,
    /// The amount paid in minor currency units.
    pub total: i64,
    /// The customer that made the purchase.
    pub customer_id: String,
    /// The point of sale that issued the receipt.
    pub pos_id: String,
}

impl Check {
    /// Validate untyped input as a new check.
    ///
    /// Datetimes without an offset are placed in `local_timezone`.
    ///
    /// # Errors
    ///
    /// Returns every invalid field with its error messages.
    pub fn validate(
        fields: &RawFields,
        local_timezone: &LocalTimezone,
    ) -> Result<Self, ValidationErrors> {
        let mut validator = FieldValidator::new(fields);

        let check_number = validator.char_field("check_number");
        let check_issuance_time = validator.datetime_field("check_issuance_time", local_timezone);
        let total = validator.integer_field("total");
        let customer_id = validator.char_field("customer_id");
        let pos_id = validator.char_field("pos_id");

        match (check_number, check_issuance_time, total, customer_id, pos_id) {
            (
                Some(check_number),
                Some(check_issuance_time),
                Some(total),
                Some(customer_id),
                Some(pos_id),
            ) => Ok(Self {
                check_number,
                check_issuance_time,
                total,
                customer_id,
                pos_id,
            }),
            _ => Err(validator.into_errors()),
        }
    }

    /// The check number in `fields` if it is valid on its own, whatever the other fields hold.
    pub fn validate_check_number(fields: &RawFields) -> Option<String> {
        FieldValidator::new(fields).char_field("check_number")
    }
}

/// Validated parameters for a customer's purchase report.
#[derive(Debug, Clone, PartialEq)]
pub struct CostsQuery {
    /// The customer to report on.
    pub customer_id: String,
    /// Checks issued within this range (inclusive) are included.
    pub issuance_range: RangeInclusive<OffsetDateTime>,
}

impl CostsQuery {
    /// Validate untyped query parameters for a customer report.
    ///
    /// The start date must be strictly before the end date. That rule is only
    /// checked once every individual field is valid, and a violation is
    /// reported against `end_date`.
    ///
    /// # Errors
    ///
    /// Returns every invalid field with its error messages.
    pub fn validate(
        fields: &RawFields,
        local_timezone: &LocalTimezone,
    ) -> Result<Self, ValidationErrors> {
        let mut validator = FieldValidator::new(fields);

        let customer_id = validator.char_field("customer_id");
        let start_date = validator.datetime_field("start_date", local_timezone);
        let end_date = validator.datetime_field("end_date", local_timezone);

        match (customer_id, start_date, end_date) {
            (Some(customer_id), Some(start_date), Some(end_date)) if start_date < end_date => {
                Ok(Self {
                    customer_id,
                    issuance_range: start_date..=end_date,
                })
            }
            (Some(_), Some(_), Some(_)) => {
                validator.add_error("end_date", START_DATE_NOT_BEFORE_END_DATE);
                Err(validator.into_errors())
            }
            _ => Err(validator.into_errors()),
        }
    }

    /// Whether `check` belongs in this report.
    pub fn matches(&self, check: &Check) -> bool {
        check.customer_id == self.customer_id
            && self.issuance_range.contains(&check.check_issuance_time)
    }
}

/// A single line of a customer report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerCost {
    /// The amount paid in minor currency units.
    pub total: i64,
    /// The customer that made the purchase.
    pub customer_id: String,
}

impl From<Check> for CustomerCost {
    fn from(check: Check) -> Self {
        Self {
            total: check.total,
            customer_id: check.customer_id,
        }
    }
}

#[cfg(test)]
mod check_validation_tests {
    use time::macros::datetime;

    use crate::{
        check::Check,
        timezone::LocalTimezone,
        validation::{
            FIELD_CANNOT_BE_EMPTY, INCORRECT_DATETIME, INCORRECT_NUMBER, INVALID_LENGTH,
            REQUIRED_FIELD, RawFields,
        },
    };

    const FIELDS: [&str; 5] = [
        "check_number",
        "check_issuance_time",
        "total",
        "customer_id",
        "pos_id",
    ];

    fn utc() -> LocalTimezone {
        LocalTimezone::new("Etc/UTC").unwrap()
    }

    fn valid_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("customer_id", "UID_15"),
            ("check_number", "C53150"),
            ("pos_id", "POS_253217"),
            ("check_issuance_time", "2022-07-10T00:00:00+03:00"),
            ("total", "10000"),
        ]
    }

    fn with_field(field: &str, value: &'static str) -> RawFields {
        valid_fields()
            .into_iter()
            .map(|(key, old_value)| (key, if key == field { value } else { old_value }))
            .collect()
    }

    fn without_field(field: &str) -> RawFields {
        valid_fields()
            .into_iter()
            .filter(|(key, _)| *key != field)
            .collect()
    }

    #[test]
    fn check_number_is_validated_on_its_own() {
        let fields = with_field("total", "10000 рублей");

        assert_eq!(Check::validate_check_number(&fields), Some("C53150".to_owned()));
        assert_eq!(
            Check::validate_check_number(&with_field("check_number", "  ")),
            None
        );
    }

    #[test]
    fn valid_fields_produce_check() {
        let fields: RawFields = valid_fields().into_iter().collect();

        let check = Check::validate(&fields, &utc());

        assert_eq!(
            check,
            Ok(Check {
                check_number: "C53150".to_owned(),
                check_issuance_time: datetime!(2022-07-10 00:00:00 +03:00),
                total: 10000,
                customer_id: "UID_15".to_owned(),
                pos_id: "POS_253217".to_owned(),
            })
        );
    }

    #[test]
    fn empty_input_reports_every_field_as_required() {
        let errors = Check::validate(&RawFields::default(), &utc()).unwrap_err();

        for field in FIELDS {
            assert_eq!(errors.get(field), [REQUIRED_FIELD], "field {field}");
        }
    }

    #[test]
    fn each_missing_field_is_required() {
        for field in FIELDS {
            let errors = Check::validate(&without_field(field), &utc()).unwrap_err();

            assert_eq!(errors.get(field), [REQUIRED_FIELD], "field {field}");
            for other in FIELDS.iter().filter(|other| **other != field) {
                assert!(errors.get(other).is_empty(), "{other} should be valid");
            }
        }
    }

    #[test]
    fn empty_values_report_field_specific_errors() {
        let fields: RawFields = FIELDS.iter().map(|field| (*field, "")).collect();

        let errors = Check::validate(&fields, &utc()).unwrap_err();

        assert_eq!(errors.get("customer_id"), [FIELD_CANNOT_BE_EMPTY]);
        assert_eq!(errors.get("check_number"), [FIELD_CANNOT_BE_EMPTY]);
        assert_eq!(errors.get("pos_id"), [FIELD_CANNOT_BE_EMPTY]);
        assert_eq!(errors.get("check_issuance_time"), [INCORRECT_DATETIME]);
        assert_eq!(errors.get("total"), [INCORRECT_NUMBER]);
    }

    #[test]
    fn long_text_fields_report_length_error_only_for_that_field() {
        for field in ["customer_id", "check_number", "pos_id"] {
            let errors =
                Check::validate(&with_field(field, "123456789012345678901"), &utc()).unwrap_err();

            assert_eq!(errors.get(field), [INVALID_LENGTH], "field {field}");
            for other in FIELDS.iter().filter(|other| **other != field) {
                assert!(errors.get(other).is_empty(), "{other} should be valid");
            }
        }
    }

    #[test]
    fn malformed_datetime_is_rejected() {
        let errors =
            Check::validate(&with_field("check_issuance_time", "1 января 2022"), &utc())
                .unwrap_err();

        assert_eq!(errors.get("check_issuance_time"), [INCORRECT_DATETIME]);
    }

    #[test]
    fn malformed_total_is_rejected() {
        let errors = Check::validate(&with_field("total", "10000 рублей"), &utc()).unwrap_err();

        assert_eq!(errors.get("total"), [INCORRECT_NUMBER]);
    }
}
