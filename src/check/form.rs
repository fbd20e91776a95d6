//! Extraction of untyped check fields from JSON and form request bodies.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Map, Value};

use crate::{
    Error,
    validation::{RawFields, RawValue},
};

const JSON_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

impl<S> FromRequest<S> for RawFields
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(media_type)
            .unwrap_or_default();

        let body = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| Error::UnreadableBody(rejection.body_text()))?;

        parse_body(&content_type, &body)
    }
}

/// The media type of a `Content-Type` header value without its parameters, in lowercase.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Parse a request body as untyped fields according to its media type.
///
/// An empty body is always an empty set of fields.
fn parse_body(media_type: &str, body: &[u8]) -> Result<RawFields, Error> {
    if body.is_empty() {
        return Ok(RawFields::default());
    }

    match media_type {
        JSON_MEDIA_TYPE => parse_json(body),
        FORM_MEDIA_TYPE => serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .map(RawFields::from_iter)
            .map_err(|error| Error::UnreadableBody(error.to_string())),
        other => Err(Error::UnsupportedMediaType(other.to_owned())),
    }
}

fn parse_json(body: &[u8]) -> Result<RawFields, Error> {
    let value: Value =
        serde_json::from_slice(body).map_err(|error| Error::MalformedJson(error.to_string()))?;

    match value {
        Value::Object(object) => Ok(object_fields(object)),
        other => Err(Error::NotAnObject(json_type_name(&other))),
    }
}

/// Convert a JSON object to fields. `null` values are treated as missing.
///
/// Strings and numbers become text. Lists, objects and booleans are kept
/// apart so text fields can reject them.
fn object_fields(object: Map<String, Value>) -> RawFields {
    RawFields::from_values(object.into_iter().filter_map(|(key, value)| {
        let value = match value {
            Value::Null => return None,
            Value::String(text) => RawValue::Text(text),
            Value::Number(number) => RawValue::Text(number.to_string()),
            other @ (Value::Bool(_) | Value::Array(_) | Value::Object(_)) => {
                RawValue::Structured(other.to_string())
            }
        };

        Some((key, value))
    }))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
