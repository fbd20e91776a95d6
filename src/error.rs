//! Defines the app level error type and its conversion to JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
///
/// Field-level validation failures are not errors in this sense, see
/// [ValidationErrors](crate::validation::ValidationErrors).
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The specified check number already exists in the database.
    ///
    /// Handlers look for duplicate check numbers while validating a request,
    /// so this error only occurs when two requests race to create the same
    /// check. It is reported to the client as an internal error.
    #[error("the check number already exists in the database")]
    DuplicateCheckNumber,

    /// The requested page number is not an integer or is out of range.
    #[error("invalid page")]
    InvalidPage,

    /// The request body claimed to be JSON but could not be parsed.
    #[error("could not parse the JSON body: {0}")]
    MalformedJson(String),

    /// The request body was valid JSON but not an object.
    ///
    /// Holds the name of the type that was sent instead, e.g. "list".
    #[error("expected a JSON object but got {0}")]
    NotAnObject(&'static str),

    /// The request body could not be read, e.g. the connection dropped.
    #[error("could not read the request body: {0}")]
    UnreadableBody(String),

    /// The query string could not be decoded as parameters.
    #[error("could not parse the query string: {0}")]
    MalformedQuery(String),

    /// The request body has a content type that cannot be parsed as fields.
    #[error("unsupported media type \"{0}\"")]
    UnsupportedMediaType(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("checks.check_number") =>
            {
                Error::DuplicateCheckNumber
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The message shown to clients for errors they cannot fix themselves.
const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Внутренняя ошибка сервера.";

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidPage => detail_response(StatusCode::NOT_FOUND, "Неверная страница."),
            Error::MalformedJson(details) => detail_response(
                StatusCode::BAD_REQUEST,
                &format!("Ошибка разбора JSON - {details}"),
            ),
            Error::NotAnObject(type_name) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "non_field_errors": [format!(
                        "Недопустимые данные. Ожидался словарь, но был получен {type_name}."
                    )]
                })),
            )
                .into_response(),
            Error::UnreadableBody(details) => {
                tracing::warn!("could not read request body: {details}");
                detail_response(StatusCode::BAD_REQUEST, "Не удалось прочитать тело запроса.")
            }
            Error::MalformedQuery(details) => detail_response(
                StatusCode::BAD_REQUEST,
                &format!("Ошибка разбора параметров запроса - {details}"),
            ),
            Error::UnsupportedMediaType(media_type) => detail_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                &format!("Неподдерживаемый тип данных \"{media_type}\" в запросе."),
            ),
            Error::DuplicateCheckNumber => {
                tracing::error!("A duplicate check number got past request validation");
                detail_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_MESSAGE,
                )
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                detail_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_MESSAGE,
                )
            }
        }
    }
}

/// Render a JSON response of the form `{"detail": message}`.
pub(crate) fn detail_response(status_code: StatusCode, message: &str) -> Response {
    (status_code, Json(json!({ "detail": message }))).into_response()
}
