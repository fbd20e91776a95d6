//! The endpoint for submitting new checks.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    check::{Check, CheckStore},
    validation::{DUPLICATE_CHECK_NUMBER, RawFields},
};

/// Validate and store a new check, echoing it back with 201 Created.
///
/// Invalid fields are reported together as a 400 response. A check number
/// that is already stored is reported as an error on `check_number`, along
/// with any errors in the other fields.
pub async fn add_check_endpoint<C>(
    State(state): State<AppState<C>>,
    fields: RawFields,
) -> Result<Response, Error>
where
    C: CheckStore + Clone + Send + Sync,
{
    let validated = Check::validate(&fields, &state.local_timezone);
    let is_duplicate = match Check::validate_check_number(&fields) {
        Some(check_number) => state.check_store.contains_check_number(&check_number)?,
        None => false,
    };

    let check = match (validated, is_duplicate) {
        (Ok(check), false) => check,
        (Err(errors), false) => return Ok(errors.into_response()),
        (validated, true) => {
            let mut errors = validated.err().unwrap_or_default();
            errors.add("check_number", DUPLICATE_CHECK_NUMBER);
            return Ok(errors.into_response());
        }
    };

    let check = state.check_store.insert_unique(check)?;
    tracing::info!(
        "Added check {} for customer {}",
        check.check_number,
        check.customer_id
    );

    Ok((StatusCode::CREATED, Json(check)).into_response())
}
