//! The endpoint for a customer's purchase report.

use axum::{
    Json,
    extract::{OriginalUri, Query, State, rejection::QueryRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    check::{Check, CheckStore, CostsQuery, CustomerCost},
    pagination::{PAGE_QUERY_PARAM, PageSlice, paginate, request_url},
    validation::RawFields,
};

/// Get one page of the totals a customer paid within a date range.
///
/// The response lists `{total, customer_id}` for each check, ordered by
/// issuance time, with links to the neighbouring pages.
pub async fn get_costs_endpoint<C>(
    State(state): State<AppState<C>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, Error>
where
    C: CheckStore + Clone + Send + Sync,
{
    let Query(query) = query.map_err(|rejection| Error::MalformedQuery(rejection.body_text()))?;
    let fields: RawFields = query.iter().cloned().collect();

    let costs_query = match CostsQuery::validate(&fields, &state.local_timezone) {
        Ok(costs_query) => costs_query,
        Err(errors) => return Ok(errors.into_response()),
    };

    let checks = state
        .check_store
        .find_by_customer_and_range(&costs_query.customer_id, &costs_query.issuance_range)?;
    let page_size = state.pagination_config.page_size(&fields);

    let page = build_customer_report(
        checks,
        &costs_query,
        fields.get(PAGE_QUERY_PARAM),
        page_size,
    )?
    .into_page(&request_url(&uri, &headers), &query);

    Ok(Json(page).into_response())
}

/// Select the checks that belong in the report for `costs_query` and cut out the requested page.
///
/// # Errors
///
/// Returns [Error::InvalidPage] if `requested_page` does not refer to a page of the report.
pub fn build_customer_report(
    checks: Vec<Check>,
    costs_query: &CostsQuery,
    requested_page: Option<&str>,
    page_size: u64,
) -> Result<PageSlice<CustomerCost>, Error> {
    let costs = checks
        .into_iter()
        .filter(|check| costs_query.matches(check))
        .map(CustomerCost::from)
        .collect();

    paginate(costs, requested_page, page_size)
}
