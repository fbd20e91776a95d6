//! The API endpoints URIs.

/// The route for submitting a new check.
pub const ADD_CHECK: &str = "/add_check/";
/// The route for a customer's paginated purchase report.
pub const GET_COSTS: &str = "/get_costs/";

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ADD_CHECK);
        assert_endpoint_is_valid_uri(endpoints::GET_COSTS);
    }
}
