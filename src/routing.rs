//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::Response,
    routing::{get, post},
};

use crate::{
    AppState,
    check::{CheckStore, add_check_endpoint, get_costs_endpoint},
    endpoints,
    error::detail_response,
};

/// Return a router with all the app's routes.
pub fn build_router<C>(state: AppState<C>) -> Router
where
    C: CheckStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::ADD_CHECK, post(add_check_endpoint::<C>))
        .route(endpoints::GET_COSTS, get(get_costs_endpoint::<C>))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    detail_response(StatusCode::NOT_FOUND, "Не найдено.")
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{build_router, test_utils::test_state};

    #[tokio::test]
    async fn unknown_route_returns_json_not_found() {
        let server = TestServer::new(build_router(test_state()));

        let response = server.get("/does/not/exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&serde_json::json!({"detail": "Не найдено."}));
    }

    #[tokio::test]
    async fn wrong_method_is_not_allowed() {
        let server = TestServer::new(build_router(test_state()));

        server
            .get("/add_check/")
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
        server
            .post("/get_costs/")
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}
