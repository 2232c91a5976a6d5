//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use crate::{
    AppState,
    account::{delete_account_endpoint, get_accounts_endpoint},
    auth::auth_guard,
    dashboard::get_dashboard_endpoint,
    endpoints,
    logging::logging_middleware,
    sync::{
        create_enrollment_endpoint, create_link_token_endpoint, exchange_token_endpoint,
        sync_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::COFFEE, get(get_coffee));

    let protected_routes = Router::new()
        .route(endpoints::ENROLLMENTS, post(create_enrollment_endpoint))
        .route(endpoints::EXCHANGE_TOKEN, post(exchange_token_endpoint))
        .route(endpoints::LINK_TOKEN, get(create_link_token_endpoint))
        .route(
            endpoints::SYNC_TRANSACTIONS,
            post(sync_transactions_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .route(endpoints::ACCOUNTS, get(get_accounts_endpoint))
        .route(endpoints::DELETE_ACCOUNT, delete(delete_account_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

#[cfg(test)]
mod build_router_tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, aggregator::MockAggregatorClient, build_router};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state =
            AppState::new(connection, Arc::new(MockAggregatorClient::default())).unwrap();

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn coffee_is_unprotected() {
        let server = get_test_server();

        let response = server.get("/api/coffee").await;

        response.assert_status(axum::http::StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let server = get_test_server();

        let response = server.get("/api/unknown").await;

        response.assert_status_not_found();
    }
}
