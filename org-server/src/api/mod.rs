//! HTTP surface
//!
//! Thin axum handlers over [`OrgService`](crate::services::OrgService). Each
//! handler builds a [`RequestContext`](crate::core::RequestContext) from the
//! server state and returns [`ApiResponse`](crate::utils::ApiResponse) bodies;
//! failures render through `AppError: IntoResponse`.

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub mod departments;
pub mod employees;
pub mod health;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUID v4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(employees::router())
        .merge(departments::router())
}

/// Routes with middleware and state applied, ready to serve
pub fn build_app(state: ServerState) -> Router {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);
    build_router()
        .layer(
            ServiceBuilder::new()
                // Request ID - set before tracing so spans carry it
                .layer(SetRequestIdLayer::new(header.clone(), XRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(header))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
