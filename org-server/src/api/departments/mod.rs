//! Department API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Department router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/departments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/found", post(handler::found))
        .route(
            "/{id}",
            get(handler::get_tree)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/ancestors", get(handler::ancestors))
        .route("/{id}/subtree", get(handler::subtree))
}
