use axum::{routing::delete, routing::get, routing::patch, routing::post, Router};

use crate::http::handlers;
use crate::http::ws;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn notifications() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::list_notifications))
        .route("/notifications", post(handlers::create_notification))
        .route(
            "/notifications/:user_id",
            get(handlers::list_user_notifications),
        )
        .route(
            "/notifications/:user_id/mark-all-read",
            patch(handlers::mark_all_notifications_read),
        )
        .route(
            "/notifications/:user_id/:id/mark-read",
            patch(handlers::mark_notification_read),
        )
        .route(
            "/notifications/:user_id/:id",
            delete(handlers::delete_notification),
        )
}

pub fn users() -> Router<AppState> {
    Router::new().route("/users/:id", get(handlers::get_user))
}

pub fn realtime() -> Router<AppState> {
    Router::new().route("/ws", get(ws::ws_handler))
}
