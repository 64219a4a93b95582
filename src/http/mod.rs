use axum::Router;

use crate::AppState;

mod error;
mod handlers;
mod routes;
mod ws;

pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::notifications())
        .merge(routes::users())
        .merge(routes::realtime())
        .with_state(state)
}
