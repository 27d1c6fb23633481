pub mod config;
pub mod error;
pub mod extract;
pub mod store;
mod v1;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::{error::ApiError, store::TodoStore};

#[derive(Debug)]
pub struct AppState {
    pub store: TodoStore,
}

impl AppState {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(v1::router())
        .fallback(|| async { ApiError::RouteNotFound })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
