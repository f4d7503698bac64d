use axum::{routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(hello))
}

/// Liveness check
async fn hello() -> &'static str {
    "Hello World!"
}
