use crate::{handlers, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(app_state: AppState, cors_allow_origin: &str) -> Router {
    Router::new()
        .route("/register", post(handlers::register_handler))
        .route("/login", post(handlers::login_handler))
        .route("/users", get(handlers::list_users_handler))
        .route("/block-users", post(handlers::block_users_handler))
        .route("/unblock-users", post(handlers::unblock_users_handler))
        .route("/delete-users", post(handlers::delete_users_handler))
        .route("/test", get(handlers::liveness_handler))
        .layer(cors_layer(cors_allow_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(allow_origin: &str) -> CorsLayer {
    let origin = match allow_origin {
        "*" => AllowOrigin::from(Any),
        value => match HeaderValue::from_str(value) {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(_) => {
                tracing::warn!(origin = value, "invalid CORS_ALLOW_ORIGIN; allowing any origin");
                AllowOrigin::from(Any)
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
