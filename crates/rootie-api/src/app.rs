use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::CorsConfig,
    handlers::stream,
    middleware::logging,
    openapi,
    routes::{chat, graphs, health, nodes},
    state::AppState,
};

/// Upper bound for a whole request, streamed turns included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Chat
        .route("/chat", post(chat::chat))
        .route("/chat/stream", post(stream::chat_stream))
        // Nodes
        .route("/nodes", get(nodes::list_nodes))
        // Graphs
        .route("/graphs", post(graphs::create_graph).get(graphs::list_graphs))
        .route(
            "/graphs/:graph_id",
            get(graphs::get_graph)
                .put(graphs::update_graph)
                .delete(graphs::delete_graph),
        )
        .route("/graphs/:graph_id/save", post(graphs::save_graph))
        .route("/graphs/:graph_id/load", get(graphs::load_graph))
        .route("/openapi.json", get(openapi::openapi_json));

    Router::new()
        .route("/", get(health::root))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::permissive();
    }

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        cors.allow_origin(origins)
    }
}
