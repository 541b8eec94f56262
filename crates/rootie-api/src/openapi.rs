use axum::Json;
use utoipa::OpenApi;

use crate::handlers::stream;
use crate::routes::{chat, graphs, health, nodes};

#[derive(OpenApi)]
#[openapi(
    info(title = "Rootie API", description = "Branching LLM conversation trees"),
    paths(
        health::root,
        health::health_check,
        chat::chat,
        stream::chat_stream,
        nodes::list_nodes,
        graphs::create_graph,
        graphs::list_graphs,
        graphs::get_graph,
        graphs::update_graph,
        graphs::delete_graph,
        graphs::save_graph,
        graphs::load_graph,
    ),
    components(schemas(
        health::HealthResponse,
        health::BannerResponse,
        chat::ChatTurnRequest,
        chat::ChatTurnResponse,
        chat::NewNodeData,
        nodes::NodesResponse,
        graphs::CreateGraphRequest,
        graphs::UpdateGraphRequest,
        graphs::SaveGraphRequest,
        graphs::GraphResponse,
        graphs::GraphSnapshotResponse,
        graphs::StatusResponse,
    )),
    tags(
        (name = "health"),
        (name = "chat", description = "Context building and completion relay"),
        (name = "nodes"),
        (name = "graphs", description = "Named conversation trees"),
    )
)]
pub struct ApiDoc;

/// OpenAPI document for the whole service
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
