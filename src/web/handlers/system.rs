//! Health and tool availability handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::util::Tool;
use crate::web::state::WebAppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Tool availability response.
#[derive(Serialize)]
pub struct ToolsResponse {
    tools: Vec<ToolInfo>,
}

#[derive(Serialize)]
struct ToolInfo {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    available: bool,
    path: Option<String>,
}

/// List the external tools and whether they were found.
pub async fn list_tools(State(state): State<WebAppState>) -> Json<ToolsResponse> {
    let tools = state.core().tools();

    Json(ToolsResponse {
        tools: Tool::all()
            .iter()
            .map(|&tool| ToolInfo {
                id: tool.binary_name(),
                name: tool.display_name(),
                description: tool.description(),
                available: tools.is_available(tool),
                path: tools.get_path(tool).map(|p| p.display().to_string()),
            })
            .collect(),
    })
}
