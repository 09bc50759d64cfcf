// ==========================================
// 系统路由: 服务信息与健康检查
// ==========================================

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::app::state::AppState;
use crate::domain::types::EntityKind;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub csv_endpoints: &'static str,
    pub entities: Vec<&'static str>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
}

async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: crate::APP_NAME,
        version: crate::VERSION,
        csv_endpoints: "/csv/{entity}",
        entities: EntityKind::ALL.iter().map(|k| k.as_str()).collect(),
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
