// ==========================================
// IWS BDE 系统 - HTTP 接口层
// ==========================================
// 职责: axum 路由装配；处理器只做参数提取与响应封装，业务规则全部在 API 层
// 并发: API 层为同步调用（持有 SQLite 互斥锁），统一放入 spawn_blocking 执行
// ==========================================

pub mod activity_records;
pub mod csv_routes;
pub mod employees;
pub mod error_response;
pub mod machines;
pub mod operations;
pub mod system;
pub mod work_orders;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Query};
use axum::http::Uri;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api::error::{ApiError, ApiResult};
use crate::app::state::AppState;
use error_response::map_json_rejection;

/// 上传文件大小上限（字节）
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// 构建完整路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(system::routes())
        .merge(employees::routes())
        .merge(machines::routes())
        .merge(work_orders::routes())
        .merge(operations::routes())
        .merge(activity_records::routes())
        .merge(csv_routes::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

/// 在阻塞线程池中执行同步 API 调用
pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("后台任务失败: {}", e)))?
}

/// 解析查询参数（列表与导出共用）
pub(crate) fn parse_query<T: DeserializeOwned>(uri: &Uri) -> ApiResult<T> {
    Query::<T>::try_from_uri(uri)
        .map(|Query(value)| value)
        .map_err(|e| ApiError::invalid_field("query", e.body_text()))
}

/// 解包 JSON 请求体
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(value)| value).map_err(map_json_rejection)
}
