// ==========================================
// 工序路由
// ==========================================
// 工序引用工单与机台；引用目标不存在 → 409
// ==========================================

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::error::ApiResult;
use crate::app::http::csv_routes::{export_download, import_upload, parse_entity_filter};
use crate::app::http::{json_body, parse_query, run_blocking};
use crate::app::state::AppState;
use crate::domain::filters::OperationFilter;
use crate::domain::operation::{Operation, OperationCreate, OperationUpdate};
use crate::domain::types::EntityKind;
use crate::importer::report::ImportReport;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/operations", get(list_operations).post(create_operation))
        .route("/operations/import", post(import_operations))
        .route("/operations/export", get(export_operations))
        .route(
            "/operations/{code}",
            get(get_operation)
                .put(update_operation)
                .delete(delete_operation),
        )
}

async fn create_operation(
    State(state): State<AppState>,
    payload: Result<Json<OperationCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Operation>)> {
    let input = json_body(payload)?;
    let api = state.operation_api.clone();
    let operation = run_blocking(move || api.create(input)).await?;
    Ok((StatusCode::CREATED, Json(operation)))
}

async fn list_operations(
    State(state): State<AppState>,
    uri: Uri,
) -> ApiResult<Json<Vec<Operation>>> {
    let filter: OperationFilter = parse_query(&uri)?;
    let api = state.operation_api.clone();
    Ok(Json(run_blocking(move || api.list(&filter)).await?))
}

async fn get_operation(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Operation>> {
    let api = state.operation_api.clone();
    Ok(Json(run_blocking(move || api.get(&code)).await?))
}

async fn update_operation(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<OperationUpdate>, JsonRejection>,
) -> ApiResult<Json<Operation>> {
    let update = json_body(payload)?;
    let api = state.operation_api.clone();
    Ok(Json(run_blocking(move || api.update(&code, update)).await?))
}

async fn delete_operation(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<StatusCode> {
    let api = state.operation_api.clone();
    run_blocking(move || api.delete(&code)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_operations(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReport>> {
    import_upload(state, EntityKind::Operations, multipart).await
}

async fn export_operations(State(state): State<AppState>, uri: Uri) -> ApiResult<Response> {
    export_download(state, parse_entity_filter(EntityKind::Operations, &uri)?).await
}
