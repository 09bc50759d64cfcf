// ==========================================
// 机台路由
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
use crate::domain::filters::MachineFilter;
use crate::domain::machine::{Machine, MachineCreate, MachineUpdate};
use crate::domain::types::EntityKind;
use crate::importer::report::ImportReport;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/machines", get(list_machines).post(create_machine))
        .route("/machines/import", post(import_machines))
        .route("/machines/export", get(export_machines))
        .route(
            "/machines/{code}",
            get(get_machine).put(update_machine).delete(delete_machine),
        )
}

async fn create_machine(
    State(state): State<AppState>,
    payload: Result<Json<MachineCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Machine>)> {
    let input = json_body(payload)?;
    let api = state.machine_api.clone();
    let machine = run_blocking(move || api.create(input)).await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

async fn list_machines(State(state): State<AppState>, uri: Uri) -> ApiResult<Json<Vec<Machine>>> {
    let filter: MachineFilter = parse_query(&uri)?;
    let api = state.machine_api.clone();
    Ok(Json(run_blocking(move || api.list(&filter)).await?))
}

async fn get_machine(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Machine>> {
    let api = state.machine_api.clone();
    Ok(Json(run_blocking(move || api.get(&code)).await?))
}

async fn update_machine(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<MachineUpdate>, JsonRejection>,
) -> ApiResult<Json<Machine>> {
    let update = json_body(payload)?;
    let api = state.machine_api.clone();
    Ok(Json(run_blocking(move || api.update(&code, update)).await?))
}

/// 被工序引用的机台不可删除（409）
async fn delete_machine(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<StatusCode> {
    let api = state.machine_api.clone();
    run_blocking(move || api.delete(&code)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_machines(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReport>> {
    import_upload(state, EntityKind::Machines, multipart).await
}

async fn export_machines(State(state): State<AppState>, uri: Uri) -> ApiResult<Response> {
    export_download(state, parse_entity_filter(EntityKind::Machines, &uri)?).await
}
