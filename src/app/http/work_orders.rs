// ==========================================
// 工单路由
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
use crate::domain::filters::WorkOrderFilter;
use crate::domain::types::EntityKind;
use crate::domain::work_order::{WorkOrder, WorkOrderCreate, WorkOrderUpdate};
use crate::importer::report::ImportReport;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/work_orders", get(list_work_orders).post(create_work_order))
        .route("/work_orders/import", post(import_work_orders))
        .route("/work_orders/export", get(export_work_orders))
        .route(
            "/work_orders/{order_number}",
            get(get_work_order)
                .put(update_work_order)
                .delete(delete_work_order),
        )
}

async fn create_work_order(
    State(state): State<AppState>,
    payload: Result<Json<WorkOrderCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WorkOrder>)> {
    let input = json_body(payload)?;
    let api = state.work_order_api.clone();
    let order = run_blocking(move || api.create(input)).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

// ?status=released&customer=...
async fn list_work_orders(
    State(state): State<AppState>,
    uri: Uri,
) -> ApiResult<Json<Vec<WorkOrder>>> {
    let filter: WorkOrderFilter = parse_query(&uri)?;
    let api = state.work_order_api.clone();
    Ok(Json(run_blocking(move || api.list(&filter)).await?))
}

async fn get_work_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> ApiResult<Json<WorkOrder>> {
    let api = state.work_order_api.clone();
    Ok(Json(run_blocking(move || api.get(&order_number)).await?))
}

async fn update_work_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    payload: Result<Json<WorkOrderUpdate>, JsonRejection>,
) -> ApiResult<Json<WorkOrder>> {
    let update = json_body(payload)?;
    let api = state.work_order_api.clone();
    Ok(Json(
        run_blocking(move || api.update(&order_number, update)).await?,
    ))
}

async fn delete_work_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> ApiResult<StatusCode> {
    let api = state.work_order_api.clone();
    run_blocking(move || api.delete(&order_number)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_work_orders(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReport>> {
    import_upload(state, EntityKind::WorkOrders, multipart).await
}

async fn export_work_orders(State(state): State<AppState>, uri: Uri) -> ApiResult<Response> {
    export_download(state, parse_entity_filter(EntityKind::WorkOrders, &uri)?).await
}
