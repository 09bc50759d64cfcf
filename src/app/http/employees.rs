// ==========================================
// 员工路由
// ==========================================
// /employees, /employees/{personnel_number}, /employees/import, /employees/export
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
use crate::domain::employee::{Employee, EmployeeCreate, EmployeeUpdate};
use crate::domain::filters::EmployeeFilter;
use crate::domain::types::EntityKind;
use crate::importer::report::ImportReport;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/import", post(import_employees))
        .route("/employees/export", get(export_employees))
        .route(
            "/employees/{personnel_number}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let input = json_body(payload)?;
    let api = state.employee_api.clone();
    let employee = run_blocking(move || api.create(input)).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn list_employees(
    State(state): State<AppState>,
    uri: Uri,
) -> ApiResult<Json<Vec<Employee>>> {
    let filter: EmployeeFilter = parse_query(&uri)?;
    let api = state.employee_api.clone();
    Ok(Json(run_blocking(move || api.list(&filter)).await?))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(personnel_number): Path<String>,
) -> ApiResult<Json<Employee>> {
    let api = state.employee_api.clone();
    Ok(Json(run_blocking(move || api.get(&personnel_number)).await?))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(personnel_number): Path<String>,
    payload: Result<Json<EmployeeUpdate>, JsonRejection>,
) -> ApiResult<Json<Employee>> {
    let update = json_body(payload)?;
    let api = state.employee_api.clone();
    Ok(Json(
        run_blocking(move || api.update(&personnel_number, update)).await?,
    ))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(personnel_number): Path<String>,
) -> ApiResult<StatusCode> {
    let api = state.employee_api.clone();
    run_blocking(move || api.delete(&personnel_number)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_employees(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReport>> {
    import_upload(state, EntityKind::Employees, multipart).await
}

async fn export_employees(State(state): State<AppState>, uri: Uri) -> ApiResult<Response> {
    let filter = parse_entity_filter(EntityKind::Employees, &uri)?;
    export_download(state, filter).await
}
