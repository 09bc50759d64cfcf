// ==========================================
// 报工记录路由
// ==========================================
// 主键为系统生成的整数 id；路径中非整数 id → 422
// ==========================================

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::error::{ApiError, ApiResult};
use crate::app::http::csv_routes::{export_download, import_upload, parse_entity_filter};
use crate::app::http::{json_body, parse_query, run_blocking};
use crate::app::state::AppState;
use crate::domain::activity_record::{ActivityRecord, ActivityRecordCreate, ActivityRecordUpdate};
use crate::domain::filters::ActivityRecordFilter;
use crate::domain::types::EntityKind;
use crate::importer::report::ImportReport;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/activity_records",
            get(list_activity_records).post(create_activity_record),
        )
        .route("/activity_records/import", post(import_activity_records))
        .route("/activity_records/export", get(export_activity_records))
        .route(
            "/activity_records/{id}",
            get(get_activity_record)
                .put(update_activity_record)
                .delete(delete_activity_record),
        )
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::invalid_field("id", format!("'{}' 不是有效的整数 id", raw)))
}

async fn create_activity_record(
    State(state): State<AppState>,
    payload: Result<Json<ActivityRecordCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ActivityRecord>)> {
    let input = json_body(payload)?;
    let api = state.activity_record_api.clone();
    let record = run_blocking(move || api.create(input)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// 支持 personnel_number / operation_code / status / start_from / start_to
async fn list_activity_records(
    State(state): State<AppState>,
    uri: Uri,
) -> ApiResult<Json<Vec<ActivityRecord>>> {
    let filter: ActivityRecordFilter = parse_query(&uri)?;
    let api = state.activity_record_api.clone();
    Ok(Json(run_blocking(move || api.list(&filter)).await?))
}

async fn get_activity_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ActivityRecord>> {
    let id = parse_id(&id)?;
    let api = state.activity_record_api.clone();
    Ok(Json(run_blocking(move || api.get(id)).await?))
}

async fn update_activity_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ActivityRecordUpdate>, JsonRejection>,
) -> ApiResult<Json<ActivityRecord>> {
    let id = parse_id(&id)?;
    let update = json_body(payload)?;
    let api = state.activity_record_api.clone();
    Ok(Json(run_blocking(move || api.update(id, update)).await?))
}

async fn delete_activity_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let api = state.activity_record_api.clone();
    run_blocking(move || api.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_activity_records(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReport>> {
    import_upload(state, EntityKind::ActivityRecords, multipart).await
}

async fn export_activity_records(State(state): State<AppState>, uri: Uri) -> ApiResult<Response> {
    export_download(state, parse_entity_filter(EntityKind::ActivityRecords, &uri)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
