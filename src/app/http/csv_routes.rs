// ==========================================
// CSV 导入/导出路由
// ==========================================
// - POST /E/import, POST /csv/{entity}: multipart 上传，字段名 `file`
// - GET  /E/export, GET  /csv/{entity}: 返回 text/csv 附件，过滤参数同列表查询
// 未知实体 → 404
// ==========================================

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::app::http::{parse_query, run_blocking};
use crate::app::state::AppState;
use crate::domain::filters::EntityFilter;
use crate::domain::types::EntityKind;
use crate::importer::error::ImportError;
use crate::importer::report::ImportReport;

/// 上传字段名
pub const UPLOAD_FIELD: &str = "file";

pub fn routes() -> Router<AppState> {
    Router::new().route("/csv/{entity}", get(export_any).post(import_any))
}

async fn export_any(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    uri: Uri,
) -> ApiResult<Response> {
    let kind = parse_entity(&entity)?;
    export_download(state, parse_entity_filter(kind, &uri)?).await
}

async fn import_any(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReport>> {
    let kind = parse_entity(&entity)?;
    import_upload(state, kind, multipart).await
}

fn parse_entity(segment: &str) -> ApiResult<EntityKind> {
    segment.parse().map_err(ApiError::NotFound)
}

/// 按实体解析过滤参数
pub(crate) fn parse_entity_filter(kind: EntityKind, uri: &Uri) -> ApiResult<EntityFilter> {
    Ok(match kind {
        EntityKind::Employees => EntityFilter::Employees(parse_query(uri)?),
        EntityKind::Machines => EntityFilter::Machines(parse_query(uri)?),
        EntityKind::WorkOrders => EntityFilter::WorkOrders(parse_query(uri)?),
        EntityKind::Operations => EntityFilter::Operations(parse_query(uri)?),
        EntityKind::ActivityRecords => EntityFilter::ActivityRecords(parse_query(uri)?),
    })
}

/// 处理上传并导入
pub(crate) async fn import_upload(
    state: AppState,
    kind: EntityKind,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReport>> {
    let mut multipart = multipart.map_err(|e| {
        ApiError::ImportError(format!("{} ({})", ImportError::MissingUpload, e.body_text()))
    })?;
    let bytes = read_upload(&mut multipart).await?;

    let api = state.csv_exchange_api.clone();
    let report = run_blocking(move || api.import_csv(kind, &bytes)).await?;
    Ok(Json(report))
}

/// 生成 CSV 附件响应
pub(crate) async fn export_download(state: AppState, filter: EntityFilter) -> ApiResult<Response> {
    let kind = filter.kind();
    let api = state.csv_exchange_api.clone();
    let bytes = run_blocking(move || api.export_csv(&filter)).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}.csv", kind),
        ),
    ];
    Ok((headers, bytes).into_response())
}

async fn read_upload(multipart: &mut Multipart) -> ApiResult<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::ImportError(format!("上传内容读取失败: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::ImportError(format!("上传内容读取失败: {}", e)))?;
        debug!(file_name = ?file_name, bytes = data.len(), "收到上传文件");
        return Ok(data);
    }
    Err(ImportError::MissingUpload.into())
}
