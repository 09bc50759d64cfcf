// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库 + 完整路由；以 oneshot 方式发送请求
// ==========================================

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::error::Error;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use iws_bde::app::{build_router, AppState};
use iws_bde::logging;

pub const BOUNDARY: &str = "----iws-bde-test-boundary";

/// 创建临时测试数据库并装配路由
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - Router: 完整 HTTP 路由
pub fn create_test_app() -> Result<(NamedTempFile, Router), Box<dyn Error>> {
    logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let state = AppState::new(db_path)?;
    Ok((temp_file, build_router(state)))
}

/// 发送请求，返回状态码、响应头与原始响应体
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

/// 发送 JSON 请求（body 为 None 时不带请求体）
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let (status, _, bytes) = send(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send_json(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send_json(app, Method::POST, uri, Some(body)).await
}

/// 以 multipart/form-data 上传 CSV
pub async fn upload_csv(app: &Router, uri: &str, field: &str, csv: &[u8]) -> (StatusCode, Value) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.csv\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(csv);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, _, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// 下载 CSV，返回状态码、响应头与文本
pub async fn download_csv(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

// ==========================================
// 测试数据
// ==========================================

/// 创建一套互相引用的主数据: 员工 E1, 机台 M-01, 工单 WO-1, 工序 OP-10
pub async fn seed_master_data(app: &Router) {
    let (status, _) = post_json(
        app,
        "/employees",
        serde_json::json!({
            "personnel_number": "E1", "first_name": "A", "last_name": "B",
            "department": "D", "role": "operator", "active": true
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        app,
        "/machines",
        serde_json::json!({ "code": "M-01", "name": "Drehbank", "location": "Halle 1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        app,
        "/work_orders",
        serde_json::json!({
            "order_number": "WO-1", "customer": "Kunde A", "article": "Welle",
            "quantity": 100, "due_date": "2024-03-01", "status": "released"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        app,
        "/operations",
        serde_json::json!({
            "code": "OP-10", "description": "Drehen", "order_number": "WO-1",
            "machine_code": "M-01", "standard_time_minutes": 12.5
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

/// 创建一条报工记录，返回其 id
pub async fn seed_activity_record(app: &Router) -> i64 {
    let (status, body) = post_json(
        app,
        "/activity_records",
        serde_json::json!({
            "start_time": "2024-03-01T08:00:00",
            "end_time": "2024-03-01T09:30:00",
            "personnel_number": "E1",
            "operation_code": "OP-10",
            "quantity_good": 40,
            "quantity_reject": 2,
            "status": "completed"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}
