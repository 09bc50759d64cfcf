// ==========================================
// 公共工具：错误映射（ApiError → HTTP 响应）
// ==========================================

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;

/// 错误响应（返回给客户端）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
            details: match err {
                ApiError::ValidationError { violations, .. } => {
                    Some(serde_json::json!({ "violations": violations }))
                }
                _ => None,
            },
        }
    }
}

/// 错误码对应的 HTTP 状态码
pub fn status_of(err: &ApiError) -> StatusCode {
    match err {
        ApiError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::DuplicateKey(_) | ApiError::ReferentialIntegrity(_) => StatusCode::CONFLICT,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::ImportError(_) => StatusCode::BAD_REQUEST,
        ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "请求处理失败");
        } else {
            tracing::debug!(code = self.code(), error = %self, "请求被拒绝");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

/// 请求体无法反序列化为目标结构（缺字段、类型错误、非 JSON）
pub fn map_json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::invalid_field("body", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::FieldViolation;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(&ApiError::invalid_field("name", "不能为空")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(&ApiError::DuplicateKey("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(&ApiError::ReferentialIntegrity("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(&ApiError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(&ApiError::ImportError("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(&ApiError::DatabaseError("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_details_carry_violations() {
        let err = ApiError::validation(vec![FieldViolation::new("quantity", "不能为负数")]);
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "VALIDATION_ERROR");
        let details = body.details.unwrap();
        assert_eq!(details["violations"][0]["field"], "quantity");

        let body = ErrorResponse::from(&ApiError::NotFound("Machine 'M-9' 不存在".into()));
        assert!(body.details.is_none());
    }
}
