// ==========================================
// IWS BDE 系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户可理解的错误消息
// 约束: 每个错误都带稳定的错误码，HTTP 层据此映射状态码
// ==========================================

use crate::domain::validation::FieldViolation;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 字段级校验失败（携带全部违规明细）
    #[error("数据校验失败: {message}")]
    ValidationError {
        message: String,
        violations: Vec<FieldViolation>,
    },

    #[error("业务键重复: {0}")]
    DuplicateKey(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 外键目标不存在，或删除被引用的主数据
    #[error("引用完整性违反: {0}")]
    ReferentialIntegrity(String),

    /// 整个文件不可处理（编码、表头、格式）
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 由违规明细构造校验错误
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        let message = violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        ApiError::ValidationError {
            message,
            violations,
        }
    }

    /// 单字段校验错误
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldViolation::new(field, message)])
    }

    /// 稳定的错误码（对外接口的一部分）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::DuplicateKey(_) => "DUPLICATE_KEY",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ReferentialIntegrity(_) => "REFERENTIAL_INTEGRITY",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, key } => {
                ApiError::NotFound(format!("{} '{}' 不存在", entity, key))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateKey(msg),
            RepositoryError::ForeignKeyViolation(msg) => ApiError::ReferentialIntegrity(msg),
            err @ RepositoryError::DependentRecordsExist { .. } => {
                ApiError::ReferentialIntegrity(err.to_string())
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::invalid_field("record", msg)
            }
            RepositoryError::LockError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

// ==========================================
// 从 ImportError 转换（文件级错误）
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::CsvWriteError(msg) => ApiError::InternalError(msg),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::NotFound {
            entity: "Employee".to_string(),
            key: "1000".to_string(),
        }
        .into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Employee"));
                assert!(msg.contains("1000"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let api_err: ApiError = RepositoryError::DependentRecordsExist {
            entity: "Machine".to_string(),
            key: "M-01".to_string(),
            dependent: "Operation".to_string(),
            count: 2,
        }
        .into();
        assert_eq!(api_err.code(), "REFERENTIAL_INTEGRITY");

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("employees.personnel_number".into()).into();
        assert_eq!(api_err.code(), "DUPLICATE_KEY");
    }

    #[test]
    fn test_import_error_conversion() {
        let api_err: ApiError = ImportError::MissingColumns(vec!["code".to_string()]).into();
        assert_eq!(api_err.code(), "IMPORT_ERROR");
        assert!(api_err.to_string().contains("code"));
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let err = ApiError::validation(vec![
            FieldViolation::new("first_name", "不能为空"),
            FieldViolation::new("last_name", "不能为空"),
        ]);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("first_name: 不能为空; last_name: 不能为空"));
    }
}
