// ==========================================
// IWS BDE 系统 - CSV 交换错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层: ImportError 为文件级错误（整体失败）；CsvRowError 为行级错误（收集进报告）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 文件级错误
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("未上传文件（缺少 multipart 字段 'file'）")]
    MissingUpload,

    #[error("文件编码错误（需要 UTF-8）: {0}")]
    EncodingError(String),

    #[error("CSV 文件为空（缺少表头）")]
    EmptyFile,

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表头错误 =====
    #[error("CSV 表头缺少必需列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV 表头列重复: {0}")]
    DuplicateColumn(String),

    // ===== 单元格转换错误 =====
    #[error("类型转换失败 (字段 {field}): {message}")]
    TypeConversionError { field: String, message: String },

    #[error("行列数不一致: 表头 {expected} 列，本行 {actual} 列")]
    FieldCountMismatch { expected: usize, actual: usize },

    // ===== 导出错误 =====
    #[error("CSV 写出失败: {0}")]
    CsvWriteError(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

/// 行级错误（该行已回滚，其余行继续）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRowError {
    /// 文件中的物理行号（从 1 开始，表头为第 1 行）
    pub line: u64,
    pub reason: String,
}

impl CsvRowError {
    pub fn new(line: u64, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CsvRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "第 {} 行: {}", self.line, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let err = ImportError::MissingColumns(vec!["name".to_string(), "active".to_string()]);
        assert_eq!(err.to_string(), "CSV 表头缺少必需列: name, active");
    }

    #[test]
    fn test_row_error_display() {
        let err = CsvRowError::new(7, "quantity: 不能为负数");
        assert_eq!(err.to_string(), "第 7 行: quantity: 不能为负数");
    }
}
