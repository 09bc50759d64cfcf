// ==========================================
// IWS BDE 系统 - 写入前校验
// ==========================================
// 职责: 字段级校验结果转 ApiError；外键目标存在性检查
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::validation::FieldViolation;

/// 违规明细为空则通过，否则返回 ValidationError
pub fn ensure_valid(violations: Vec<FieldViolation>) -> ApiResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(violations))
    }
}

/// 外键目标必须存在
///
/// # 参数
/// - `exists`: 目标记录是否存在
/// - `field`: 引用字段名
/// - `target`: 目标实体名
/// - `key`: 引用值
pub fn ensure_reference(exists: bool, field: &str, target: &str, key: &str) -> ApiResult<()> {
    if exists {
        Ok(())
    } else {
        Err(ApiError::ReferentialIntegrity(format!(
            "{} 引用的 {} '{}' 不存在",
            field, target, key
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_valid() {
        assert!(ensure_valid(Vec::new()).is_ok());
        let err = ensure_valid(vec![FieldViolation::new("code", "不能为空")]).unwrap_err();
        match err {
            ApiError::ValidationError { violations, .. } => assert_eq!(violations.len(), 1),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_reference() {
        assert!(ensure_reference(true, "order_number", "WorkOrder", "WO-1").is_ok());
        let err = ensure_reference(false, "order_number", "WorkOrder", "WO-404").unwrap_err();
        assert_eq!(err.code(), "REFERENTIAL_INTEGRITY");
        assert!(err.to_string().contains("WO-404"));
    }
}
