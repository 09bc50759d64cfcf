// ==========================================
// IWS BDE 系统 - 字段级校验
// ==========================================
// 职责: 必填/长度/范围检查，产出字段级违规明细
// ==========================================

use serde::{Deserialize, Serialize};

/// 字段级违规明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// 字段名（与 JSON / CSV 列名一致）
    pub field: String,
    /// 违规原因
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// 校验结果收集器
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// 必填文本: 去空白后非空且不超过最大长度
    pub fn required_text(&mut self, field: &str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.push(field, "不能为空");
        } else if value.chars().count() > max_len {
            self.push(field, format!("长度不能超过 {} 个字符", max_len));
        }
    }

    /// 可选文本: 有值时不超过最大长度
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if let Some(v) = value {
            if v.chars().count() > max_len {
                self.push(field, format!("长度不能超过 {} 个字符", max_len));
            }
        }
    }

    pub fn non_negative_i64(&mut self, field: &str, value: Option<i64>) {
        if let Some(v) = value {
            if v < 0 {
                self.push(field, format!("不能为负数: {}", v));
            }
        }
    }

    pub fn non_negative_f64(&mut self, field: &str, value: Option<f64>) {
        if let Some(v) = value {
            if !v.is_finite() {
                self.push(field, "必须为有限数值");
            } else if v < 0.0 {
                self.push(field, format!("不能为负数: {}", v));
            }
        }
    }

    /// 更新请求中的非空字段: 显式 null 记为违规，缺失与 null 都不产生新值
    pub fn non_null<T>(&mut self, field: &str, value: Option<Option<T>>) -> Option<T> {
        match value {
            Some(None) => {
                self.push(field, "不能为 null");
                None
            }
            Some(Some(v)) => Some(v),
            None => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.0
    }
}

/// 规范化可选文本: 去首尾空白，空串视为 None
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        let mut v = Violations::new();
        v.required_text("code", "  ", 50);
        v.required_text("name", &"x".repeat(121), 120);
        v.required_text("ok", "M-01", 50);

        let list = v.into_vec();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].field, "code");
        assert_eq!(list[1].field, "name");
    }

    #[test]
    fn test_non_negative() {
        let mut v = Violations::new();
        v.non_negative_i64("quantity", Some(-1));
        v.non_negative_i64("quantity", None);
        v.non_negative_f64("standard_time_minutes", Some(f64::NAN));
        v.non_negative_f64("standard_time_minutes", Some(0.0));
        assert_eq!(v.into_vec().len(), 2);
    }

    #[test]
    fn test_non_null() {
        let mut v = Violations::new();
        assert_eq!(v.non_null("name", Some(Some("x"))), Some("x"));
        assert_eq!(v.non_null::<&str>("name", None), None);
        assert!(v.is_empty());

        assert_eq!(v.non_null::<&str>("active", Some(None)), None);
        let list = v.into_vec();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].field, "active");
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(normalize_optional(Some(" Halle A ".to_string())), Some("Halle A".to_string()));
        assert_eq!(normalize_optional(None), None);
    }
}
