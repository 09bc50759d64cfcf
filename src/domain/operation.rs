// ==========================================
// IWS BDE 系统 - 工序
// ==========================================
// 业务键: code（工序编码）
// 外键: order_number → work_orders, machine_code → machines（可空）
// 对齐: operations 表 / operations.csv
// ==========================================

use crate::domain::validation::{normalize_optional, FieldViolation, Violations};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub code: String,                       // 工序编码 (业务键)
    pub description: Option<String>,        // 描述
    pub order_number: String,               // 所属工单
    pub machine_code: Option<String>,       // 加工设备
    pub standard_time_minutes: Option<f64>, // 标准工时（分钟）
    pub is_active: bool,                    // 是否启用
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationCreate {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order_number: String,
    #[serde(default)]
    pub machine_code: Option<String>,
    #[serde(default)]
    pub standard_time_minutes: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationUpdate {
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub order_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub machine_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub standard_time_minutes: Option<Option<f64>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub is_active: Option<Option<bool>>,
}

impl From<OperationCreate> for Operation {
    fn from(input: OperationCreate) -> Self {
        Self {
            code: input.code.trim().to_string(),
            description: normalize_optional(input.description),
            order_number: input.order_number.trim().to_string(),
            machine_code: normalize_optional(input.machine_code),
            standard_time_minutes: input.standard_time_minutes,
            is_active: input.is_active,
        }
    }
}

impl Operation {
    pub fn apply(&mut self, update: OperationUpdate) -> Vec<FieldViolation> {
        let mut violations = Violations::new();
        if let Some(v) = update.description {
            self.description = normalize_optional(v);
        }
        if let Some(v) = violations.non_null("order_number", update.order_number) {
            self.order_number = v.trim().to_string();
        }
        if let Some(v) = update.machine_code {
            self.machine_code = normalize_optional(v);
        }
        if let Some(v) = update.standard_time_minutes {
            self.standard_time_minutes = v;
        }
        if let Some(v) = violations.non_null("is_active", update.is_active) {
            self.is_active = v;
        }
        violations.into_vec()
    }

    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.required_text("code", &self.code, 50);
        v.optional_text("description", self.description.as_deref(), 250);
        v.required_text("order_number", &self.order_number, 50);
        v.optional_text("machine_code", self.machine_code.as_deref(), 50);
        v.non_negative_f64("standard_time_minutes", self.standard_time_minutes);
        v.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_requires_order_number() {
        let op = Operation::from(OperationCreate {
            code: "OP-10".to_string(),
            description: Some("Drehen".to_string()),
            order_number: "  ".to_string(),
            machine_code: Some("".to_string()),
            standard_time_minutes: Some(12.5),
            is_active: true,
        });
        assert_eq!(op.machine_code, None);
        let violations = op.validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "order_number");
    }

    #[test]
    fn test_negative_standard_time_rejected() {
        let input: OperationCreate = serde_json::from_str(
            r#"{"code":"OP-20","order_number":"WO-1","standard_time_minutes":-1.0}"#,
        )
        .unwrap();
        let op = Operation::from(input);
        assert!(op.is_active);
        assert_eq!(op.validate()[0].field, "standard_time_minutes");
    }

    #[test]
    fn test_update_moves_operation_to_other_machine() {
        let mut op = Operation::from(OperationCreate {
            code: "OP-10".to_string(),
            description: None,
            order_number: "WO-1".to_string(),
            machine_code: Some("M-01".to_string()),
            standard_time_minutes: None,
            is_active: true,
        });
        let update: OperationUpdate =
            serde_json::from_str(r#"{"machine_code":"M-02","standard_time_minutes":7.5}"#).unwrap();
        op.apply(update);
        assert_eq!(op.machine_code.as_deref(), Some("M-02"));
        assert_eq!(op.standard_time_minutes, Some(7.5));
        assert_eq!(op.order_number, "WO-1");
    }
}
