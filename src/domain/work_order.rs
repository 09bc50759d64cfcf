// ==========================================
// IWS BDE 系统 - 生产工单
// ==========================================
// 业务键: order_number（工单号）
// 约束: quantity >= 0
// 对齐: work_orders 表 / work_orders.csv
// ==========================================

use crate::domain::types::WorkOrderStatus;
use crate::domain::validation::{normalize_optional, FieldViolation, Violations};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub order_number: String,        // 工单号 (业务键)
    pub customer: Option<String>,    // 客户
    pub article: Option<String>,     // 物料/零件
    pub quantity: Option<i64>,       // 计划数量
    pub due_date: Option<NaiveDate>, // 交期 (YYYY-MM-DD)
    pub status: WorkOrderStatus,     // 工单状态
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkOrderCreate {
    pub order_number: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: WorkOrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkOrderUpdate {
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub customer: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub article: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub quantity: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub status: Option<Option<WorkOrderStatus>>,
}

impl From<WorkOrderCreate> for WorkOrder {
    fn from(input: WorkOrderCreate) -> Self {
        Self {
            order_number: input.order_number.trim().to_string(),
            customer: normalize_optional(input.customer),
            article: normalize_optional(input.article),
            quantity: input.quantity,
            due_date: input.due_date,
            status: input.status,
        }
    }
}

impl WorkOrder {
    pub fn apply(&mut self, update: WorkOrderUpdate) -> Vec<FieldViolation> {
        let mut violations = Violations::new();
        if let Some(v) = update.customer {
            self.customer = normalize_optional(v);
        }
        if let Some(v) = update.article {
            self.article = normalize_optional(v);
        }
        if let Some(v) = update.quantity {
            self.quantity = v;
        }
        if let Some(v) = update.due_date {
            self.due_date = v;
        }
        if let Some(v) = violations.non_null("status", update.status) {
            self.status = v;
        }
        violations.into_vec()
    }

    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.required_text("order_number", &self.order_number, 50);
        v.optional_text("customer", self.customer.as_deref(), 120);
        v.optional_text("article", self.article.as_deref(), 120);
        v.non_negative_i64("quantity", self.quantity);
        v.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults_status_open() {
        let input: WorkOrderCreate =
            serde_json::from_str(r#"{"order_number":"WO-2024-001","quantity":500}"#).unwrap();
        let order = WorkOrder::from(input);
        assert_eq!(order.status, WorkOrderStatus::Open);
        assert_eq!(order.quantity, Some(500));
        assert!(order.validate().is_empty());
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let input: WorkOrderCreate =
            serde_json::from_str(r#"{"order_number":"WO-1","quantity":-5}"#).unwrap();
        let violations = WorkOrder::from(input).validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "quantity");
    }

    #[test]
    fn test_unknown_status_fails_deserialization() {
        let result: Result<WorkOrderCreate, _> =
            serde_json::from_str(r#"{"order_number":"WO-1","status":"shipped"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_clears_due_date() {
        let mut order = WorkOrder::from(WorkOrderCreate {
            order_number: "WO-1".to_string(),
            customer: None,
            article: None,
            quantity: Some(10),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            status: WorkOrderStatus::Released,
        });
        let update: WorkOrderUpdate = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        order.apply(update);
        assert_eq!(order.due_date, None);
        assert_eq!(order.quantity, Some(10));
        assert_eq!(order.status, WorkOrderStatus::Released);
    }
}
