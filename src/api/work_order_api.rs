// ==========================================
// IWS BDE 系统 - 生产工单 API
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::ensure_valid;
use crate::domain::filters::WorkOrderFilter;
use crate::domain::work_order::{WorkOrder, WorkOrderCreate, WorkOrderUpdate};
use crate::repository::upsert::UpsertOutcome;
use crate::repository::work_order_repo::WorkOrderRepository;

pub struct WorkOrderApi {
    work_order_repo: Arc<WorkOrderRepository>,
}

impl WorkOrderApi {
    pub fn new(work_order_repo: Arc<WorkOrderRepository>) -> Self {
        Self { work_order_repo }
    }

    pub fn create(&self, input: WorkOrderCreate) -> ApiResult<WorkOrder> {
        let order = WorkOrder::from(input);
        ensure_valid(order.validate())?;

        if self.work_order_repo.exists(&order.order_number)? {
            return Err(ApiError::DuplicateKey(format!(
                "WorkOrder '{}' 已存在",
                order.order_number
            )));
        }

        self.work_order_repo.insert(&order)?;
        info!(order_number = %order.order_number, status = %order.status, "工单已创建");
        Ok(order)
    }

    pub fn get(&self, order_number: &str) -> ApiResult<WorkOrder> {
        self.work_order_repo
            .find_by_key(order_number)?
            .ok_or_else(|| ApiError::NotFound(format!("WorkOrder '{}' 不存在", order_number)))
    }

    pub fn list(&self, filter: &WorkOrderFilter) -> ApiResult<Vec<WorkOrder>> {
        let orders = self.work_order_repo.list(filter)?;
        debug!(count = orders.len(), "查询工单列表");
        Ok(orders)
    }

    pub fn update(&self, order_number: &str, update: WorkOrderUpdate) -> ApiResult<WorkOrder> {
        let mut order = self.get(order_number)?;
        let mut violations = order.apply(update);
        violations.extend(order.validate());
        ensure_valid(violations)?;

        self.work_order_repo.update(&order)?;
        info!(order_number = %order.order_number, status = %order.status, "工单已更新");
        Ok(order)
    }

    /// 删除工单（存在下属工序时返回 ReferentialIntegrity）
    pub fn delete(&self, order_number: &str) -> ApiResult<()> {
        self.work_order_repo.delete(order_number)?;
        info!(order_number = %order_number, "工单已删除");
        Ok(())
    }

    pub fn upsert(&self, order: &WorkOrder) -> ApiResult<UpsertOutcome> {
        ensure_valid(order.validate())?;
        Ok(self.work_order_repo.upsert(order)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::types::WorkOrderStatus;
    use std::sync::Mutex;

    fn setup_api() -> WorkOrderApi {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        WorkOrderApi::new(Arc::new(WorkOrderRepository::new(conn)))
    }

    #[test]
    fn test_create_applies_default_status() {
        let api = setup_api();
        let input: WorkOrderCreate = serde_json::from_value(serde_json::json!({
            "order_number": "WO-1",
            "quantity": 100,
            "due_date": "2024-06-30"
        }))
        .unwrap();
        let order = api.create(input).unwrap();
        assert_eq!(order.status, WorkOrderStatus::Open);
        assert_eq!(api.get("WO-1").unwrap(), order);
    }

    #[test]
    fn test_negative_quantity_is_validation_error() {
        let api = setup_api();
        let input: WorkOrderCreate = serde_json::from_value(serde_json::json!({
            "order_number": "WO-1",
            "quantity": -5
        }))
        .unwrap();
        match api.create(input).unwrap_err() {
            ApiError::ValidationError { violations, .. } => {
                assert_eq!(violations[0].field, "quantity");
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_update_status() {
        let api = setup_api();
        let input: WorkOrderCreate =
            serde_json::from_value(serde_json::json!({ "order_number": "WO-1" })).unwrap();
        api.create(input).unwrap();

        let update = WorkOrderUpdate {
            status: Some(Some(WorkOrderStatus::InProgress)),
            ..Default::default()
        };
        assert_eq!(
            api.update("WO-1", update).unwrap().status,
            WorkOrderStatus::InProgress
        );
    }
}
