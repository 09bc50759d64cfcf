// ==========================================
// IWS BDE 系统 - 工序 API
// ==========================================
// 职责: 工序的增删改查
// 外键: 写入前检查所属工单、加工设备存在
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{ensure_reference, ensure_valid};
use crate::domain::filters::OperationFilter;
use crate::domain::operation::{Operation, OperationCreate, OperationUpdate};
use crate::repository::machine_repo::MachineRepository;
use crate::repository::operation_repo::OperationRepository;
use crate::repository::upsert::UpsertOutcome;
use crate::repository::work_order_repo::WorkOrderRepository;

pub struct OperationApi {
    operation_repo: Arc<OperationRepository>,
    work_order_repo: Arc<WorkOrderRepository>,
    machine_repo: Arc<MachineRepository>,
}

impl OperationApi {
    pub fn new(
        operation_repo: Arc<OperationRepository>,
        work_order_repo: Arc<WorkOrderRepository>,
        machine_repo: Arc<MachineRepository>,
    ) -> Self {
        Self {
            operation_repo,
            work_order_repo,
            machine_repo,
        }
    }

    pub fn create(&self, input: OperationCreate) -> ApiResult<Operation> {
        let operation = Operation::from(input);
        ensure_valid(operation.validate())?;

        if self.operation_repo.exists(&operation.code)? {
            return Err(ApiError::DuplicateKey(format!(
                "Operation '{}' 已存在",
                operation.code
            )));
        }
        self.check_references(&operation)?;

        self.operation_repo.insert(&operation)?;
        info!(
            code = %operation.code,
            order_number = %operation.order_number,
            "工序已创建"
        );
        Ok(operation)
    }

    pub fn get(&self, code: &str) -> ApiResult<Operation> {
        self.operation_repo
            .find_by_key(code)?
            .ok_or_else(|| ApiError::NotFound(format!("Operation '{}' 不存在", code)))
    }

    pub fn list(&self, filter: &OperationFilter) -> ApiResult<Vec<Operation>> {
        let operations = self.operation_repo.list(filter)?;
        debug!(count = operations.len(), "查询工序列表");
        Ok(operations)
    }

    pub fn update(&self, code: &str, update: OperationUpdate) -> ApiResult<Operation> {
        let mut operation = self.get(code)?;
        let mut violations = operation.apply(update);
        violations.extend(operation.validate());
        ensure_valid(violations)?;
        self.check_references(&operation)?;

        self.operation_repo.update(&operation)?;
        info!(code = %operation.code, "工序已更新");
        Ok(operation)
    }

    /// 删除工序（存在报工记录时返回 ReferentialIntegrity）
    pub fn delete(&self, code: &str) -> ApiResult<()> {
        self.operation_repo.delete(code)?;
        info!(code = %code, "工序已删除");
        Ok(())
    }

    pub fn upsert(&self, operation: &Operation) -> ApiResult<UpsertOutcome> {
        ensure_valid(operation.validate())?;
        self.check_references(operation)?;
        Ok(self.operation_repo.upsert(operation)?)
    }

    fn check_references(&self, operation: &Operation) -> ApiResult<()> {
        ensure_reference(
            self.work_order_repo.exists(&operation.order_number)?,
            "order_number",
            "WorkOrder",
            &operation.order_number,
        )?;
        if let Some(machine_code) = operation.machine_code.as_deref() {
            ensure_reference(
                self.machine_repo.exists(machine_code)?,
                "machine_code",
                "Machine",
                machine_code,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup_api() -> OperationApi {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO work_orders (order_number, status) VALUES ('WO-1', 'open');
             INSERT INTO machines (code, name, active) VALUES ('M-01', 'Fräse', 1);",
        )
        .unwrap();
        let conn: Arc<Mutex<Connection>> = Arc::new(Mutex::new(conn));
        OperationApi::new(
            Arc::new(OperationRepository::new(conn.clone())),
            Arc::new(WorkOrderRepository::new(conn.clone())),
            Arc::new(MachineRepository::new(conn)),
        )
    }

    fn create_input(code: &str, order: &str, machine: Option<&str>) -> OperationCreate {
        OperationCreate {
            code: code.to_string(),
            description: None,
            order_number: order.to_string(),
            machine_code: machine.map(str::to_string),
            standard_time_minutes: Some(3.5),
            is_active: true,
        }
    }

    #[test]
    fn test_create_with_valid_references() {
        let api = setup_api();
        let op = api.create(create_input("OP-10", "WO-1", Some("M-01"))).unwrap();
        assert_eq!(api.get("OP-10").unwrap(), op);
    }

    #[test]
    fn test_create_with_missing_work_order() {
        let api = setup_api();
        let err = api
            .create(create_input("OP-10", "WO-404", Some("M-01")))
            .unwrap_err();
        assert_eq!(err.code(), "REFERENTIAL_INTEGRITY");
    }

    #[test]
    fn test_create_with_missing_machine() {
        let api = setup_api();
        let err = api
            .create(create_input("OP-10", "WO-1", Some("M-404")))
            .unwrap_err();
        assert_eq!(err.code(), "REFERENTIAL_INTEGRITY");
        assert!(api.get("OP-10").is_err());
    }

    #[test]
    fn test_update_to_missing_machine_rejected() {
        let api = setup_api();
        api.create(create_input("OP-10", "WO-1", None)).unwrap();
        let update = OperationUpdate {
            machine_code: Some(Some("M-404".to_string())),
            ..Default::default()
        };
        assert_eq!(
            api.update("OP-10", update).unwrap_err().code(),
            "REFERENTIAL_INTEGRITY"
        );
        assert_eq!(api.get("OP-10").unwrap().machine_code, None);
    }
}
