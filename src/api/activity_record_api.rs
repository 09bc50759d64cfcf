// ==========================================
// IWS BDE 系统 - 生产报工 API
// ==========================================
// 职责: 报工记录的增删改查
// 外键: 写入前检查员工、工序存在
// 约束: 合并后的记录重新校验（end_time >= start_time）
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{ensure_reference, ensure_valid};
use crate::domain::activity_record::{ActivityRecord, ActivityRecordCreate, ActivityRecordUpdate};
use crate::domain::filters::ActivityRecordFilter;
use crate::repository::activity_record_repo::ActivityRecordRepository;
use crate::repository::employee_repo::EmployeeRepository;
use crate::repository::operation_repo::OperationRepository;
use crate::repository::upsert::UpsertOutcome;

pub struct ActivityRecordApi {
    activity_repo: Arc<ActivityRecordRepository>,
    employee_repo: Arc<EmployeeRepository>,
    operation_repo: Arc<OperationRepository>,
}

impl ActivityRecordApi {
    pub fn new(
        activity_repo: Arc<ActivityRecordRepository>,
        employee_repo: Arc<EmployeeRepository>,
        operation_repo: Arc<OperationRepository>,
    ) -> Self {
        Self {
            activity_repo,
            employee_repo,
            operation_repo,
        }
    }

    /// 创建报工记录（id 由数据库生成）
    pub fn create(&self, input: ActivityRecordCreate) -> ApiResult<ActivityRecord> {
        let mut record = ActivityRecord::from(input);
        ensure_valid(record.validate())?;
        self.check_references(&record)?;

        record.id = self.activity_repo.insert(&record)?;
        info!(
            id = record.id,
            personnel_number = %record.personnel_number,
            operation_code = %record.operation_code,
            quantity_good = record.quantity_good,
            quantity_reject = record.quantity_reject,
            "报工记录已创建"
        );
        Ok(record)
    }

    pub fn get(&self, id: i64) -> ApiResult<ActivityRecord> {
        self.activity_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("ActivityRecord '{}' 不存在", id)))
    }

    pub fn list(&self, filter: &ActivityRecordFilter) -> ApiResult<Vec<ActivityRecord>> {
        if let (Some(from), Some(to)) = (filter.start_from, filter.start_to) {
            if from > to {
                return Err(ApiError::invalid_field(
                    "start_from",
                    "start_from 不能晚于 start_to",
                ));
            }
        }
        let records = self.activity_repo.list(filter)?;
        debug!(count = records.len(), "查询报工记录");
        Ok(records)
    }

    pub fn update(&self, id: i64, update: ActivityRecordUpdate) -> ApiResult<ActivityRecord> {
        let mut record = self.get(id)?;
        let mut violations = record.apply(update);
        violations.extend(record.validate());
        ensure_valid(violations)?;
        self.check_references(&record)?;

        self.activity_repo.update(&record)?;
        info!(id = record.id, status = %record.status, "报工记录已更新");
        Ok(record)
    }

    pub fn delete(&self, id: i64) -> ApiResult<()> {
        self.activity_repo.delete(id)?;
        info!(id = id, "报工记录已删除");
        Ok(())
    }

    /// 按 id 写入（CSV 导入）
    ///
    /// # 返回
    /// (写入结果, 记录 id)
    pub fn upsert(&self, record: &ActivityRecord) -> ApiResult<(UpsertOutcome, i64)> {
        ensure_valid(record.validate())?;
        self.check_references(record)?;
        Ok(self.activity_repo.upsert(record)?)
    }

    fn check_references(&self, record: &ActivityRecord) -> ApiResult<()> {
        ensure_reference(
            self.employee_repo.exists(&record.personnel_number)?,
            "personnel_number",
            "Employee",
            &record.personnel_number,
        )?;
        ensure_reference(
            self.operation_repo.exists(&record.operation_code)?,
            "operation_code",
            "Operation",
            &record.operation_code,
        )
    }
}
