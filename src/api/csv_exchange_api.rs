// ==========================================
// IWS BDE 系统 - CSV 导入/导出 API
// ==========================================
// 职责: 按实体分发 CSV 导入（逐行 upsert）与导出
// 导入语义:
// - 文件级错误（编码/表头）→ ApiError::ImportError，整体不写入
// - 行级错误 → CsvRowError，该行回滚，其余行继续
// - 每行独立事务（由仓储 upsert 保证）
// ==========================================

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::activity_record_api::ActivityRecordApi;
use crate::api::employee_api::EmployeeApi;
use crate::api::error::ApiResult;
use crate::api::machine_api::MachineApi;
use crate::api::operation_api::OperationApi;
use crate::api::work_order_api::WorkOrderApi;
use crate::domain::activity_record::ActivityRecord;
use crate::domain::employee::Employee;
use crate::domain::filters::EntityFilter;
use crate::domain::machine::Machine;
use crate::domain::operation::Operation;
use crate::domain::types::EntityKind;
use crate::domain::work_order::WorkOrder;
use crate::importer::error::CsvRowError;
use crate::importer::exporter::CsvExporter;
use crate::importer::field_mapper::CsvMapping;
use crate::importer::file_parser::{CsvParser, CsvRow};
use crate::importer::report::ImportReport;
use crate::repository::upsert::UpsertOutcome;

pub struct CsvExchangeApi {
    employee_api: Arc<EmployeeApi>,
    machine_api: Arc<MachineApi>,
    work_order_api: Arc<WorkOrderApi>,
    operation_api: Arc<OperationApi>,
    activity_record_api: Arc<ActivityRecordApi>,
}

impl CsvExchangeApi {
    pub fn new(
        employee_api: Arc<EmployeeApi>,
        machine_api: Arc<MachineApi>,
        work_order_api: Arc<WorkOrderApi>,
        operation_api: Arc<OperationApi>,
        activity_record_api: Arc<ActivityRecordApi>,
    ) -> Self {
        Self {
            employee_api,
            machine_api,
            work_order_api,
            operation_api,
            activity_record_api,
        }
    }

    /// 导入 CSV
    ///
    /// # 参数
    /// - `entity`: 目标实体
    /// - `bytes`: 上传文件原始字节
    ///
    /// # 返回
    /// - `ImportReport`: 新建/覆盖/未变化计数与行级错误
    pub fn import_csv(&self, entity: EntityKind, bytes: &[u8]) -> ApiResult<ImportReport> {
        let document = CsvParser::new(entity.csv_columns()).parse(bytes)?;
        if !document.ignored_columns.is_empty() {
            warn!(
                entity = %entity,
                columns = ?document.ignored_columns,
                "CSV 含未知列，已忽略"
            );
        }

        let mut report = ImportReport::new(entity);
        info!(batch_id = %report.batch_id, entity = %entity, "开始导入 CSV");

        for row in document.rows {
            let result = row.and_then(|row| self.import_row(entity, &row));
            match result {
                Ok(outcome) => report.record_outcome(outcome),
                Err(row_error) => {
                    warn!(
                        batch_id = %report.batch_id,
                        line = row_error.line,
                        reason = %row_error.reason,
                        "CSV 行导入失败"
                    );
                    report.record_error(row_error);
                }
            }
        }

        info!(
            batch_id = %report.batch_id,
            entity = %entity,
            total = report.total_rows,
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            failed = report.errors.len(),
            "CSV 导入完成"
        );
        Ok(report)
    }

    /// 导出 CSV（过滤条件与列表查询一致）
    pub fn export_csv(&self, filter: &EntityFilter) -> ApiResult<Vec<u8>> {
        let bytes = match filter {
            EntityFilter::Employees(f) => CsvExporter::write(&self.employee_api.list(f)?)?,
            EntityFilter::Machines(f) => CsvExporter::write(&self.machine_api.list(f)?)?,
            EntityFilter::WorkOrders(f) => CsvExporter::write(&self.work_order_api.list(f)?)?,
            EntityFilter::Operations(f) => CsvExporter::write(&self.operation_api.list(f)?)?,
            EntityFilter::ActivityRecords(f) => {
                CsvExporter::write(&self.activity_record_api.list(f)?)?
            }
        };
        info!(entity = %filter.kind(), bytes = bytes.len(), "CSV 导出完成");
        Ok(bytes)
    }

    fn import_row(&self, entity: EntityKind, row: &CsvRow) -> Result<UpsertOutcome, CsvRowError> {
        match entity {
            EntityKind::Employees => {
                upsert_row(row, |e: &Employee| self.employee_api.upsert(e))
            }
            EntityKind::Machines => upsert_row(row, |m: &Machine| self.machine_api.upsert(m)),
            EntityKind::WorkOrders => {
                upsert_row(row, |o: &WorkOrder| self.work_order_api.upsert(o))
            }
            EntityKind::Operations => {
                upsert_row(row, |o: &Operation| self.operation_api.upsert(o))
            }
            EntityKind::ActivityRecords => upsert_row(row, |r: &ActivityRecord| {
                self.activity_record_api
                    .upsert(r)
                    .map(|(outcome, _id)| outcome)
            }),
        }
    }
}

/// 单行: 映射 → 写入；任何错误都折算为该行的 CsvRowError
fn upsert_row<T, F>(row: &CsvRow, write: F) -> Result<UpsertOutcome, CsvRowError>
where
    T: CsvMapping,
    F: FnOnce(&T) -> ApiResult<UpsertOutcome>,
{
    let record = T::from_csv_row(row).map_err(|e| CsvRowError::new(row.line, e.to_string()))?;
    write(&record).map_err(|e| CsvRowError::new(row.line, e.to_string()))
}
