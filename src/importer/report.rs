// ==========================================
// IWS BDE 系统 - 导入报告
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::error::CsvRowError;
use crate::repository::upsert::UpsertOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 单次导入的汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// 导入批次ID
    pub batch_id: String,
    pub entity: EntityKind,
    /// 非空数据行数（含失败行）
    pub total_rows: usize,
    pub inserted: usize,
    pub updated: usize,
    /// 内容与库中一致，未写入
    pub unchanged: usize,
    pub errors: Vec<CsvRowError>,
}

impl ImportReport {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            batch_id: Uuid::new_v4().to_string(),
            entity,
            total_rows: 0,
            inserted: 0,
            updated: 0,
            unchanged: 0,
            errors: Vec::new(),
        }
    }

    pub fn record_outcome(&mut self, outcome: UpsertOutcome) {
        self.total_rows += 1;
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn record_error(&mut self, error: CsvRowError) {
        self.total_rows += 1;
        self.errors.push(error);
    }

    /// 是否发生了数据写入
    pub fn has_changes(&self) -> bool {
        self.inserted + self.updated > 0
    }
}
