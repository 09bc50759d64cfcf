// ==========================================
// IWS BDE 系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 并发: 单一 SQLite 连接，Arc<Mutex<Connection>> 在各仓储间共享
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{
    ActivityRecordApi, CsvExchangeApi, EmployeeApi, MachineApi, OperationApi, WorkOrderApi,
};
use crate::db;
use crate::repository::{
    ActivityRecordRepository, EmployeeRepository, MachineRepository, OperationRepository,
    WorkOrderRepository,
};

/// 应用状态
///
/// 包含所有API实例，作为 axum Router 的共享状态
#[derive(Clone)]
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub employee_api: Arc<EmployeeApi>,
    pub machine_api: Arc<MachineApi>,
    pub work_order_api: Arc<WorkOrderApi>,
    pub operation_api: Arc<OperationApi>,
    pub activity_record_api: Arc<ActivityRecordApi>,

    /// CSV 导入/导出API
    pub csv_exchange_api: Arc<CsvExchangeApi>,
}

impl AppState {
    /// 打开数据库、建表并创建全部API实例
    ///
    /// # 参数
    /// - db_path: SQLite 文件路径
    ///
    /// # 返回
    /// - Err(String): 数据库打开或建表失败
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        if let Ok(Some(version)) = db::read_schema_version(&conn) {
            tracing::info!("schema_version = {}", version);
        }

        Ok(Self::from_connection(Arc::new(Mutex::new(conn)), db_path))
    }

    /// 基于已初始化的连接装配（测试可传入内存库）
    pub fn from_connection(conn: Arc<Mutex<Connection>>, db_path: String) -> Self {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let employee_repo = Arc::new(EmployeeRepository::new(conn.clone()));
        let machine_repo = Arc::new(MachineRepository::new(conn.clone()));
        let work_order_repo = Arc::new(WorkOrderRepository::new(conn.clone()));
        let operation_repo = Arc::new(OperationRepository::new(conn.clone()));
        let activity_repo = Arc::new(ActivityRecordRepository::new(conn));

        // ==========================================
        // 创建API实例
        // ==========================================
        let employee_api = Arc::new(EmployeeApi::new(employee_repo.clone()));
        let machine_api = Arc::new(MachineApi::new(machine_repo.clone()));
        let work_order_api = Arc::new(WorkOrderApi::new(work_order_repo.clone()));
        let operation_api = Arc::new(OperationApi::new(
            operation_repo.clone(),
            work_order_repo,
            machine_repo,
        ));
        let activity_record_api = Arc::new(ActivityRecordApi::new(
            activity_repo,
            employee_repo,
            operation_repo,
        ));
        let csv_exchange_api = Arc::new(CsvExchangeApi::new(
            employee_api.clone(),
            machine_api.clone(),
            work_order_api.clone(),
            operation_api.clone(),
            activity_record_api.clone(),
        ));

        Self {
            db_path,
            employee_api,
            machine_api,
            work_order_api,
            operation_api,
            activity_record_api,
            csv_exchange_api,
        }
    }

    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filters::MachineFilter;

    #[test]
    fn test_new_creates_schema_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bde.db").to_string_lossy().to_string();

        let state = AppState::new(path.clone()).unwrap();
        assert_eq!(state.get_db_path(), path);
        assert!(state.machine_api.list(&MachineFilter::default()).unwrap().is_empty());
    }
}
