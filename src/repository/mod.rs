// ==========================================
// IWS BDE 系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod activity_record_repo;
pub mod employee_repo;
pub mod error;
pub mod machine_repo;
pub mod operation_repo;
pub mod sql_support;
pub mod upsert;
pub mod work_order_repo;

// 重导出核心仓储
pub use activity_record_repo::ActivityRecordRepository;
pub use employee_repo::EmployeeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use machine_repo::MachineRepository;
pub use operation_repo::OperationRepository;
pub use upsert::UpsertOutcome;
pub use work_order_repo::WorkOrderRepository;
