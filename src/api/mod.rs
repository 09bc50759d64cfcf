// ==========================================
// IWS BDE 系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口（校验、唯一性、外键检查）,供 HTTP 处理器调用
// ==========================================

pub mod activity_record_api;
pub mod csv_exchange_api;
pub mod employee_api;
pub mod error;
pub mod machine_api;
pub mod operation_api;
pub mod validator;
pub mod work_order_api;

// 重导出核心类型
pub use activity_record_api::ActivityRecordApi;
pub use csv_exchange_api::CsvExchangeApi;
pub use employee_api::EmployeeApi;
pub use error::{ApiError, ApiResult};
pub use machine_api::MachineApi;
pub use operation_api::OperationApi;
pub use work_order_api::WorkOrderApi;
