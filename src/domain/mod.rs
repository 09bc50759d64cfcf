// ==========================================
// IWS BDE 系统 - 领域模型层
// ==========================================
// 职责: 定义主数据/报工实体、请求载荷、状态枚举、字段校验
// 红线: 不含数据访问逻辑
// ==========================================

pub mod activity_record;
pub mod employee;
pub mod filters;
pub mod machine;
pub mod operation;
pub mod types;
pub mod validation;
pub mod work_order;

// 重导出核心类型
pub use activity_record::{ActivityRecord, ActivityRecordCreate, ActivityRecordUpdate};
pub use employee::{Employee, EmployeeCreate, EmployeeUpdate};
pub use filters::{
    ActivityRecordFilter, EmployeeFilter, EntityFilter, MachineFilter, OperationFilter,
    WorkOrderFilter,
};
pub use machine::{Machine, MachineCreate, MachineUpdate};
pub use operation::{Operation, OperationCreate, OperationUpdate};
pub use types::{ActivityStatus, EntityKind, WorkOrderStatus};
pub use validation::FieldViolation;
pub use work_order::{WorkOrder, WorkOrderCreate, WorkOrderUpdate};
