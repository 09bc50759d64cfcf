// ==========================================
// IWS BDE 系统 - 列表/导出过滤条件
// ==========================================
// 用途: GET /E 与 GET /E/export 的查询参数
// ==========================================

use crate::domain::types::{iso_datetime_opt, ActivityStatus, EntityKind, WorkOrderStatus};
use chrono::NaiveDateTime;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    pub active: Option<bool>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineFilter {
    pub active: Option<bool>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatus>,
    pub customer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationFilter {
    pub order_number: Option<String>,
    pub machine_code: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityRecordFilter {
    pub personnel_number: Option<String>,
    pub operation_code: Option<String>,
    pub status: Option<ActivityStatus>,
    /// start_time 下界（含）
    #[serde(default, with = "iso_datetime_opt")]
    pub start_from: Option<NaiveDateTime>,
    /// start_time 上界（含）
    #[serde(default, with = "iso_datetime_opt")]
    pub start_to: Option<NaiveDateTime>,
}

/// 按实体区分的过滤条件（导出与通用 CSV 路由使用）
#[derive(Debug, Clone)]
pub enum EntityFilter {
    Employees(EmployeeFilter),
    Machines(MachineFilter),
    WorkOrders(WorkOrderFilter),
    Operations(OperationFilter),
    ActivityRecords(ActivityRecordFilter),
}

impl EntityFilter {
    /// 不带条件的过滤器
    pub fn unfiltered(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Employees => EntityFilter::Employees(EmployeeFilter::default()),
            EntityKind::Machines => EntityFilter::Machines(MachineFilter::default()),
            EntityKind::WorkOrders => EntityFilter::WorkOrders(WorkOrderFilter::default()),
            EntityKind::Operations => EntityFilter::Operations(OperationFilter::default()),
            EntityKind::ActivityRecords => {
                EntityFilter::ActivityRecords(ActivityRecordFilter::default())
            }
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityFilter::Employees(_) => EntityKind::Employees,
            EntityFilter::Machines(_) => EntityKind::Machines,
            EntityFilter::WorkOrders(_) => EntityKind::WorkOrders,
            EntityFilter::Operations(_) => EntityKind::Operations,
            EntityFilter::ActivityRecords(_) => EntityKind::ActivityRecords,
        }
    }
}
