// ==========================================
// IWS BDE 系统 - 领域类型定义
// ==========================================
// 职责: 状态枚举、实体种类、时间格式
// 约定: 时间戳统一为 ISO 8601 `YYYY-MM-DDThh:mm:ss`（无时区、无小数秒）
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 时间戳格式（JSON / CSV / 数据库三处统一）
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// 日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// 工单状态 (Work Order Status)
// ==========================================
// 序列化格式: snake_case (与数据库、CSV 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    #[default]
    Open,       // 已创建
    Released,   // 已下达
    InProgress, // 生产中
    Completed,  // 已完工
    Cancelled,  // 已取消
}

impl WorkOrderStatus {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Open => "open",
            WorkOrderStatus::Released => "released",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }

    /// 全部合法取值（用于错误提示）
    pub fn allowed_values() -> &'static [&'static str] {
        &["open", "released", "in_progress", "completed", "cancelled"]
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for WorkOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(WorkOrderStatus::Open),
            "released" => Ok(WorkOrderStatus::Released),
            "in_progress" => Ok(WorkOrderStatus::InProgress),
            "completed" => Ok(WorkOrderStatus::Completed),
            "cancelled" => Ok(WorkOrderStatus::Cancelled),
            other => Err(format!(
                "未知工单状态: {} (允许: {})",
                other,
                Self::allowed_values().join("/")
            )),
        }
    }
}

// ==========================================
// 报工状态 (Activity Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    InProgress, // 进行中
    Paused,     // 中断
    #[default]
    Completed,  // 已完成
    Cancelled,  // 作废
}

impl ActivityStatus {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActivityStatus::InProgress => "in_progress",
            ActivityStatus::Paused => "paused",
            ActivityStatus::Completed => "completed",
            ActivityStatus::Cancelled => "cancelled",
        }
    }

    pub fn allowed_values() -> &'static [&'static str] {
        &["in_progress", "paused", "completed", "cancelled"]
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in_progress" => Ok(ActivityStatus::InProgress),
            "paused" => Ok(ActivityStatus::Paused),
            "completed" => Ok(ActivityStatus::Completed),
            "cancelled" => Ok(ActivityStatus::Cancelled),
            other => Err(format!(
                "未知报工状态: {} (允许: {})",
                other,
                Self::allowed_values().join("/")
            )),
        }
    }
}

// ==========================================
// 实体种类 (Entity Kind)
// ==========================================
// 用于 REST 路径段与 CSV 交换的实体分发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Employees,
    Machines,
    WorkOrders,
    Operations,
    ActivityRecords,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Employees,
        EntityKind::Machines,
        EntityKind::WorkOrders,
        EntityKind::Operations,
        EntityKind::ActivityRecords,
    ];

    /// REST 路径段 / CSV 文件名
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Employees => "employees",
            EntityKind::Machines => "machines",
            EntityKind::WorkOrders => "work_orders",
            EntityKind::Operations => "operations",
            EntityKind::ActivityRecords => "activity_records",
        }
    }

    /// CSV 列契约（列名与顺序属于外部接口，不得调整）
    pub fn csv_columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Employees => &[
                "personnel_number",
                "first_name",
                "last_name",
                "department",
                "role",
                "active",
            ],
            EntityKind::Machines => &["code", "name", "description", "location", "active"],
            EntityKind::WorkOrders => &[
                "order_number",
                "customer",
                "article",
                "quantity",
                "due_date",
                "status",
            ],
            EntityKind::Operations => &[
                "code",
                "description",
                "order_number",
                "machine_code",
                "standard_time_minutes",
                "is_active",
            ],
            EntityKind::ActivityRecords => &[
                "id",
                "start_time",
                "end_time",
                "personnel_number",
                "operation_code",
                "quantity_good",
                "quantity_reject",
                "status",
                "comment",
            ],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 兼容连字符写法 (work-orders / activity-records)
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "employees" => Ok(EntityKind::Employees),
            "machines" => Ok(EntityKind::Machines),
            "work_orders" => Ok(EntityKind::WorkOrders),
            "operations" => Ok(EntityKind::Operations),
            "activity_records" => Ok(EntityKind::ActivityRecords),
            other => Err(format!("未知实体: '{}'", other)),
        }
    }
}

// ==========================================
// 时间格式工具
// ==========================================

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT)
        .map_err(|_| format!("时间格式错误（应为 YYYY-MM-DDThh:mm:ss）: {}", value))
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| format!("日期格式错误（应为 YYYY-MM-DD）: {}", value))
}

/// serde 适配: NaiveDateTime <-> `YYYY-MM-DDThh:mm:ss`
pub mod iso_datetime {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_datetime(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_datetime(&raw).map_err(serde::de::Error::custom)
    }
}

/// serde 适配: Option<NaiveDateTime>
pub mod iso_datetime_opt {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(&format_datetime(v)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|v| parse_datetime(&v).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// serde 适配: 更新请求中的可空时间戳
///
/// - 字段缺失 → None（保持不变）
/// - 显式 null → Some(None)（清空）
/// - 有值 → Some(Some(v))
pub mod iso_datetime_patch {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Option<NaiveDateTime>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(Some(v)) => s.serialize_some(&format_datetime(v)),
            _ => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<NaiveDateTime>>, D::Error> {
        super::iso_datetime_opt::deserialize(d).map(Some)
    }
}

/// 区分“字段缺失”与“显式 null”
///
/// 与 `#[serde(default)]` 搭配使用：缺失 → None，null → Some(None)。
pub fn deserialize_some<'de, T, D>(d: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(d).map(Some)
}
