// ==========================================
// IWS BDE 系统 - 员工主数据
// ==========================================
// 业务键: personnel_number（人员编号，唯一，创建后不可修改）
// 对齐: employees 表 / employees.csv
// ==========================================

use crate::domain::validation::{normalize_optional, FieldViolation, Violations};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

// ==========================================
// Employee - 员工
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub personnel_number: String,   // 人员编号 (业务键)
    pub first_name: String,         // 名
    pub last_name: String,          // 姓
    pub department: Option<String>, // 部门
    pub role: Option<String>,       // 岗位
    pub active: bool,               // 是否在职
}

/// 创建请求
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmployeeCreate {
    pub personnel_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// 更新请求（部分字段合并：未提供的字段保持不变，显式 null 清空可空字段）
///
/// 必填字段的显式 null 由 `apply` 报告为违规；人员编号不可修改，出现即拒绝
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmployeeUpdate {
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub active: Option<Option<bool>>,
}

impl From<EmployeeCreate> for Employee {
    fn from(input: EmployeeCreate) -> Self {
        Self {
            personnel_number: input.personnel_number.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            department: normalize_optional(input.department),
            role: normalize_optional(input.role),
            active: input.active,
        }
    }
}

impl Employee {
    /// 合并更新请求
    ///
    /// # 返回
    /// - 必填字段被显式置为 null 的违规（这些字段保持原值）
    pub fn apply(&mut self, update: EmployeeUpdate) -> Vec<FieldViolation> {
        let mut violations = Violations::new();
        if let Some(v) = violations.non_null("first_name", update.first_name) {
            self.first_name = v.trim().to_string();
        }
        if let Some(v) = violations.non_null("last_name", update.last_name) {
            self.last_name = v.trim().to_string();
        }
        if let Some(v) = update.department {
            self.department = normalize_optional(v);
        }
        if let Some(v) = update.role {
            self.role = normalize_optional(v);
        }
        if let Some(v) = violations.non_null("active", update.active) {
            self.active = v;
        }
        violations.into_vec()
    }

    /// 字段校验
    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.required_text("personnel_number", &self.personnel_number, 50);
        v.required_text("first_name", &self.first_name, 120);
        v.required_text("last_name", &self.last_name, 120);
        v.optional_text("department", self.department.as_deref(), 120);
        v.optional_text("role", self.role.as_deref(), 120);
        v.into_vec()
    }
}
