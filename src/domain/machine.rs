// ==========================================
// IWS BDE 系统 - 设备主数据
// ==========================================
// 业务键: code（设备编码）
// 对齐: machines 表 / machines.csv
// ==========================================

use crate::domain::validation::{normalize_optional, FieldViolation, Violations};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub code: String,                // 设备编码 (业务键)
    pub name: String,                // 设备名称
    pub description: Option<String>, // 描述
    pub location: Option<String>,    // 位置（车间/工位）
    pub active: bool,                // 是否启用
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineCreate {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineUpdate {
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub active: Option<Option<bool>>,
}

impl From<MachineCreate> for Machine {
    fn from(input: MachineCreate) -> Self {
        Self {
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            description: normalize_optional(input.description),
            location: normalize_optional(input.location),
            active: input.active,
        }
    }
}

impl Machine {
    pub fn apply(&mut self, update: MachineUpdate) -> Vec<FieldViolation> {
        let mut violations = Violations::new();
        if let Some(v) = violations.non_null("name", update.name) {
            self.name = v.trim().to_string();
        }
        if let Some(v) = update.description {
            self.description = normalize_optional(v);
        }
        if let Some(v) = update.location {
            self.location = normalize_optional(v);
        }
        if let Some(v) = violations.non_null("active", update.active) {
            self.active = v;
        }
        violations.into_vec()
    }

    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.required_text("code", &self.code, 50);
        v.required_text("name", &self.name, 120);
        v.optional_text("description", self.description.as_deref(), 250);
        v.optional_text("location", self.location.as_deref(), 120);
        v.into_vec()
    }
}
