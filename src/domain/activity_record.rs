// ==========================================
// IWS BDE 系统 - 生产报工记录
// ==========================================
// 主键: id（系统生成）
// 外键: personnel_number → employees, operation_code → operations
// 约束: end_time >= start_time（两者均有值时）；数量 >= 0
// 对齐: activity_records 表 / activity_records.csv
// ==========================================

use crate::domain::types::{
    iso_datetime, iso_datetime_opt, iso_datetime_patch, ActivityStatus,
};
use crate::domain::validation::{normalize_optional, FieldViolation, Violations};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// 记录ID（<= 0 表示尚未分配，由数据库生成）
    pub id: i64,
    #[serde(with = "iso_datetime")]
    pub start_time: NaiveDateTime,
    #[serde(with = "iso_datetime_opt")]
    pub end_time: Option<NaiveDateTime>,
    pub personnel_number: String, // 报工人员
    pub operation_code: String,   // 工序
    pub quantity_good: i64,       // 良品数
    pub quantity_reject: i64,     // 废品数
    pub status: ActivityStatus,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityRecordCreate {
    #[serde(with = "iso_datetime")]
    pub start_time: NaiveDateTime,
    #[serde(default, with = "iso_datetime_opt")]
    pub end_time: Option<NaiveDateTime>,
    pub personnel_number: String,
    pub operation_code: String,
    #[serde(default)]
    pub quantity_good: i64,
    #[serde(default)]
    pub quantity_reject: i64,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityRecordUpdate {
    #[serde(default, with = "iso_datetime_patch")]
    pub start_time: Option<Option<NaiveDateTime>>,
    #[serde(default, with = "iso_datetime_patch")]
    pub end_time: Option<Option<NaiveDateTime>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub personnel_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub operation_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub quantity_good: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub quantity_reject: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub status: Option<Option<ActivityStatus>>,
    #[serde(default, deserialize_with = "crate::domain::types::deserialize_some")]
    pub comment: Option<Option<String>>,
}

impl From<ActivityRecordCreate> for ActivityRecord {
    fn from(input: ActivityRecordCreate) -> Self {
        Self {
            id: 0,
            start_time: input.start_time,
            end_time: input.end_time,
            personnel_number: input.personnel_number.trim().to_string(),
            operation_code: input.operation_code.trim().to_string(),
            quantity_good: input.quantity_good,
            quantity_reject: input.quantity_reject,
            status: input.status,
            comment: normalize_optional(input.comment),
        }
    }
}

impl ActivityRecord {
    pub fn apply(&mut self, update: ActivityRecordUpdate) -> Vec<FieldViolation> {
        let mut violations = Violations::new();
        if let Some(v) = violations.non_null("start_time", update.start_time) {
            self.start_time = v;
        }
        if let Some(v) = update.end_time {
            self.end_time = v;
        }
        if let Some(v) = violations.non_null("personnel_number", update.personnel_number) {
            self.personnel_number = v.trim().to_string();
        }
        if let Some(v) = violations.non_null("operation_code", update.operation_code) {
            self.operation_code = v.trim().to_string();
        }
        if let Some(v) = violations.non_null("quantity_good", update.quantity_good) {
            self.quantity_good = v;
        }
        if let Some(v) = violations.non_null("quantity_reject", update.quantity_reject) {
            self.quantity_reject = v;
        }
        if let Some(v) = violations.non_null("status", update.status) {
            self.status = v;
        }
        if let Some(v) = update.comment {
            self.comment = normalize_optional(v);
        }
        violations.into_vec()
    }

    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.required_text("personnel_number", &self.personnel_number, 50);
        v.required_text("operation_code", &self.operation_code, 50);
        v.non_negative_i64("quantity_good", Some(self.quantity_good));
        v.non_negative_i64("quantity_reject", Some(self.quantity_reject));
        v.optional_text("comment", self.comment.as_deref(), 250);
        if let Some(end) = self.end_time {
            if end < self.start_time {
                v.push("end_time", "结束时间不能早于开始时间");
            }
        }
        v.into_vec()
    }

    /// 是否已分配ID
    pub fn has_id(&self) -> bool {
        self.id > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_json() -> &'static str {
        r#"{
            "start_time": "2024-02-15T06:30:00",
            "end_time": "2024-02-15T14:30:00",
            "personnel_number": "1000",
            "operation_code": "OP-10",
            "quantity_good": 120,
            "quantity_reject": 3,
            "comment": "Schicht sauber abgeschlossen"
        }"#
    }

    #[test]
    fn test_create_defaults_and_validation() {
        let input: ActivityRecordCreate = serde_json::from_str(create_json()).unwrap();
        let record = ActivityRecord::from(input);
        assert_eq!(record.status, ActivityStatus::Completed);
        assert!(!record.has_id());
        assert!(record.validate().is_empty());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let input: ActivityRecordCreate = serde_json::from_str(create_json()).unwrap();
        let mut record = ActivityRecord::from(input);
        let update: ActivityRecordUpdate =
            serde_json::from_str(r#"{"end_time": "2024-02-15T05:00:00"}"#).unwrap();
        record.apply(update);

        let violations = record.validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "end_time");
    }

    #[test]
    fn test_update_can_clear_end_time() {
        let input: ActivityRecordCreate = serde_json::from_str(create_json()).unwrap();
        let mut record = ActivityRecord::from(input);
        let update: ActivityRecordUpdate = serde_json::from_str(r#"{"end_time": null}"#).unwrap();
        assert_eq!(update.end_time, Some(None));
        record.apply(update);
        assert_eq!(record.end_time, None);

        let untouched: ActivityRecordUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.end_time, None);
    }

    #[test]
    fn test_timestamp_serialized_without_fraction() {
        let input: ActivityRecordCreate = serde_json::from_str(create_json()).unwrap();
        let record = ActivityRecord::from(input);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["start_time"], "2024-02-15T06:30:00");
        assert_eq!(json["status"], "completed");
    }

    #[test]
    fn test_negative_quantities_rejected() {
        let input: ActivityRecordCreate = serde_json::from_str(create_json()).unwrap();
        let mut record = ActivityRecord::from(input);
        record.quantity_reject = -1;
        assert_eq!(record.validate()[0].field, "quantity_reject");
    }
}
