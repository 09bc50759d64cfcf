// ==========================================
// IWS BDE 系统 - 字段映射器
// ==========================================
// 职责: CSV 行 ↔ 领域实体（单元格类型转换）
// 约定:
// - 空白单元格 → None / 默认值
// - 布尔: true/false、1/0、yes/no、ja/nein（不区分大小写）
// - 日期 YYYY-MM-DD；时间戳 YYYY-MM-DDThh:mm:ss
// - 导出列顺序严格按 EntityKind::csv_columns
// ==========================================

use crate::domain::activity_record::ActivityRecord;
use crate::domain::employee::Employee;
use crate::domain::machine::Machine;
use crate::domain::operation::Operation;
use crate::domain::types::{
    format_date, format_datetime, parse_date, parse_datetime, EntityKind,
};
use crate::domain::work_order::WorkOrder;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::CsvRow;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Display;
use std::str::FromStr;

/// 实体与 CSV 行的双向映射
pub trait CsvMapping: Sized {
    const KIND: EntityKind;

    /// 从 CSV 行构造实体（只做类型转换，业务校验由 API 层负责）
    fn from_csv_row(row: &CsvRow) -> ImportResult<Self>;

    /// 按契约列顺序输出单元格
    fn to_csv_record(&self) -> Vec<String>;
}

// ==========================================
// FieldMapper - 单元格读取与类型转换
// ==========================================
pub struct FieldMapper<'a> {
    row: &'a CsvRow,
}

impl<'a> FieldMapper<'a> {
    pub fn new(row: &'a CsvRow) -> Self {
        Self { row }
    }

    /// 可选文本（空白 → None）
    pub fn text(&self, field: &str) -> Option<String> {
        self.row.get(field).map(str::to_string)
    }

    /// 必填文本（空白 → 空串，由实体校验报告）
    pub fn required_text(&self, field: &str) -> String {
        self.text(field).unwrap_or_default()
    }

    pub fn parse_bool(&self, field: &str, default: bool) -> ImportResult<bool> {
        match self.row.get(field) {
            None => Ok(default),
            Some(raw) => match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" | "y" | "ja" | "j" => Ok(true),
                "false" | "0" | "no" | "n" | "nein" => Ok(false),
                _ => Err(conversion_error(field, format!("无法解析为布尔值: {}", raw))),
            },
        }
    }

    pub fn parse_i64(&self, field: &str) -> ImportResult<Option<i64>> {
        self.parse_with(field, |raw| raw.parse::<i64>(), "整数")
    }

    pub fn parse_f64(&self, field: &str) -> ImportResult<Option<f64>> {
        self.parse_with(field, |raw| raw.parse::<f64>(), "浮点数")
    }

    pub fn parse_date(&self, field: &str) -> ImportResult<Option<NaiveDate>> {
        match self.row.get(field) {
            None => Ok(None),
            Some(raw) => parse_date(raw)
                .map(Some)
                .map_err(|e| conversion_error(field, e)),
        }
    }

    pub fn parse_datetime(&self, field: &str) -> ImportResult<Option<NaiveDateTime>> {
        match self.row.get(field) {
            None => Ok(None),
            Some(raw) => parse_datetime(raw)
                .map(Some)
                .map_err(|e| conversion_error(field, e)),
        }
    }

    /// 枚举字段（空白 → 默认值）
    pub fn parse_enum<T>(&self, field: &str) -> ImportResult<T>
    where
        T: FromStr + Default,
        T::Err: Display,
    {
        match self.row.get(field) {
            None => Ok(T::default()),
            Some(raw) => raw.parse::<T>().map_err(|e| conversion_error(field, e)),
        }
    }

    fn parse_with<T, E>(
        &self,
        field: &str,
        parse: impl FnOnce(&str) -> Result<T, E>,
        type_name: &str,
    ) -> ImportResult<Option<T>> {
        match self.row.get(field) {
            None => Ok(None),
            Some(raw) => parse(raw).map(Some).map_err(|_| {
                conversion_error(field, format!("无法解析为{}: {}", type_name, raw))
            }),
        }
    }
}

fn conversion_error(field: &str, message: impl Display) -> ImportError {
    ImportError::TypeConversionError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ==========================================
// 导出单元格格式化
// ==========================================

fn opt_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_display<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

// ==========================================
// 各实体映射
// ==========================================

impl CsvMapping for Employee {
    const KIND: EntityKind = EntityKind::Employees;

    fn from_csv_row(row: &CsvRow) -> ImportResult<Self> {
        let m = FieldMapper::new(row);
        Ok(Employee {
            personnel_number: m.required_text("personnel_number"),
            first_name: m.required_text("first_name"),
            last_name: m.required_text("last_name"),
            department: m.text("department"),
            role: m.text("role"),
            active: m.parse_bool("active", true)?,
        })
    }

    fn to_csv_record(&self) -> Vec<String> {
        vec![
            self.personnel_number.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            opt_text(&self.department),
            opt_text(&self.role),
            self.active.to_string(),
        ]
    }
}

impl CsvMapping for Machine {
    const KIND: EntityKind = EntityKind::Machines;

    fn from_csv_row(row: &CsvRow) -> ImportResult<Self> {
        let m = FieldMapper::new(row);
        Ok(Machine {
            code: m.required_text("code"),
            name: m.required_text("name"),
            description: m.text("description"),
            location: m.text("location"),
            active: m.parse_bool("active", true)?,
        })
    }

    fn to_csv_record(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            opt_text(&self.description),
            opt_text(&self.location),
            self.active.to_string(),
        ]
    }
}

impl CsvMapping for WorkOrder {
    const KIND: EntityKind = EntityKind::WorkOrders;

    fn from_csv_row(row: &CsvRow) -> ImportResult<Self> {
        let m = FieldMapper::new(row);
        Ok(WorkOrder {
            order_number: m.required_text("order_number"),
            customer: m.text("customer"),
            article: m.text("article"),
            quantity: m.parse_i64("quantity")?,
            due_date: m.parse_date("due_date")?,
            status: m.parse_enum("status")?,
        })
    }

    fn to_csv_record(&self) -> Vec<String> {
        vec![
            self.order_number.clone(),
            opt_text(&self.customer),
            opt_text(&self.article),
            opt_display(&self.quantity),
            self.due_date.as_ref().map(format_date).unwrap_or_default(),
            self.status.to_string(),
        ]
    }
}

impl CsvMapping for Operation {
    const KIND: EntityKind = EntityKind::Operations;

    fn from_csv_row(row: &CsvRow) -> ImportResult<Self> {
        let m = FieldMapper::new(row);
        Ok(Operation {
            code: m.required_text("code"),
            description: m.text("description"),
            order_number: m.required_text("order_number"),
            machine_code: m.text("machine_code"),
            standard_time_minutes: m.parse_f64("standard_time_minutes")?,
            is_active: m.parse_bool("is_active", true)?,
        })
    }

    fn to_csv_record(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            opt_text(&self.description),
            self.order_number.clone(),
            opt_text(&self.machine_code),
            // f64 的 Display 为最短可回读表示
            opt_display(&self.standard_time_minutes),
            self.is_active.to_string(),
        ]
    }
}

impl CsvMapping for ActivityRecord {
    const KIND: EntityKind = EntityKind::ActivityRecords;

    fn from_csv_row(row: &CsvRow) -> ImportResult<Self> {
        let m = FieldMapper::new(row);

        let id = match m.parse_i64("id")? {
            None => 0,
            Some(id) if id > 0 => id,
            Some(id) => return Err(conversion_error("id", format!("必须为正整数: {}", id))),
        };
        let start_time = m
            .parse_datetime("start_time")?
            .ok_or_else(|| conversion_error("start_time", "不能为空"))?;

        Ok(ActivityRecord {
            id,
            start_time,
            end_time: m.parse_datetime("end_time")?,
            personnel_number: m.required_text("personnel_number"),
            operation_code: m.required_text("operation_code"),
            quantity_good: m.parse_i64("quantity_good")?.unwrap_or(0),
            quantity_reject: m.parse_i64("quantity_reject")?.unwrap_or(0),
            status: m.parse_enum("status")?,
            comment: m.text("comment"),
        })
    }

    fn to_csv_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            format_datetime(&self.start_time),
            self.end_time.as_ref().map(format_datetime).unwrap_or_default(),
            self.personnel_number.clone(),
            self.operation_code.clone(),
            self.quantity_good.to_string(),
            self.quantity_reject.to_string(),
            self.status.to_string(),
            opt_text(&self.comment),
        ]
    }
}
