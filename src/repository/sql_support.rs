// ==========================================
// IWS BDE 系统 - SQL 构建与列转换工具
// ==========================================
// 职责: 可选过滤条件的动态 WHERE 拼接；TEXT 列与领域类型互转
// 约束: 值一律参数化绑定，列名只来自代码常量
// ==========================================

use rusqlite::types::{Type, Value};
use std::fmt::Display;

/// 动态过滤条件构建器
#[derive(Debug, Default)]
pub struct FilterBuilder {
    conditions: Vec<String>,
    values: Vec<Value>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加 `column <op> ?`（值为 None 时跳过）
    pub fn push(&mut self, column: &str, op: &str, value: Option<Value>) -> &mut Self {
        if let Some(v) = value {
            self.values.push(v);
            self.conditions
                .push(format!("{} {} ?{}", column, op, self.values.len()));
        }
        self
    }

    pub fn eq_text(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Value::Text(v.to_string()));
        self.push(column, "=", value)
    }

    pub fn eq_bool(&mut self, column: &str, value: Option<bool>) -> &mut Self {
        self.push(column, "=", value.map(|v| Value::Integer(v as i64)))
    }

    /// 构建完整 SQL
    ///
    /// # 示例
    /// ```
    /// use iws_bde::repository::sql_support::FilterBuilder;
    ///
    /// let mut filter = FilterBuilder::new();
    /// filter.eq_text("department", Some("Produktion")).eq_bool("active", None);
    /// assert_eq!(
    ///     filter.build("SELECT * FROM employees", "personnel_number ASC"),
    ///     "SELECT * FROM employees WHERE department = ?1 ORDER BY personnel_number ASC"
    /// );
    /// ```
    pub fn build(&self, base_query: &str, order_by_clause: &str) -> String {
        if self.conditions.is_empty() {
            format!("{} ORDER BY {}", base_query, order_by_clause)
        } else {
            format!(
                "{} WHERE {} ORDER BY {}",
                base_query,
                self.conditions.join(" AND "),
                order_by_clause
            )
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// 将 TEXT 列解析为领域类型，解析失败转为 rusqlite 列转换错误
pub fn parse_text_column<T, E, F>(idx: usize, raw: &str, parser: F) -> rusqlite::Result<T>
where
    F: FnOnce(&str) -> Result<T, E>,
    E: Display,
{
    parser(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("列 {} 值 '{}' 无法解析: {}", idx, raw, e).into(),
        )
    })
}
