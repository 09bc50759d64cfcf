// ==========================================
// IWS BDE 系统 - 生产报工记录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 主键: 自增 id；导入时允许显式指定 id
// 时间存储: TEXT `YYYY-MM-DDThh:mm:ss`（字典序即时间序）
// ==========================================

use crate::domain::activity_record::ActivityRecord;
use crate::domain::filters::ActivityRecordFilter;
use crate::domain::types::{format_datetime, parse_datetime, ActivityStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::{parse_text_column, FilterBuilder};
use crate::repository::upsert::UpsertOutcome;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT id, start_time, end_time, personnel_number, operation_code,
           quantity_good, quantity_reject, status, comment
    FROM activity_records
"#;

fn map_row(row: &Row) -> rusqlite::Result<ActivityRecord> {
    let start_time: String = row.get(1)?;
    let end_time = row
        .get::<_, Option<String>>(2)?
        .map(|raw| parse_text_column(2, &raw, parse_datetime))
        .transpose()?;
    let status: String = row.get(7)?;

    Ok(ActivityRecord {
        id: row.get(0)?,
        start_time: parse_text_column(1, &start_time, parse_datetime)?,
        end_time,
        personnel_number: row.get(3)?,
        operation_code: row.get(4)?,
        quantity_good: row.get(5)?,
        quantity_reject: row.get(6)?,
        status: parse_text_column(7, &status, ActivityStatus::from_str)?,
        comment: row.get(8)?,
    })
}

fn find_in(conn: &Connection, id: i64) -> RepositoryResult<Option<ActivityRecord>> {
    let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
    Ok(conn.query_row(&sql, params![id], map_row).optional()?)
}

/// 插入记录，返回最终 id（未分配 id 时由数据库生成）
fn insert_in(conn: &Connection, record: &ActivityRecord) -> RepositoryResult<i64> {
    let explicit_id = if record.has_id() { Some(record.id) } else { None };
    conn.execute(
        r#"
        INSERT INTO activity_records (
            id, start_time, end_time, personnel_number, operation_code,
            quantity_good, quantity_reject, status, comment
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            explicit_id,
            format_datetime(&record.start_time),
            record.end_time.as_ref().map(format_datetime),
            record.personnel_number,
            record.operation_code,
            record.quantity_good,
            record.quantity_reject,
            record.status.to_db_str(),
            record.comment,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn update_in(conn: &Connection, record: &ActivityRecord) -> RepositoryResult<usize> {
    Ok(conn.execute(
        r#"
        UPDATE activity_records
        SET start_time = ?2, end_time = ?3, personnel_number = ?4, operation_code = ?5,
            quantity_good = ?6, quantity_reject = ?7, status = ?8, comment = ?9
        WHERE id = ?1
        "#,
        params![
            record.id,
            format_datetime(&record.start_time),
            record.end_time.as_ref().map(format_datetime),
            record.personnel_number,
            record.operation_code,
            record.quantity_good,
            record.quantity_reject,
            record.status.to_db_str(),
            record.comment,
        ],
    )?)
}

// ==========================================
// ActivityRecordRepository - 报工记录仓储
// ==========================================
pub struct ActivityRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityRecordRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入报工记录
    ///
    /// # 返回
    /// 新记录的 id
    pub fn insert(&self, record: &ActivityRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        insert_in(&conn, record)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ActivityRecord>> {
        let conn = self.get_conn()?;
        find_in(&conn, id)
    }

    /// 按过滤条件查询（按 id 升序）
    pub fn list(&self, filter: &ActivityRecordFilter) -> RepositoryResult<Vec<ActivityRecord>> {
        let mut builder = FilterBuilder::new();
        builder
            .eq_text("personnel_number", filter.personnel_number.as_deref())
            .eq_text("operation_code", filter.operation_code.as_deref())
            .push(
                "status",
                "=",
                filter.status.map(|s| Value::Text(s.to_db_str().to_string())),
            )
            .push(
                "start_time",
                ">=",
                filter
                    .start_from
                    .as_ref()
                    .map(|t| Value::Text(format_datetime(t))),
            )
            .push(
                "start_time",
                "<=",
                filter
                    .start_to
                    .as_ref()
                    .map(|t| Value::Text(format_datetime(t))),
            );
        let sql = builder.build(SELECT_COLUMNS, "id ASC");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(builder.values()), map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn update(&self, record: &ActivityRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if update_in(&conn, record)? == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ActivityRecord".to_string(),
                key: record.id.to_string(),
            });
        }
        Ok(())
    }

    /// 导入写入（单事务）
    ///
    /// - 无 id → 新建
    /// - 有 id 且存在 → 内容一致则跳过，否则覆盖
    /// - 有 id 但不存在 → 以该 id 新建
    ///
    /// # 返回
    /// (写入结果, 记录 id)
    pub fn upsert(&self, record: &ActivityRecord) -> RepositoryResult<(UpsertOutcome, i64)> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let existing = if record.has_id() {
            find_in(&tx, record.id)?
        } else {
            None
        };

        let result = match existing {
            None => {
                let id = insert_in(&tx, record)?;
                (UpsertOutcome::Inserted, id)
            }
            Some(current) if &current == record => (UpsertOutcome::Unchanged, record.id),
            Some(_) => {
                update_in(&tx, record)?;
                (UpsertOutcome::Updated, record.id)
            }
        };

        tx.commit()?;
        Ok(result)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM activity_records WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ActivityRecord".to_string(),
                key: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use crate::db::open_in_memory;

    fn setup_repo() -> ActivityRecordRepository {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO employees (personnel_number, first_name, last_name, active)
             VALUES ('1000', 'Max', 'Mustermann', 1);
             INSERT INTO employees (personnel_number, first_name, last_name, active)
             VALUES ('1001', 'Erika', 'Musterfrau', 1);
             INSERT INTO work_orders (order_number, status) VALUES ('WO-1', 'open');
             INSERT INTO operations (code, order_number, is_active) VALUES ('OP-10', 'WO-1', 1);",
        )
        .unwrap();
        ActivityRecordRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn ts(raw: &str) -> NaiveDateTime {
        parse_datetime(raw).unwrap()
    }

    fn make_record(personnel: &str, start: &str) -> ActivityRecord {
        ActivityRecord {
            id: 0,
            start_time: ts(start),
            end_time: None,
            personnel_number: personnel.to_string(),
            operation_code: "OP-10".to_string(),
            quantity_good: 10,
            quantity_reject: 1,
            status: ActivityStatus::Completed,
            comment: None,
        }
    }

    #[test]
    fn test_insert_generates_id() {
        let repo = setup_repo();
        let first = repo.insert(&make_record("1000", "2024-01-15T06:00:00")).unwrap();
        let second = repo.insert(&make_record("1000", "2024-01-15T08:00:00")).unwrap();
        assert!(first > 0);
        assert!(second > first);

        let stored = repo.find_by_id(first).unwrap().unwrap();
        assert_eq!(stored.start_time, ts("2024-01-15T06:00:00"));
        assert_eq!(stored.status, ActivityStatus::Completed);
    }

    #[test]
    fn test_end_before_start_rejected_by_check() {
        let repo = setup_repo();
        let mut record = make_record("1000", "2024-01-15T08:00:00");
        record.end_time = Some(ts("2024-01-15T07:00:00"));
        assert!(matches!(
            repo.insert(&record),
            Err(RepositoryError::CheckConstraintViolation(_))
        ));
    }

    #[test]
    fn test_list_with_time_range() {
        let repo = setup_repo();
        repo.insert(&make_record("1000", "2024-01-15T06:00:00")).unwrap();
        repo.insert(&make_record("1001", "2024-01-15T10:00:00")).unwrap();
        repo.insert(&make_record("1000", "2024-01-16T06:00:00")).unwrap();

        let filter = ActivityRecordFilter {
            start_from: Some(ts("2024-01-15T00:00:00")),
            start_to: Some(ts("2024-01-15T23:59:59")),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter).unwrap().len(), 2);

        let filter = ActivityRecordFilter {
            personnel_number: Some("1000".to_string()),
            ..Default::default()
        };
        let records = repo.list(&filter).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].start_time < records[1].start_time);
    }

    #[test]
    fn test_upsert_with_explicit_id() {
        let repo = setup_repo();
        let mut record = make_record("1000", "2024-01-15T06:00:00");
        record.id = 42;

        assert_eq!(repo.upsert(&record).unwrap(), (UpsertOutcome::Inserted, 42));
        assert_eq!(repo.upsert(&record).unwrap(), (UpsertOutcome::Unchanged, 42));

        record.quantity_good = 11;
        assert_eq!(repo.upsert(&record).unwrap(), (UpsertOutcome::Updated, 42));
        assert_eq!(repo.find_by_id(42).unwrap().unwrap().quantity_good, 11);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let repo = setup_repo();
        assert!(matches!(
            repo.delete(7),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
