// ==========================================
// IWS BDE 系统 - 工序数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 删除策略: 被报工记录引用时禁止删除 (RESTRICT)
// ==========================================

use crate::domain::filters::OperationFilter;
use crate::domain::operation::Operation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::FilterBuilder;
use crate::repository::upsert::UpsertOutcome;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT code, description, order_number, machine_code, standard_time_minutes, is_active
    FROM operations
"#;

fn map_row(row: &Row) -> rusqlite::Result<Operation> {
    Ok(Operation {
        code: row.get(0)?,
        description: row.get(1)?,
        order_number: row.get(2)?,
        machine_code: row.get(3)?,
        standard_time_minutes: row.get(4)?,
        is_active: row.get(5)?,
    })
}

fn find_in(conn: &Connection, code: &str) -> RepositoryResult<Option<Operation>> {
    let sql = format!("{} WHERE code = ?1", SELECT_COLUMNS);
    Ok(conn.query_row(&sql, params![code], map_row).optional()?)
}

fn insert_in(conn: &Connection, operation: &Operation) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO operations (
            code, description, order_number, machine_code, standard_time_minutes, is_active
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            operation.code,
            operation.description,
            operation.order_number,
            operation.machine_code,
            operation.standard_time_minutes,
            operation.is_active,
        ],
    )?;
    Ok(())
}

fn update_in(conn: &Connection, operation: &Operation) -> RepositoryResult<usize> {
    Ok(conn.execute(
        r#"
        UPDATE operations
        SET description = ?2, order_number = ?3, machine_code = ?4,
            standard_time_minutes = ?5, is_active = ?6
        WHERE code = ?1
        "#,
        params![
            operation.code,
            operation.description,
            operation.order_number,
            operation.machine_code,
            operation.standard_time_minutes,
            operation.is_active,
        ],
    )?)
}

// ==========================================
// OperationRepository - 工序仓储
// ==========================================
pub struct OperationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OperationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入工序
    ///
    /// 工单/设备不存在时由外键约束拒绝（ForeignKeyViolation）
    pub fn insert(&self, operation: &Operation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_in(&conn, operation)
    }

    pub fn find_by_key(&self, code: &str) -> RepositoryResult<Option<Operation>> {
        let conn = self.get_conn()?;
        find_in(&conn, code)
    }

    pub fn exists(&self, code: &str) -> RepositoryResult<bool> {
        Ok(self.find_by_key(code)?.is_some())
    }

    pub fn list(&self, filter: &OperationFilter) -> RepositoryResult<Vec<Operation>> {
        let mut builder = FilterBuilder::new();
        builder
            .eq_text("order_number", filter.order_number.as_deref())
            .eq_text("machine_code", filter.machine_code.as_deref())
            .eq_bool("is_active", filter.is_active);
        let sql = builder.build(SELECT_COLUMNS, "code ASC");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let operations = stmt
            .query_map(params_from_iter(builder.values()), map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(operations)
    }

    pub fn update(&self, operation: &Operation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if update_in(&conn, operation)? == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Operation".to_string(),
                key: operation.code.clone(),
            });
        }
        Ok(())
    }

    pub fn upsert(&self, operation: &Operation) -> RepositoryResult<UpsertOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let outcome = match find_in(&tx, &operation.code)? {
            None => {
                insert_in(&tx, operation)?;
                UpsertOutcome::Inserted
            }
            Some(current) if &current == operation => UpsertOutcome::Unchanged,
            Some(_) => {
                update_in(&tx, operation)?;
                UpsertOutcome::Updated
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// 删除工序（存在报工记录时拒绝）
    pub fn delete(&self, code: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if find_in(&tx, code)?.is_none() {
            return Err(RepositoryError::NotFound {
                entity: "Operation".to_string(),
                key: code.to_string(),
            });
        }

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM activity_records WHERE operation_code = ?1",
            params![code],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(RepositoryError::DependentRecordsExist {
                entity: "Operation".to_string(),
                key: code.to_string(),
                dependent: "ActivityRecord".to_string(),
                count,
            });
        }

        tx.execute("DELETE FROM operations WHERE code = ?1", params![code])?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn setup_repo() -> OperationRepository {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO work_orders (order_number, status) VALUES ('WO-1', 'open');
             INSERT INTO work_orders (order_number, status) VALUES ('WO-2', 'open');
             INSERT INTO machines (code, name, active) VALUES ('M-01', 'Fräse', 1);",
        )
        .unwrap();
        OperationRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn make_operation(code: &str, order: &str, machine: Option<&str>) -> Operation {
        Operation {
            code: code.to_string(),
            description: Some("Fräsen".to_string()),
            order_number: order.to_string(),
            machine_code: machine.map(str::to_string),
            standard_time_minutes: Some(12.5),
            is_active: true,
        }
    }

    #[test]
    fn test_insert_without_machine() {
        let repo = setup_repo();
        let operation = make_operation("OP-10", "WO-1", None);
        repo.insert(&operation).unwrap();
        assert_eq!(repo.find_by_key("OP-10").unwrap(), Some(operation));
    }

    #[test]
    fn test_insert_with_unknown_parent_violates_fk() {
        let repo = setup_repo();
        let err = repo
            .insert(&make_operation("OP-10", "WO-404", Some("M-01")))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));

        let err = repo
            .insert(&make_operation("OP-11", "WO-1", Some("M-404")))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }

    #[test]
    fn test_list_by_order_number() {
        let repo = setup_repo();
        repo.insert(&make_operation("OP-20", "WO-2", None)).unwrap();
        repo.insert(&make_operation("OP-10", "WO-1", Some("M-01"))).unwrap();
        repo.insert(&make_operation("OP-11", "WO-1", None)).unwrap();

        let filter = OperationFilter {
            order_number: Some("WO-1".to_string()),
            ..Default::default()
        };
        let codes: Vec<_> = repo
            .list(&filter)
            .unwrap()
            .into_iter()
            .map(|op| op.code)
            .collect();
        assert_eq!(codes, vec!["OP-10", "OP-11"]);
    }

    #[test]
    fn test_upsert_detects_changes() {
        let repo = setup_repo();
        let mut operation = make_operation("OP-10", "WO-1", None);
        assert_eq!(repo.upsert(&operation).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(repo.upsert(&operation).unwrap(), UpsertOutcome::Unchanged);
        operation.standard_time_minutes = Some(15.0);
        assert_eq!(repo.upsert(&operation).unwrap(), UpsertOutcome::Updated);
    }
}
