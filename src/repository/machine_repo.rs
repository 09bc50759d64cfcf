// ==========================================
// IWS BDE 系统 - 设备数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 删除策略: 被工序引用时禁止删除 (RESTRICT)
// ==========================================

use crate::domain::filters::MachineFilter;
use crate::domain::machine::Machine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::FilterBuilder;
use crate::repository::upsert::UpsertOutcome;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT code, name, description, location, active
    FROM machines
"#;

fn map_row(row: &Row) -> rusqlite::Result<Machine> {
    Ok(Machine {
        code: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        active: row.get(4)?,
    })
}

fn find_in(conn: &Connection, code: &str) -> RepositoryResult<Option<Machine>> {
    let sql = format!("{} WHERE code = ?1", SELECT_COLUMNS);
    Ok(conn.query_row(&sql, params![code], map_row).optional()?)
}

fn insert_in(conn: &Connection, machine: &Machine) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO machines (code, name, description, location, active)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            machine.code,
            machine.name,
            machine.description,
            machine.location,
            machine.active,
        ],
    )?;
    Ok(())
}

fn update_in(conn: &Connection, machine: &Machine) -> RepositoryResult<usize> {
    Ok(conn.execute(
        r#"
        UPDATE machines
        SET name = ?2, description = ?3, location = ?4, active = ?5
        WHERE code = ?1
        "#,
        params![
            machine.code,
            machine.name,
            machine.description,
            machine.location,
            machine.active,
        ],
    )?)
}

// ==========================================
// MachineRepository - 设备仓储
// ==========================================
pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, machine: &Machine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_in(&conn, machine)
    }

    pub fn find_by_key(&self, code: &str) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;
        find_in(&conn, code)
    }

    pub fn exists(&self, code: &str) -> RepositoryResult<bool> {
        Ok(self.find_by_key(code)?.is_some())
    }

    pub fn list(&self, filter: &MachineFilter) -> RepositoryResult<Vec<Machine>> {
        let mut builder = FilterBuilder::new();
        builder
            .eq_bool("active", filter.active)
            .eq_text("location", filter.location.as_deref());
        let sql = builder.build(SELECT_COLUMNS, "code ASC");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let machines = stmt
            .query_map(params_from_iter(builder.values()), map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(machines)
    }

    pub fn update(&self, machine: &Machine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if update_in(&conn, machine)? == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Machine".to_string(),
                key: machine.code.clone(),
            });
        }
        Ok(())
    }

    pub fn upsert(&self, machine: &Machine) -> RepositoryResult<UpsertOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let outcome = match find_in(&tx, &machine.code)? {
            None => {
                insert_in(&tx, machine)?;
                UpsertOutcome::Inserted
            }
            Some(current) if &current == machine => UpsertOutcome::Unchanged,
            Some(_) => {
                update_in(&tx, machine)?;
                UpsertOutcome::Updated
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// 删除设备（存在引用该设备的工序时拒绝）
    pub fn delete(&self, code: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if find_in(&tx, code)?.is_none() {
            return Err(RepositoryError::NotFound {
                entity: "Machine".to_string(),
                key: code.to_string(),
            });
        }

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM operations WHERE machine_code = ?1",
            params![code],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(RepositoryError::DependentRecordsExist {
                entity: "Machine".to_string(),
                key: code.to_string(),
                dependent: "Operation".to_string(),
                count,
            });
        }

        tx.execute("DELETE FROM machines WHERE code = ?1", params![code])?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn setup() -> (Arc<Mutex<Connection>>, MachineRepository) {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        (conn.clone(), MachineRepository::new(conn))
    }

    fn make_machine(code: &str, location: &str) -> Machine {
        Machine {
            code: code.to_string(),
            name: "CNC Drehmaschine".to_string(),
            description: None,
            location: Some(location.to_string()),
            active: true,
        }
    }

    #[test]
    fn test_list_filters_by_location() {
        let (_conn, repo) = setup();
        repo.insert(&make_machine("M-02", "Halle B")).unwrap();
        repo.insert(&make_machine("M-01", "Halle A")).unwrap();

        let all = repo.list(&MachineFilter::default()).unwrap();
        assert_eq!(all[0].code, "M-01");

        let filter = MachineFilter {
            active: None,
            location: Some("Halle B".to_string()),
        };
        let hall_b = repo.list(&filter).unwrap();
        assert_eq!(hall_b.len(), 1);
        assert_eq!(hall_b[0].code, "M-02");
    }

    #[test]
    fn test_delete_blocked_by_operation() {
        let (conn, repo) = setup();
        repo.insert(&make_machine("M-01", "Halle A")).unwrap();
        {
            let c = conn.lock().unwrap();
            c.execute_batch(
                "INSERT INTO work_orders (order_number, status) VALUES ('WO-1', 'open');
                 INSERT INTO operations (code, order_number, machine_code, is_active)
                 VALUES ('OP-10', 'WO-1', 'M-01', 1);",
            )
            .unwrap();
        }

        let err = repo.delete("M-01").unwrap_err();
        match err {
            RepositoryError::DependentRecordsExist { dependent, count, .. } => {
                assert_eq!(dependent, "Operation");
                assert_eq!(count, 1);
            }
            other => panic!("Expected DependentRecordsExist, got {:?}", other),
        }
        assert!(repo.exists("M-01").unwrap());
    }

    #[test]
    fn test_upsert_unchanged_does_not_write() {
        let (_conn, repo) = setup();
        let machine = make_machine("M-01", "Halle A");
        assert_eq!(repo.upsert(&machine).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(repo.upsert(&machine).unwrap(), UpsertOutcome::Unchanged);
    }
}
