// ==========================================
// IWS BDE 系统 - 员工数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 删除策略: 被报工记录引用时禁止删除 (RESTRICT)
// ==========================================

use crate::domain::employee::Employee;
use crate::domain::filters::EmployeeFilter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::FilterBuilder;
use crate::repository::upsert::UpsertOutcome;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT personnel_number, first_name, last_name, department, role, active
    FROM employees
"#;

fn map_row(row: &Row) -> rusqlite::Result<Employee> {
    Ok(Employee {
        personnel_number: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        department: row.get(3)?,
        role: row.get(4)?,
        active: row.get(5)?,
    })
}

fn find_in(conn: &Connection, personnel_number: &str) -> RepositoryResult<Option<Employee>> {
    let sql = format!("{} WHERE personnel_number = ?1", SELECT_COLUMNS);
    Ok(conn
        .query_row(&sql, params![personnel_number], map_row)
        .optional()?)
}

fn insert_in(conn: &Connection, employee: &Employee) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO employees (personnel_number, first_name, last_name, department, role, active)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            employee.personnel_number,
            employee.first_name,
            employee.last_name,
            employee.department,
            employee.role,
            employee.active,
        ],
    )?;
    Ok(())
}

fn update_in(conn: &Connection, employee: &Employee) -> RepositoryResult<usize> {
    Ok(conn.execute(
        r#"
        UPDATE employees
        SET first_name = ?2, last_name = ?3, department = ?4, role = ?5, active = ?6
        WHERE personnel_number = ?1
        "#,
        params![
            employee.personnel_number,
            employee.first_name,
            employee.last_name,
            employee.department,
            employee.role,
            employee.active,
        ],
    )?)
}

// ==========================================
// EmployeeRepository - 员工仓储
// ==========================================
pub struct EmployeeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, employee: &Employee) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_in(&conn, employee)
    }

    pub fn find_by_key(&self, personnel_number: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        find_in(&conn, personnel_number)
    }

    pub fn exists(&self, personnel_number: &str) -> RepositoryResult<bool> {
        Ok(self.find_by_key(personnel_number)?.is_some())
    }

    /// 按过滤条件查询（按人员编号升序）
    pub fn list(&self, filter: &EmployeeFilter) -> RepositoryResult<Vec<Employee>> {
        let mut builder = FilterBuilder::new();
        builder
            .eq_bool("active", filter.active)
            .eq_text("department", filter.department.as_deref());
        let sql = builder.build(SELECT_COLUMNS, "personnel_number ASC");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let employees = stmt
            .query_map(params_from_iter(builder.values()), map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(employees)
    }

    /// 覆盖非业务键字段
    pub fn update(&self, employee: &Employee) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if update_in(&conn, employee)? == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Employee".to_string(),
                key: employee.personnel_number.clone(),
            });
        }
        Ok(())
    }

    /// 按业务键新建或覆盖（单事务）
    pub fn upsert(&self, employee: &Employee) -> RepositoryResult<UpsertOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let outcome = match find_in(&tx, &employee.personnel_number)? {
            None => {
                insert_in(&tx, employee)?;
                UpsertOutcome::Inserted
            }
            Some(current) if &current == employee => UpsertOutcome::Unchanged,
            Some(_) => {
                update_in(&tx, employee)?;
                UpsertOutcome::Updated
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// 删除员工（存在报工记录时拒绝）
    pub fn delete(&self, personnel_number: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if find_in(&tx, personnel_number)?.is_none() {
            return Err(RepositoryError::NotFound {
                entity: "Employee".to_string(),
                key: personnel_number.to_string(),
            });
        }

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM activity_records WHERE personnel_number = ?1",
            params![personnel_number],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(RepositoryError::DependentRecordsExist {
                entity: "Employee".to_string(),
                key: personnel_number.to_string(),
                dependent: "ActivityRecord".to_string(),
                count,
            });
        }

        tx.execute(
            "DELETE FROM employees WHERE personnel_number = ?1",
            params![personnel_number],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn setup_repo() -> EmployeeRepository {
        EmployeeRepository::new(Arc::new(Mutex::new(open_in_memory().unwrap())))
    }

    fn make_employee(number: &str, department: Option<&str>, active: bool) -> Employee {
        Employee {
            personnel_number: number.to_string(),
            first_name: "Max".to_string(),
            last_name: "Mustermann".to_string(),
            department: department.map(str::to_string),
            role: Some("Facharbeiter".to_string()),
            active,
        }
    }

    #[test]
    fn test_insert_and_find_by_key() {
        let repo = setup_repo();
        let employee = make_employee("1000", Some("Produktion"), true);
        repo.insert(&employee).unwrap();

        let found = repo.find_by_key("1000").unwrap();
        assert_eq!(found, Some(employee));
        assert!(repo.find_by_key("9999").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_violates_unique() {
        let repo = setup_repo();
        let employee = make_employee("1000", None, true);
        repo.insert(&employee).unwrap();
        let err = repo.insert(&employee).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_list_with_filters() {
        let repo = setup_repo();
        repo.insert(&make_employee("1002", Some("Montage"), true)).unwrap();
        repo.insert(&make_employee("1001", Some("Produktion"), false)).unwrap();
        repo.insert(&make_employee("1000", Some("Produktion"), true)).unwrap();

        let all = repo.list(&EmployeeFilter::default()).unwrap();
        let numbers: Vec<_> = all.iter().map(|e| e.personnel_number.as_str()).collect();
        assert_eq!(numbers, vec!["1000", "1001", "1002"]);

        let filter = EmployeeFilter {
            active: Some(true),
            department: Some("Produktion".to_string()),
        };
        let filtered = repo.list(&filter).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].personnel_number, "1000");
    }

    #[test]
    fn test_upsert_outcomes() {
        let repo = setup_repo();
        let mut employee = make_employee("1000", None, true);

        assert_eq!(repo.upsert(&employee).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(repo.upsert(&employee).unwrap(), UpsertOutcome::Unchanged);

        employee.role = Some("Teamleiter".to_string());
        assert_eq!(repo.upsert(&employee).unwrap(), UpsertOutcome::Updated);
        assert_eq!(
            repo.find_by_key("1000").unwrap().unwrap().role.as_deref(),
            Some("Teamleiter")
        );
    }

    #[test]
    fn test_update_and_delete_missing_key() {
        let repo = setup_repo();
        let employee = make_employee("404", None, true);
        assert!(matches!(
            repo.update(&employee),
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete("404"),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_unreferenced_employee() {
        let repo = setup_repo();
        repo.insert(&make_employee("1000", None, true)).unwrap();
        repo.delete("1000").unwrap();
        assert!(!repo.exists("1000").unwrap());
    }
}
