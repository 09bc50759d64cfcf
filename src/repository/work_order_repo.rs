// ==========================================
// IWS BDE 系统 - 生产工单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 删除策略: 存在下属工序时禁止删除 (RESTRICT)
// ==========================================

use crate::domain::filters::WorkOrderFilter;
use crate::domain::types::{format_date, parse_date, WorkOrderStatus};
use crate::domain::work_order::WorkOrder;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::{parse_text_column, FilterBuilder};
use crate::repository::upsert::UpsertOutcome;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT order_number, customer, article, quantity, due_date, status
    FROM work_orders
"#;

fn map_row(row: &Row) -> rusqlite::Result<WorkOrder> {
    let due_date = row
        .get::<_, Option<String>>(4)?
        .map(|raw| parse_text_column(4, &raw, parse_date))
        .transpose()?;
    let status: String = row.get(5)?;

    Ok(WorkOrder {
        order_number: row.get(0)?,
        customer: row.get(1)?,
        article: row.get(2)?,
        quantity: row.get(3)?,
        due_date,
        status: parse_text_column(5, &status, WorkOrderStatus::from_str)?,
    })
}

fn find_in(conn: &Connection, order_number: &str) -> RepositoryResult<Option<WorkOrder>> {
    let sql = format!("{} WHERE order_number = ?1", SELECT_COLUMNS);
    Ok(conn
        .query_row(&sql, params![order_number], map_row)
        .optional()?)
}

fn insert_in(conn: &Connection, order: &WorkOrder) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO work_orders (order_number, customer, article, quantity, due_date, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            order.order_number,
            order.customer,
            order.article,
            order.quantity,
            order.due_date.as_ref().map(format_date),
            order.status.to_db_str(),
        ],
    )?;
    Ok(())
}

fn update_in(conn: &Connection, order: &WorkOrder) -> RepositoryResult<usize> {
    Ok(conn.execute(
        r#"
        UPDATE work_orders
        SET customer = ?2, article = ?3, quantity = ?4, due_date = ?5, status = ?6
        WHERE order_number = ?1
        "#,
        params![
            order.order_number,
            order.customer,
            order.article,
            order.quantity,
            order.due_date.as_ref().map(format_date),
            order.status.to_db_str(),
        ],
    )?)
}

// ==========================================
// WorkOrderRepository - 工单仓储
// ==========================================
pub struct WorkOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkOrderRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, order: &WorkOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_in(&conn, order)
    }

    pub fn find_by_key(&self, order_number: &str) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;
        find_in(&conn, order_number)
    }

    pub fn exists(&self, order_number: &str) -> RepositoryResult<bool> {
        Ok(self.find_by_key(order_number)?.is_some())
    }

    pub fn list(&self, filter: &WorkOrderFilter) -> RepositoryResult<Vec<WorkOrder>> {
        let mut builder = FilterBuilder::new();
        builder
            .push(
                "status",
                "=",
                filter.status.map(|s| Value::Text(s.to_db_str().to_string())),
            )
            .eq_text("customer", filter.customer.as_deref());
        let sql = builder.build(SELECT_COLUMNS, "order_number ASC");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(params_from_iter(builder.values()), map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }

    pub fn update(&self, order: &WorkOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if update_in(&conn, order)? == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WorkOrder".to_string(),
                key: order.order_number.clone(),
            });
        }
        Ok(())
    }

    pub fn upsert(&self, order: &WorkOrder) -> RepositoryResult<UpsertOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let outcome = match find_in(&tx, &order.order_number)? {
            None => {
                insert_in(&tx, order)?;
                UpsertOutcome::Inserted
            }
            Some(current) if &current == order => UpsertOutcome::Unchanged,
            Some(_) => {
                update_in(&tx, order)?;
                UpsertOutcome::Updated
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// 删除工单（存在下属工序时拒绝）
    pub fn delete(&self, order_number: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if find_in(&tx, order_number)?.is_none() {
            return Err(RepositoryError::NotFound {
                entity: "WorkOrder".to_string(),
                key: order_number.to_string(),
            });
        }

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM operations WHERE order_number = ?1",
            params![order_number],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(RepositoryError::DependentRecordsExist {
                entity: "WorkOrder".to_string(),
                key: order_number.to_string(),
                dependent: "Operation".to_string(),
                count,
            });
        }

        tx.execute(
            "DELETE FROM work_orders WHERE order_number = ?1",
            params![order_number],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use chrono::NaiveDate;

    fn setup_repo() -> WorkOrderRepository {
        WorkOrderRepository::new(Arc::new(Mutex::new(open_in_memory().unwrap())))
    }

    fn make_order(number: &str, status: WorkOrderStatus) -> WorkOrder {
        WorkOrder {
            order_number: number.to_string(),
            customer: Some("Automotive AG".to_string()),
            article: Some("Welle".to_string()),
            quantity: Some(500),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            status,
        }
    }

    #[test]
    fn test_round_trip_keeps_date_and_status() {
        let repo = setup_repo();
        let order = make_order("WO-2024-001", WorkOrderStatus::Released);
        repo.insert(&order).unwrap();
        assert_eq!(repo.find_by_key("WO-2024-001").unwrap(), Some(order));
    }

    #[test]
    fn test_list_filters_by_status() {
        let repo = setup_repo();
        repo.insert(&make_order("WO-1", WorkOrderStatus::Open)).unwrap();
        repo.insert(&make_order("WO-2", WorkOrderStatus::Completed)).unwrap();

        let filter = WorkOrderFilter {
            status: Some(WorkOrderStatus::Completed),
            customer: None,
        };
        let done = repo.list(&filter).unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].order_number, "WO-2");
    }

    #[test]
    fn test_negative_quantity_rejected_by_check() {
        let repo = setup_repo();
        let mut order = make_order("WO-1", WorkOrderStatus::Open);
        order.quantity = Some(-1);
        assert!(matches!(
            repo.insert(&order),
            Err(RepositoryError::CheckConstraintViolation(_))
        ));
    }
}
