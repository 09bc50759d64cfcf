// ==========================================
// IWS BDE 系统 - 员工 API
// ==========================================
// 职责: 员工主数据的增删改查；导入时的单行写入
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::ensure_valid;
use crate::domain::employee::{Employee, EmployeeCreate, EmployeeUpdate};
use crate::domain::filters::EmployeeFilter;
use crate::repository::employee_repo::EmployeeRepository;
use crate::repository::upsert::UpsertOutcome;

/// 员工 API
pub struct EmployeeApi {
    employee_repo: Arc<EmployeeRepository>,
}

impl EmployeeApi {
    pub fn new(employee_repo: Arc<EmployeeRepository>) -> Self {
        Self { employee_repo }
    }

    /// 创建员工
    ///
    /// # 返回
    /// - `Err(ApiError::ValidationError)`: 字段校验失败
    /// - `Err(ApiError::DuplicateKey)`: 人员编号已存在
    pub fn create(&self, input: EmployeeCreate) -> ApiResult<Employee> {
        let employee = Employee::from(input);
        ensure_valid(employee.validate())?;

        if self.employee_repo.exists(&employee.personnel_number)? {
            return Err(ApiError::DuplicateKey(format!(
                "Employee '{}' 已存在",
                employee.personnel_number
            )));
        }

        self.employee_repo.insert(&employee)?;
        info!(personnel_number = %employee.personnel_number, "员工已创建");
        Ok(employee)
    }

    pub fn get(&self, personnel_number: &str) -> ApiResult<Employee> {
        self.employee_repo
            .find_by_key(personnel_number)?
            .ok_or_else(|| ApiError::NotFound(format!("Employee '{}' 不存在", personnel_number)))
    }

    pub fn list(&self, filter: &EmployeeFilter) -> ApiResult<Vec<Employee>> {
        let employees = self.employee_repo.list(filter)?;
        debug!(count = employees.len(), "查询员工列表");
        Ok(employees)
    }

    /// 部分更新（仅覆盖请求中出现的字段）
    pub fn update(&self, personnel_number: &str, update: EmployeeUpdate) -> ApiResult<Employee> {
        let mut employee = self.get(personnel_number)?;
        let mut violations = employee.apply(update);
        violations.extend(employee.validate());
        ensure_valid(violations)?;

        self.employee_repo.update(&employee)?;
        info!(personnel_number = %employee.personnel_number, "员工已更新");
        Ok(employee)
    }

    pub fn delete(&self, personnel_number: &str) -> ApiResult<()> {
        self.employee_repo.delete(personnel_number)?;
        info!(personnel_number = %personnel_number, "员工已删除");
        Ok(())
    }

    /// 按业务键写入（CSV 导入）
    pub fn upsert(&self, employee: &Employee) -> ApiResult<UpsertOutcome> {
        ensure_valid(employee.validate())?;
        Ok(self.employee_repo.upsert(employee)?)
    }
}
