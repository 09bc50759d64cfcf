// ==========================================
// IWS BDE 系统 - 设备 API
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::ensure_valid;
use crate::domain::filters::MachineFilter;
use crate::domain::machine::{Machine, MachineCreate, MachineUpdate};
use crate::repository::machine_repo::MachineRepository;
use crate::repository::upsert::UpsertOutcome;

pub struct MachineApi {
    machine_repo: Arc<MachineRepository>,
}

impl MachineApi {
    pub fn new(machine_repo: Arc<MachineRepository>) -> Self {
        Self { machine_repo }
    }

    pub fn create(&self, input: MachineCreate) -> ApiResult<Machine> {
        let machine = Machine::from(input);
        ensure_valid(machine.validate())?;

        if self.machine_repo.exists(&machine.code)? {
            return Err(ApiError::DuplicateKey(format!(
                "Machine '{}' 已存在",
                machine.code
            )));
        }

        self.machine_repo.insert(&machine)?;
        info!(code = %machine.code, "设备已创建");
        Ok(machine)
    }

    pub fn get(&self, code: &str) -> ApiResult<Machine> {
        self.machine_repo
            .find_by_key(code)?
            .ok_or_else(|| ApiError::NotFound(format!("Machine '{}' 不存在", code)))
    }

    pub fn list(&self, filter: &MachineFilter) -> ApiResult<Vec<Machine>> {
        let machines = self.machine_repo.list(filter)?;
        debug!(count = machines.len(), "查询设备列表");
        Ok(machines)
    }

    pub fn update(&self, code: &str, update: MachineUpdate) -> ApiResult<Machine> {
        let mut machine = self.get(code)?;
        let mut violations = machine.apply(update);
        violations.extend(machine.validate());
        ensure_valid(violations)?;

        self.machine_repo.update(&machine)?;
        info!(code = %machine.code, "设备已更新");
        Ok(machine)
    }

    /// 删除设备（被工序引用时返回 ReferentialIntegrity）
    pub fn delete(&self, code: &str) -> ApiResult<()> {
        self.machine_repo.delete(code)?;
        info!(code = %code, "设备已删除");
        Ok(())
    }

    pub fn upsert(&self, machine: &Machine) -> ApiResult<UpsertOutcome> {
        ensure_valid(machine.validate())?;
        Ok(self.machine_repo.upsert(machine)?)
    }
}
