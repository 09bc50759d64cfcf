// ==========================================
// IWS BDE 系统 - Upsert 结果
// ==========================================

use serde::{Deserialize, Serialize};

/// 按业务键写入的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// 业务键不存在，已新建
    Inserted,
    /// 业务键已存在且内容变化，已覆盖
    Updated,
    /// 业务键已存在且内容一致，未写入
    Unchanged,
}
