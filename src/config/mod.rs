// ==========================================
// IWS BDE 系统 - 配置层
// ==========================================
// 职责: 读取运行配置（环境变量 / .env）
// ==========================================

pub mod app_config;

// 重导出
pub use app_config::{default_db_path, AppConfig, ConfigError};
