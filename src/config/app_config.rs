// ==========================================
// IWS BDE 系统 - 运行配置
// ==========================================
// 来源: 环境变量（可由 .env 文件提供，dotenvy 加载）
// - IWS_BDE_DB_PATH: SQLite 文件路径（默认: 用户数据目录/iws-bde/iws_bde.db）
// - IWS_BDE_HOST:    监听地址（默认: 0.0.0.0）
// - IWS_BDE_PORT:    监听端口（默认: 8000）
// ==========================================

use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "IWS_BDE_DB_PATH";
pub const ENV_HOST: &str = "IWS_BDE_HOST";
pub const ENV_PORT: &str = "IWS_BDE_PORT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
const DB_FILE_NAME: &str = "iws_bde.db";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// 从进程环境读取（先尝试加载 .env）
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("已加载 .env: {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（空白值视为未设置）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get(ENV_PORT) {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: ENV_PORT.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            })?,
        };

        Ok(Self {
            db_path: get(ENV_DB_PATH).unwrap_or_else(default_db_path),
            host: get(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// 监听地址 `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 默认数据库路径
///
/// 用户数据目录/iws-bde/iws_bde.db；取不到数据目录时回退到 ./iws_bde.db
///
/// 只计算路径，不创建目录（由启动流程负责）
pub fn default_db_path() -> String {
    let path = match dirs::data_dir() {
        Some(data_dir) => data_dir.join("iws-bde").join(DB_FILE_NAME),
        None => PathBuf::from(".").join(DB_FILE_NAME),
    };
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert!(config.db_path.ends_with("iws_bde.db"));
    }

    #[test]
    fn test_default_db_path_does_not_create_dir() {
        let dir = dirs::data_dir().map(|d| d.join("iws-bde"));
        let existed = dir.as_ref().map(|d| d.exists()).unwrap_or(true);

        assert!(default_db_path().ends_with(DB_FILE_NAME));
        if let Some(dir) = dir {
            assert_eq!(dir.exists(), existed);
        }
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/bde.db"),
            (ENV_HOST, "127.0.0.1"),
            (ENV_PORT, " 9090 "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, "/tmp/bde.db");
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_invalid_port() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_PORT, "achtzig")])).unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }
}
