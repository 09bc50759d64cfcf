// ==========================================
// IWS BDE 系统 - HTTP 服务主入口
// ==========================================
// 技术栈: axum + Rust + SQLite
// 配置: 环境变量 / .env（见 config::AppConfig）
// ==========================================

use anyhow::Context;
use iws_bde::app::{build_router, AppState};
use iws_bde::config::AppConfig;
use iws_bde::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", iws_bde::APP_NAME);
    tracing::info!("系统版本: {}", iws_bde::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env().context("读取配置失败")?;
    tracing::info!("使用数据库: {}", config.db_path);

    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
        }
    }

    // 创建AppState
    let app_state = AppState::new(config.db_path.clone()).map_err(anyhow::Error::msg)?;
    tracing::info!("AppState初始化成功");

    let app = build_router(app_state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("无法监听地址: {}", addr))?;
    tracing::info!("HTTP 服务已启动: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("服务已退出");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("无法监听 Ctrl+C 信号: {}", e);
    }
    tracing::info!("收到退出信号，正在停止服务");
}
