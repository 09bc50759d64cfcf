// ==========================================
// IWS BDE 系统 - 应用层
// ==========================================
// 职责: 装配共享状态，并通过 axum 暴露 HTTP 接口
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::build_router;
pub use state::AppState;
