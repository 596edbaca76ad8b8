// ==========================================
// 教务系统 - 应用层
// ==========================================
// 职责: 应用级状态装配（CLI 入口使用）
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
