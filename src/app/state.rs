// ==========================================
// 教务系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ApiResult, RandomizerApi};
use crate::db::open_sqlite_connection;

/// 应用状态
///
/// 所有 API 共享同一个数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 随机成绩生成 API
    pub randomizer_api: Arc<RandomizerApi>,
}

impl AppState {
    /// 打开数据库、确保 schema 并创建所有 API 实例
    pub fn new(db_path: String) -> ApiResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseError(format!("无法打开数据库 {}: {}", db_path, e)))?;
        let conn = Arc::new(Mutex::new(conn));

        let randomizer_api = Arc::new(RandomizerApi::from_connection(conn));
        randomizer_api.init_schema()?;

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            randomizer_api,
        })
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SCHOOL_JOURNAL_DB_PATH（非空时）
/// - 用户数据目录/school-journal/school_journal.db
/// - 回退: ./school_journal.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("SCHOOL_JOURNAL_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./school_journal.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("school-journal");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("school_journal.db");
        }
    }

    path.to_string_lossy().to_string()
}
