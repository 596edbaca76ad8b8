// ==========================================
// 教务系统 - 配置层
// ==========================================
// 职责: 成绩生成参数管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod randomizer_config_trait;
pub mod settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use randomizer_config_trait::RandomizerConfigReader;
pub use settings::{RandomizerSettings, DEFAULT_LECTURE_LESSON_TYPES};
