// ==========================================
// 教务系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 范围: 随机成绩生成 (D1 Randomizer) 及其所需的课表/成绩数据访问
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{BiasPolicy, GRADE_MAX, GRADE_MIN, WHOLE_GROUP};

// 领域实体
pub use domain::{D1RandomizerStats, GradeRule, RuleReport, Student};

// 引擎
pub use engine::{D1Randomizer, RandomizerError, RuleCatalog};

// 仓储接口
pub use repository::{JournalStore, ScheduleProvider};

// API
pub use api::{ApiError, GenerateOptions, RandomizerApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
