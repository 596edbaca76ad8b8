// ==========================================
// 教务系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod date_field;
pub mod error;
pub mod journal_repo;
pub mod journal_store;
pub mod schedule_provider;
pub mod schedule_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use journal_repo::JournalRepository;
pub use journal_store::JournalStore;
pub use schedule_provider::ScheduleProvider;
pub use schedule_repo::ScheduleRepository;
