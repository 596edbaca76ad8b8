// ==========================================
// 教务系统 - 引擎层错误类型
// ==========================================
// 分类:
// - 校验错误: 事务开启前直接返回
// - 存储错误: 批次致命, 触发回滚
// - 领域跳过: 记入统计报表, 不是错误
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RandomizerError {
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("存储失败: {0}")]
    Storage(#[from] RepositoryError),

    #[error("存储失败: {cause}; 回滚同样失败: {rollback}")]
    RollbackFailed {
        cause: RepositoryError,
        rollback: RepositoryError,
    },

    #[error("规则目录无效: {0}")]
    RuleCatalog(String),
}

pub type RandomizerResult<T> = Result<T, RandomizerError>;
