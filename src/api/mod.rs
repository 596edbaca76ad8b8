// ==========================================
// 教务系统 - API 层
// ==========================================
// 职责: 对上层（CLI / GUI）暴露业务接口
// ==========================================

pub mod error;
pub mod randomizer_api;

pub use error::{ApiError, ApiResult};
pub use randomizer_api::{GenerateOptions, RandomizerApi};
