// ==========================================
// 教务系统 - 引擎层
// ==========================================
// 职责: 随机成绩生成 (D1 Randomizer) 的规则与算法
// 红线: Engine 不拼 SQL, 所有跳过必须记入统计
// ==========================================

pub mod candidate_dates;
pub mod count_picker;
pub mod date_picker;
pub mod error;
pub mod grade_generator;
pub mod randomizer;
pub mod reconciliation;
pub mod rule_catalog;

// 重导出核心引擎
pub use candidate_dates::{CandidateDateResolver, CandidateQuery};
pub use count_picker::pick_count;
pub use date_picker::pick_distinct_dates;
pub use error::{RandomizerError, RandomizerResult};
pub use grade_generator::{generate_grade, OFTEN_10_PROBABILITY};
pub use randomizer::D1Randomizer;
pub use reconciliation::{existing_grade_dates, reconcile, ReconcilePlan, Reconciliation};
pub use rule_catalog::{CatalogResolution, DropReason, DroppedRule, RuleCatalog};
