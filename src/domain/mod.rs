// ==========================================
// 教务系统 - 领域模型层
// ==========================================
// 职责: 定义规则、课表、成绩簿实体与统计报表
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod journal;
pub mod rule;
pub mod stats;
pub mod types;

// 重导出核心类型
pub use journal::{CalendarWeek, ExistingGrade, GradeKey, ScheduledLesson, Semester, Student, UpsertOutcome};
pub use rule::{clamp_grade, GradeRule, ResolvedRule};
pub use stats::{D1RandomizerStats, RuleReport};
pub use types::{subgroup_matches, BiasPolicy, GRADE_MAX, GRADE_MIN, WHOLE_GROUP};
