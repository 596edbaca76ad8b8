// ==========================================
// 教务系统 - 领域类型定义
// ==========================================
// 依据: D1 Randomizer 规则目录 - 偏置策略
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 成绩取值下限
pub const GRADE_MIN: i32 = 0;
/// 成绩取值上限
pub const GRADE_MAX: i32 = 10;

// ==========================================
// 偏置策略 (Bias Policy)
// ==========================================
// 决定单个成绩值的抽样分布
// 序列化格式与规则文件一致: None / Often10 / Often9_10 / OftenGE8 / Fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BiasPolicy {
    #[default]
    None, // 区间内均匀
    Often10, // 70% 概率取 10
    #[serde(rename = "Often9_10")]
    Often9To10, // 9、10 权重 35，其余 10
    #[serde(rename = "OftenGE8")]
    OftenGe8, // >=8 权重 25，其余 10
    Fixed, // 固定值
}

impl fmt::Display for BiasPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BiasPolicy::None => write!(f, "None"),
            BiasPolicy::Often10 => write!(f, "Often10"),
            BiasPolicy::Often9To10 => write!(f, "Often9_10"),
            BiasPolicy::OftenGe8 => write!(f, "OftenGE8"),
            BiasPolicy::Fixed => write!(f, "Fixed"),
        }
    }
}

// ==========================================
// 子组 (Subgroup)
// ==========================================
// 0 = 全组, 1/2 = 子组

/// 全组（对所有子组生效）
pub const WHOLE_GROUP: i32 = 0;

/// 课程子组与学生子组是否兼容
///
/// # 规则
/// - 课程子组为 0 → 对所有学生生效
/// - 学生子组为 0 → 参加所有子组课程
/// - 否则两者必须相等
pub fn subgroup_matches(lesson_subgroup: i32, student_subgroup: i32) -> bool {
    lesson_subgroup == WHOLE_GROUP
        || student_subgroup == WHOLE_GROUP
        || lesson_subgroup == student_subgroup
}
