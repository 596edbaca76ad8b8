// ==========================================
// 教务系统 - 成绩生成规则领域模型
// ==========================================
// 职责: GradeRule 声明式策略 + 规范化
// 红线: 规则不可变, 每次调用加载一次
// ==========================================

use crate::domain::types::{BiasPolicy, GRADE_MAX, GRADE_MIN};
use serde::{Deserialize, Serialize};

// ==========================================
// GradeRule - 成绩生成规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRule {
    pub subject_name: String,        // 科目名称
    pub lesson_type: String,         // 课程类型 (ЛР / ПЗ / ЛК ...)
    #[serde(default)]
    pub allow_lecture: bool,         // 是否允许给讲座打分
    pub min_count: i32,              // 每名学生成绩数量下限
    pub max_count: i32,              // 每名学生成绩数量上限
    pub min_grade: i32,              // 成绩下限
    pub max_grade: i32,              // 成绩上限
    #[serde(default)]
    pub bias: BiasPolicy,            // 偏置策略
    #[serde(default)]
    pub fixed_grade: Option<i32>,    // 固定值 (仅 Fixed 使用)
}

impl GradeRule {
    /// 规则标签，用于日志与统计
    pub fn label(&self) -> String {
        format!("{} / {}", self.subject_name, self.lesson_type)
    }

    /// 规范化规则
    ///
    /// # 规则
    /// - 科目名与课程类型去除首尾空白，任一为空 → None（规则被丢弃）
    /// - 成绩区间与固定值钳制到 [0, 10]
    /// - 数量区间保持原值，由数量抽取器处理退化情况
    pub fn normalized(&self) -> Option<GradeRule> {
        let subject_name = self.subject_name.trim();
        let lesson_type = self.lesson_type.trim();
        if subject_name.is_empty() || lesson_type.is_empty() {
            return None;
        }

        Some(GradeRule {
            subject_name: subject_name.to_string(),
            lesson_type: lesson_type.to_string(),
            allow_lecture: self.allow_lecture,
            min_count: self.min_count,
            max_count: self.max_count,
            min_grade: clamp_grade(self.min_grade),
            max_grade: clamp_grade(self.max_grade),
            bias: self.bias,
            fixed_grade: self.fixed_grade.map(clamp_grade),
        })
    }
}

/// 钳制成绩到 [0, 10]
pub fn clamp_grade(value: i32) -> i32 {
    value.clamp(GRADE_MIN, GRADE_MAX)
}

// ==========================================
// ResolvedRule - 已解析科目ID的规则
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRule {
    pub rule: GradeRule,
    pub subject_id: i64,
    /// 在目录中的序号（统计报表按此对齐）
    pub index: usize,
}
