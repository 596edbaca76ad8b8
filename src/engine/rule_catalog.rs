// ==========================================
// 教务系统 - 成绩规则目录
// ==========================================
// 职责: 提供有序规则列表, 规范化并解析科目ID
// 来源: 内置目录 / JSON 文件 / 构造参数
// 红线: 科目无法解析的规则被静默丢弃, 不是错误
// ==========================================

use crate::domain::{BiasPolicy, GradeRule, ResolvedRule};
use crate::engine::error::{RandomizerError, RandomizerResult};
use crate::repository::{RepositoryResult, ScheduleProvider};
use std::fmt;
use std::path::Path;

// ==========================================
// DropReason - 规则被丢弃的原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    EmptyName,         // 科目名或课程类型为空
    UnknownSubject,    // 科目表中不存在
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::EmptyName => write!(f, "EMPTY_NAME"),
            DropReason::UnknownSubject => write!(f, "UNKNOWN_SUBJECT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRule {
    pub index: usize,
    pub label: String,
    pub reason: DropReason,
}

/// 规则解析结果
#[derive(Debug, Clone, Default)]
pub struct CatalogResolution {
    pub resolved: Vec<ResolvedRule>,
    pub dropped: Vec<DroppedRule>,
}

// ==========================================
// RuleCatalog - 规则目录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCatalog {
    rules: Vec<GradeRule>,
}

impl RuleCatalog {
    pub fn from_rules(rules: Vec<GradeRule>) -> Self {
        Self { rules }
    }

    /// 从 JSON 数组加载
    pub fn from_json_str(json: &str) -> RandomizerResult<Self> {
        let rules: Vec<GradeRule> =
            serde_json::from_str(json).map_err(|e| RandomizerError::RuleCatalog(e.to_string()))?;
        Ok(Self::from_rules(rules))
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> RandomizerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            RandomizerError::RuleCatalog(format!("无法读取 {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn rules(&self) -> &[GradeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_json_pretty(&self) -> RandomizerResult<String> {
        serde_json::to_string_pretty(&self.rules)
            .map_err(|e| RandomizerError::RuleCatalog(e.to_string()))
    }

    /// 规范化全部规则并解析科目ID（保持目录顺序）
    ///
    /// # 返回
    /// - Ok(CatalogResolution): 可用规则 + 被丢弃规则
    /// - Err: 科目查询失败（存储错误）
    pub fn resolve<P>(&self, provider: &P) -> RepositoryResult<CatalogResolution>
    where
        P: ScheduleProvider + ?Sized,
    {
        let mut resolution = CatalogResolution::default();

        for (index, raw) in self.rules.iter().enumerate() {
            let rule = match raw.normalized() {
                Some(rule) => rule,
                None => {
                    resolution.dropped.push(DroppedRule {
                        index,
                        label: raw.label(),
                        reason: DropReason::EmptyName,
                    });
                    continue;
                }
            };

            match provider.resolve_subject_id(&rule.subject_name)? {
                Some(subject_id) => resolution.resolved.push(ResolvedRule {
                    rule,
                    subject_id,
                    index,
                }),
                None => resolution.dropped.push(DroppedRule {
                    index,
                    label: rule.label(),
                    reason: DropReason::UnknownSubject,
                }),
            }
        }

        Ok(resolution)
    }

    // ==========================================
    // 内置目录
    // ==========================================
    // ЛК = 讲座, ПЗ = 实践课, ЛР = 实验课
    pub fn builtin() -> Self {
        fn rule(
            subject: &str,
            lesson_type: &str,
            counts: (i32, i32),
            grades: (i32, i32),
            bias: BiasPolicy,
            fixed_grade: Option<i32>,
        ) -> GradeRule {
            GradeRule {
                subject_name: subject.to_string(),
                lesson_type: lesson_type.to_string(),
                allow_lecture: false,
                min_count: counts.0,
                max_count: counts.1,
                min_grade: grades.0,
                max_grade: grades.1,
                bias,
                fixed_grade,
            }
        }

        Self::from_rules(vec![
            rule("БД", "ЛР", (4, 6), (4, 9), BiasPolicy::None, None),
            rule("БД", "ПЗ", (2, 3), (5, 10), BiasPolicy::OftenGe8, None),
            rule("ОАиП", "ЛР", (5, 7), (4, 10), BiasPolicy::Often9To10, None),
            rule("ОАиП", "ПЗ", (1, 2), (6, 10), BiasPolicy::None, None),
            rule("ООП", "ЛР", (4, 6), (5, 10), BiasPolicy::Often10, None),
            rule("Математика", "ПЗ", (3, 5), (3, 9), BiasPolicy::None, None),
            rule("Физика", "ЛР", (3, 4), (4, 8), BiasPolicy::None, None),
            rule("Физика", "ПЗ", (1, 2), (4, 9), BiasPolicy::OftenGe8, None),
            rule("Английский язык", "ПЗ", (2, 4), (6, 10), BiasPolicy::Often9To10, None),
            rule("Физкультура", "ПЗ", (2, 3), (9, 9), BiasPolicy::Fixed, Some(9)),
            rule("Философия", "ЛК", (1, 1), (5, 8), BiasPolicy::None, None),
        ])
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
