// ==========================================
// 教务系统 - 随机成绩生成统计报表
// ==========================================
// 用途: 批次内增量累计, 仅在提交成功后返回
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// RuleReport - 单条规则统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleReport {
    pub rule_label: String,
    pub candidates_found: usize,      // 候选日期数量（解析器输出）
    pub requested_grades: usize,      // 抽取到的目标数量
    pub created: usize,
    pub updated: usize,
    pub skipped_existing: usize,      // 已有成绩而跳过
    pub skipped_no_candidates: usize, // 无候选日期
    pub skipped_absence: usize,       // 候选日期已有缺勤
    pub skipped_satisfied: usize,     // 覆写模式下目标已满足的新日期
    pub lecture_forbidden: usize,     // 讲座禁止打分
}

// ==========================================
// D1RandomizerStats - 批次统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct D1RandomizerStats {
    pub created_total: usize,
    pub updated_total: usize,
    pub skipped_existing_total: usize,
    pub skipped_lecture_forbidden: usize,
    pub students_processed: usize,
    pub rules_dropped: usize,
    pub created_by_subject: BTreeMap<String, usize>,
    pub per_rule: Vec<RuleReport>,
}

impl D1RandomizerStats {
    /// 按规则标签初始化报表（顺序与规则目录一致）
    pub fn with_rules<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            per_rule: labels
                .into_iter()
                .map(|rule_label| RuleReport {
                    rule_label,
                    ..RuleReport::default()
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn record_created(&mut self, rule_slot: usize, subject_name: &str) {
        self.created_total += 1;
        *self
            .created_by_subject
            .entry(subject_name.to_string())
            .or_insert(0) += 1;
        if let Some(report) = self.per_rule.get_mut(rule_slot) {
            report.created += 1;
        }
    }

    pub fn record_updated(&mut self, rule_slot: usize) {
        self.updated_total += 1;
        if let Some(report) = self.per_rule.get_mut(rule_slot) {
            report.updated += 1;
        }
    }

    pub fn record_skipped_existing(&mut self, rule_slot: usize, count: usize) {
        self.skipped_existing_total += count;
        if let Some(report) = self.per_rule.get_mut(rule_slot) {
            report.skipped_existing += count;
        }
    }

    pub fn record_lecture_forbidden(&mut self, rule_slot: usize) {
        self.skipped_lecture_forbidden += 1;
        if let Some(report) = self.per_rule.get_mut(rule_slot) {
            report.lecture_forbidden += 1;
        }
    }

    pub fn rule_mut(&mut self, rule_slot: usize) -> Option<&mut RuleReport> {
        self.per_rule.get_mut(rule_slot)
    }
}

impl fmt::Display for D1RandomizerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "新建: {}, 更新: {}, 已有跳过: {}, 讲座禁止: {}, 学生: {}, 丢弃规则: {}",
            self.created_total,
            self.updated_total,
            self.skipped_existing_total,
            self.skipped_lecture_forbidden,
            self.students_processed,
            self.rules_dropped,
        )?;
        for (subject, count) in &self.created_by_subject {
            writeln!(f, "  科目 {}: 新建 {}", subject, count)?;
        }
        for r in &self.per_rule {
            writeln!(
                f,
                "  规则 [{}] 候选={} 请求={} 新建={} 更新={} 已有={} 无候选={} 缺勤={} 已满足={} 讲座={}",
                r.rule_label,
                r.candidates_found,
                r.requested_grades,
                r.created,
                r.updated,
                r.skipped_existing,
                r.skipped_no_candidates,
                r.skipped_absence,
                r.skipped_satisfied,
                r.lecture_forbidden,
            )?;
        }
        Ok(())
    }
}
