// ==========================================
// 教务系统 - 已有成绩对账
// ==========================================
// 输入: 已有成绩、候选日期、缺勤日期、目标数量、覆写标志
// 输出: 需要抽取的日期数量与可选日期池
// 规则:
// - 候选为空 → 无候选（常见情况，不是错误）
// - 缺勤日期一律移出候选池（无论是否覆写）
// - 不覆写: 已有成绩的日期移出候选池, 抽取数 = max(0, 目标 - 已有)
// - 覆写:   抽取数 = 目标, 已有日期原地更新
// - 抽取数为 0 → 已满足
// ==========================================

use crate::domain::ExistingGrade;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilePlan {
    NoCandidates,
    AlreadySatisfied,
    Pick { pool: Vec<NaiveDate>, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub plan: ReconcilePlan,
    /// 去重后的已有成绩日期数
    pub existing_count: usize,
    pub remaining_to_create: usize,
    /// 因缺勤移出的候选日期数
    pub excluded_absence: usize,
}

/// 已有成绩日期（去重，忽略空日期）
pub fn existing_grade_dates(grades: &[ExistingGrade]) -> BTreeSet<NaiveDate> {
    grades.iter().filter_map(|g| g.date).collect()
}

pub fn reconcile(
    existing_dates: &BTreeSet<NaiveDate>,
    candidates: &[NaiveDate],
    absence_dates: &BTreeSet<NaiveDate>,
    target_count: usize,
    overwrite: bool,
) -> Reconciliation {
    let existing_count = existing_dates.len();
    let remaining_to_create = target_count.saturating_sub(existing_count);

    if candidates.is_empty() {
        return Reconciliation {
            plan: ReconcilePlan::NoCandidates,
            existing_count,
            remaining_to_create,
            excluded_absence: 0,
        };
    }

    let mut excluded_absence = 0;
    let mut pool = Vec::with_capacity(candidates.len());
    for date in candidates {
        if absence_dates.contains(date) {
            excluded_absence += 1;
            continue;
        }
        if !overwrite && existing_dates.contains(date) {
            continue;
        }
        pool.push(*date);
    }

    let count = if overwrite {
        target_count
    } else {
        remaining_to_create
    };

    let plan = if count == 0 {
        ReconcilePlan::AlreadySatisfied
    } else {
        ReconcilePlan::Pick { pool, count }
    };

    Reconciliation {
        plan,
        existing_count,
        remaining_to_create,
        excluded_absence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    fn set(days: &[u32]) -> BTreeSet<NaiveDate> {
        days.iter().map(|x| d(*x)).collect()
    }

    fn grade(date: Option<NaiveDate>) -> ExistingGrade {
        ExistingGrade {
            value: 7,
            date,
            grade_type: "ЛР".to_string(),
        }
    }

    #[test]
    fn test_existing_dates_dedup_and_skip_empty() {
        let dates = existing_grade_dates(&[grade(Some(d(3))), grade(None), grade(Some(d(3)))]);
        assert_eq!(dates, set(&[3]));
    }

    #[test]
    fn test_empty_candidates() {
        let r = reconcile(&set(&[]), &[], &set(&[]), 3, false);
        assert_eq!(r.plan, ReconcilePlan::NoCandidates);
        assert_eq!(r.remaining_to_create, 3);
    }

    #[test]
    fn test_incremental_removes_graded_dates() {
        let candidates = vec![d(1), d(8), d(15), d(22)];
        let r = reconcile(&set(&[8]), &candidates, &set(&[]), 3, false);
        assert_eq!(
            r.plan,
            ReconcilePlan::Pick {
                pool: vec![d(1), d(15), d(22)],
                count: 2
            }
        );
    }

    #[test]
    fn test_incremental_already_satisfied() {
        let r = reconcile(&set(&[1, 8]), &[d(1), d(8)], &set(&[]), 2, false);
        assert_eq!(r.plan, ReconcilePlan::AlreadySatisfied);
        assert_eq!(r.existing_count, 2);
    }

    #[test]
    fn test_overwrite_keeps_graded_dates_and_requests_full_target() {
        let candidates = vec![d(1), d(8)];
        let r = reconcile(&set(&[1, 8]), &candidates, &set(&[]), 2, true);
        assert_eq!(
            r.plan,
            ReconcilePlan::Pick {
                pool: candidates,
                count: 2
            }
        );
    }

    #[test]
    fn test_absence_dates_excluded_regardless_of_overwrite() {
        let candidates = vec![d(1), d(8)];
        for overwrite in [false, true] {
            let r = reconcile(&set(&[]), &candidates, &set(&[8]), 1, overwrite);
            assert_eq!(r.excluded_absence, 1);
            assert_eq!(
                r.plan,
                ReconcilePlan::Pick {
                    pool: vec![d(1)],
                    count: 1
                }
            );
        }
    }
}
