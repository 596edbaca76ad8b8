// ==========================================
// 教务系统 - D1 随机成绩生成编排器
// ==========================================
// 用途: 对一个组的全部学生 × 全部规则生成成绩
// 流程:
//   1. 规范化规则并解析科目ID（不可解析的规则丢弃）
//   2. 加载组内学生
//   3. 开启单一事务
//   4. 学生(外层) × 规则(内层):
//      数量抽取 → 讲座检查 → 已有成绩 + 候选日期 → 对账 → 日期抽取 → 成绩值 → 写入
//   5. 任一存储错误 → 整体回滚
//   6. 成功 → 提交并返回统计
// 红线: 部分写入绝不提交
// ==========================================

use crate::config::RandomizerSettings;
use crate::domain::{D1RandomizerStats, GradeKey, ResolvedRule, Student, UpsertOutcome};
use crate::engine::candidate_dates::{CandidateDateResolver, CandidateQuery};
use crate::engine::count_picker::pick_count;
use crate::engine::date_picker::pick_distinct_dates;
use crate::engine::error::{RandomizerError, RandomizerResult};
use crate::engine::grade_generator::generate_grade;
use crate::engine::reconciliation::{existing_grade_dates, reconcile, ReconcilePlan};
use crate::engine::rule_catalog::RuleCatalog;
use crate::repository::{JournalStore, RepositoryResult, ScheduleProvider};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 单次批量调用的参数
#[derive(Debug, Clone, Copy)]
struct BatchScope {
    group_id: i64,
    semester_id: i64,
    overwrite: bool,
}

// ==========================================
// D1Randomizer - 随机成绩生成引擎
// ==========================================
// 随机数生成器归引擎实例所有；并发调用应各自持有实例
pub struct D1Randomizer<P, S>
where
    P: ScheduleProvider + ?Sized,
    S: JournalStore + ?Sized,
{
    schedule: Arc<P>,
    store: Arc<S>,
    catalog: RuleCatalog,
    settings: RandomizerSettings,
    seed: u64,
    rng: StdRng,
}

impl<P, S> D1Randomizer<P, S>
where
    P: ScheduleProvider + ?Sized,
    S: JournalStore + ?Sized,
{
    /// 创建引擎；种子取 settings.seed，缺省使用时钟
    pub fn new(
        schedule: Arc<P>,
        store: Arc<S>,
        catalog: RuleCatalog,
        settings: RandomizerSettings,
    ) -> Self {
        let seed = settings.seed.unwrap_or_else(clock_seed);
        Self::with_seed(schedule, store, catalog, settings, seed)
    }

    /// 以固定种子创建引擎（结果可复现）
    pub fn with_seed(
        schedule: Arc<P>,
        store: Arc<S>,
        catalog: RuleCatalog,
        settings: RandomizerSettings,
        seed: u64,
    ) -> Self {
        Self {
            schedule,
            store,
            catalog,
            settings,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// 为一个组生成成绩
    ///
    /// # 参数
    /// - group_id: 组ID (> 0)
    /// - semester_id: 学期ID (> 0)
    /// - overwrite: 是否覆写已有成绩
    ///
    /// # 返回
    /// - Ok(D1RandomizerStats): 已提交
    /// - Err(Validation): 参数非法，未开启事务
    /// - Err(Storage / RollbackFailed): 存储失败，已回滚
    pub fn generate_for_group(
        &mut self,
        group_id: i64,
        semester_id: i64,
        overwrite: bool,
    ) -> RandomizerResult<D1RandomizerStats> {
        if group_id <= 0 {
            return Err(RandomizerError::Validation(format!(
                "group_id 必须为正数: {}",
                group_id
            )));
        }
        if semester_id <= 0 {
            return Err(RandomizerError::Validation(format!(
                "semester_id 必须为正数: {}",
                semester_id
            )));
        }

        let scope = BatchScope {
            group_id,
            semester_id,
            overwrite,
        };
        info!(
            group_id,
            semester_id,
            overwrite,
            seed = self.seed,
            rules = self.catalog.len(),
            "开始生成随机成绩"
        );

        // ==========================================
        // 步骤1: 规则规范化与科目解析
        // ==========================================
        let resolution = self.catalog.resolve(self.schedule.as_ref())?;
        for dropped in &resolution.dropped {
            warn!(
                index = dropped.index,
                rule = %dropped.label,
                reason = %dropped.reason,
                "规则已丢弃"
            );
        }

        // ==========================================
        // 步骤2: 加载学生
        // ==========================================
        let students = self.store.list_group_students(group_id)?;
        debug!(students = students.len(), rules = resolution.resolved.len(), "批次范围");

        let mut stats = D1RandomizerStats::with_rules(
            resolution.resolved.iter().map(|r| r.rule.label()),
        );
        stats.rules_dropped = resolution.dropped.len();

        // ==========================================
        // 步骤3-6: 单一事务
        // ==========================================
        self.store.begin_transaction()?;

        let outcome = self
            .run_batch(scope, &students, &resolution.resolved, &mut stats)
            .and_then(|()| self.store.commit());

        match outcome {
            Ok(()) => {
                info!(
                    created = stats.created_total,
                    updated = stats.updated_total,
                    skipped_existing = stats.skipped_existing_total,
                    lecture_forbidden = stats.skipped_lecture_forbidden,
                    "随机成绩生成完成"
                );
                Ok(stats)
            }
            Err(cause) => {
                warn!(error = %cause, group_id, semester_id, "随机成绩生成失败，回滚事务");
                match self.store.rollback() {
                    Ok(()) => Err(RandomizerError::Storage(cause)),
                    Err(rollback) => Err(RandomizerError::RollbackFailed { cause, rollback }),
                }
            }
        }
    }

    fn run_batch(
        &mut self,
        scope: BatchScope,
        students: &[Student],
        rules: &[ResolvedRule],
        stats: &mut D1RandomizerStats,
    ) -> RepositoryResult<()> {
        let schedule = Arc::clone(&self.schedule);
        let mut resolver = CandidateDateResolver::new(schedule.as_ref());

        for student in students {
            for (slot, rule) in rules.iter().enumerate() {
                self.apply_rule(scope, student, slot, rule, &mut resolver, stats)?;
            }
            stats.students_processed += 1;
        }
        Ok(())
    }

    /// 对单个 (学生, 规则) 执行生成
    fn apply_rule(
        &mut self,
        scope: BatchScope,
        student: &Student,
        slot: usize,
        resolved: &ResolvedRule,
        resolver: &mut CandidateDateResolver<'_, P>,
        stats: &mut D1RandomizerStats,
    ) -> RepositoryResult<()> {
        let rule = &resolved.rule;

        // a. 目标数量
        let target = pick_count(&mut self.rng, rule.min_count, rule.max_count);
        if target == 0 {
            return Ok(());
        }

        // b. 讲座不打分（覆写也不例外）
        if !rule.allow_lecture && self.settings.is_lecture(&rule.lesson_type) {
            debug!(student_id = student.student_id, rule = %rule.label(), "讲座禁止打分");
            stats.record_lecture_forbidden(slot);
            return Ok(());
        }

        // c. 已有成绩 + 候选日期 → 对账
        let existing = self.store.list_grades(
            student.student_id,
            resolved.subject_id,
            scope.semester_id,
        )?;
        let existing_dates = existing_grade_dates(&existing);

        let candidates = resolver.resolve(&CandidateQuery {
            group_id: scope.group_id,
            student_subgroup: student.subgroup,
            subject_id: resolved.subject_id,
            lesson_type: &rule.lesson_type,
            semester_id: scope.semester_id,
        })?;
        let absence_dates =
            self.absence_dates(student.student_id, resolved.subject_id, scope.semester_id, &candidates)?;

        let reconciliation = reconcile(
            &existing_dates,
            &candidates,
            &absence_dates,
            target,
            scope.overwrite,
        );

        if let Some(report) = stats.rule_mut(slot) {
            report.candidates_found += candidates.len();
            report.requested_grades += target;
            report.skipped_absence += reconciliation.excluded_absence;
        }

        let (pool, pick) = match reconciliation.plan {
            ReconcilePlan::NoCandidates => {
                debug!(student_id = student.student_id, rule = %rule.label(), "无候选日期");
                if let Some(report) = stats.rule_mut(slot) {
                    report.skipped_no_candidates += 1;
                }
                return Ok(());
            }
            ReconcilePlan::AlreadySatisfied => {
                debug!(
                    student_id = student.student_id,
                    rule = %rule.label(),
                    existing = reconciliation.existing_count,
                    target,
                    "目标已满足"
                );
                stats.record_skipped_existing(slot, reconciliation.existing_count.min(target));
                return Ok(());
            }
            ReconcilePlan::Pick { pool, count } => (pool, count),
        };

        // d. 抽取日期
        let dates = pick_distinct_dates(&mut self.rng, &pool, pick);

        // e. 逐日期写入
        let mut filled = reconciliation.existing_count;
        for date in dates {
            let value = generate_grade(&mut self.rng, rule);
            let key = GradeKey {
                student_id: student.student_id,
                subject_id: resolved.subject_id,
                semester_id: scope.semester_id,
                date,
            };

            let exists = self.store.find_grade_id(&key)?.is_some();
            if exists && !scope.overwrite {
                stats.record_skipped_existing(slot, 1);
                continue;
            }
            // 覆写只刷新已有行，不把数量推高到目标之上
            if scope.overwrite && !exists && filled >= target {
                if let Some(report) = stats.rule_mut(slot) {
                    report.skipped_satisfied += 1;
                }
                continue;
            }

            match self.store.upsert_grade(&key, value, &rule.lesson_type)? {
                UpsertOutcome::Created => {
                    filled += 1;
                    stats.record_created(slot, &rule.subject_name);
                }
                UpsertOutcome::Updated => stats.record_updated(slot),
            }
        }

        Ok(())
    }

    /// 候选日期中已有缺勤的日期
    fn absence_dates(
        &self,
        student_id: i64,
        subject_id: i64,
        semester_id: i64,
        candidates: &[NaiveDate],
    ) -> RepositoryResult<BTreeSet<NaiveDate>> {
        let mut dates = BTreeSet::new();
        for date in candidates {
            let key = GradeKey {
                student_id,
                subject_id,
                semester_id,
                date: *date,
            };
            if self.store.find_absence_id(&key)?.is_some() {
                dates.insert(*date);
            }
        }
        Ok(dates)
    }
}

/// 时钟种子（纳秒）
fn clock_seed() -> u64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .map(|n| n as u64)
        .unwrap_or_else(|| now.timestamp_micros() as u64)
}
