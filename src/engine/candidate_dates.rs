// ==========================================
// 教务系统 - 候选日期解析
// ==========================================
// 职责: 求出某组/子组/科目/课程类型在学期窗口内实际上课的日期
// 流程:
//   学期窗口 → 相交日历周 → 星期 1-6 → 课表匹配 → 具体日期
// 红线: 任一读取失败整体返回错误（部分结果会污染下游计数）
// ==========================================

use crate::domain::{subgroup_matches, CalendarWeek, ScheduledLesson, Semester};
use crate::repository::{RepositoryResult, ScheduleProvider};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

/// 参与匹配的星期范围（周一至周六）
pub const WEEKDAYS: std::ops::RangeInclusive<u32> = 1..=6;

#[derive(Debug, Clone, Copy)]
pub struct CandidateQuery<'a> {
    pub group_id: i64,
    pub student_subgroup: i32,
    pub subject_id: i64,
    pub lesson_type: &'a str,
    pub semester_id: i64,
}

// ==========================================
// CandidateDateResolver
// ==========================================
// 生命周期: 单次批量调用内有效; 缓存只读查询结果，匹配按学生重新计算
pub struct CandidateDateResolver<'p, P: ScheduleProvider + ?Sized> {
    provider: &'p P,
    weeks: Option<Vec<CalendarWeek>>,
    semesters: HashMap<i64, Semester>,
    lessons: HashMap<(i64, u32, i32), Vec<ScheduledLesson>>,
    subject_ids: HashMap<String, Option<i64>>,
}

impl<'p, P: ScheduleProvider + ?Sized> CandidateDateResolver<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            weeks: None,
            semesters: HashMap::new(),
            lessons: HashMap::new(),
            subject_ids: HashMap::new(),
        }
    }

    /// 解析候选日期（已排序、去重）
    pub fn resolve(&mut self, query: &CandidateQuery<'_>) -> RepositoryResult<Vec<NaiveDate>> {
        let window = self.semester(query.semester_id)?.window();
        let weeks = self.calendar_weeks()?;
        let target_type = query.lesson_type.trim();

        let mut dates = BTreeSet::new();
        for week in &weeks {
            if let Some((start, end)) = window {
                if !week.intersects(start, end) {
                    continue;
                }
            }

            for weekday in WEEKDAYS {
                if !self.slot_matches(query, target_type, weekday, week.cycle_week)? {
                    continue;
                }

                let date = match self.provider.resolve_calendar_date(week.week_id, weekday)? {
                    Some(date) => date,
                    None => continue,
                };
                let inside = window.map_or(true, |(start, end)| date >= start && date <= end);
                if inside {
                    dates.insert(date);
                }
            }
        }

        trace!(
            group_id = query.group_id,
            subject_id = query.subject_id,
            lesson_type = target_type,
            count = dates.len(),
            "候选日期解析完成"
        );
        Ok(dates.into_iter().collect())
    }

    /// (星期, 循环周) 槽位上是否存在匹配课程
    fn slot_matches(
        &mut self,
        query: &CandidateQuery<'_>,
        target_type: &str,
        weekday: u32,
        cycle_week: i32,
    ) -> RepositoryResult<bool> {
        let lessons = self.group_lessons(query.group_id, weekday, cycle_week)?;

        for lesson in &lessons {
            if lesson.lesson_type.trim() != target_type {
                continue;
            }
            if !subgroup_matches(lesson.subgroup, query.student_subgroup) {
                continue;
            }
            if self.subject_id(&lesson.subject_name)? == Some(query.subject_id) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn semester(&mut self, semester_id: i64) -> RepositoryResult<Semester> {
        if let Some(semester) = self.semesters.get(&semester_id) {
            return Ok(*semester);
        }
        let semester = self.provider.get_semester(semester_id)?;
        self.semesters.insert(semester_id, semester);
        Ok(semester)
    }

    fn calendar_weeks(&mut self) -> RepositoryResult<Vec<CalendarWeek>> {
        if let Some(weeks) = &self.weeks {
            return Ok(weeks.clone());
        }
        let weeks = self.provider.list_calendar_weeks()?;
        self.weeks = Some(weeks.clone());
        Ok(weeks)
    }

    fn group_lessons(
        &mut self,
        group_id: i64,
        weekday: u32,
        cycle_week: i32,
    ) -> RepositoryResult<Vec<ScheduledLesson>> {
        let key = (group_id, weekday, cycle_week);
        if let Some(lessons) = self.lessons.get(&key) {
            return Ok(lessons.clone());
        }
        let lessons = self.provider.list_group_lessons(group_id, weekday, cycle_week)?;
        self.lessons.insert(key, lessons.clone());
        Ok(lessons)
    }

    fn subject_id(&mut self, subject_name: &str) -> RepositoryResult<Option<i64>> {
        let name = subject_name.trim();
        if let Some(id) = self.subject_ids.get(name) {
            return Ok(*id);
        }
        let id = self.provider.resolve_subject_id(name)?;
        self.subject_ids.insert(name.to_string(), id);
        Ok(id)
    }
}
