// ==========================================
// 教务系统 - 课表/日历提供者 Trait
// ==========================================
// 职责: 定义候选日期解析所需的只读查询接口（不包含实现）
// 实现者: ScheduleRepository（SQLite）
// ==========================================

use crate::domain::{CalendarWeek, ScheduledLesson, Semester};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;

pub trait ScheduleProvider {
    /// 科目名称 → 科目ID
    ///
    /// # 返回
    /// - Ok(None): 科目不存在（不是错误）
    fn resolve_subject_id(&self, subject_name: &str) -> RepositoryResult<Option<i64>>;

    /// 全部日历周 (周ID, 循环周, 起止日期)
    fn list_calendar_weeks(&self) -> RepositoryResult<Vec<CalendarWeek>>;

    /// 学期起止日期
    fn get_semester(&self, semester_id: i64) -> RepositoryResult<Semester>;

    /// 某组在 (星期, 循环周) 上的课表行
    ///
    /// # 参数
    /// - weekday: 1=周一 … 6=周六
    fn list_group_lessons(
        &self,
        group_id: i64,
        weekday: u32,
        cycle_week: i32,
    ) -> RepositoryResult<Vec<ScheduledLesson>>;

    /// 日历周内某星期的具体日期
    fn resolve_calendar_date(&self, week_id: i64, weekday: u32)
        -> RepositoryResult<Option<NaiveDate>>;
}
