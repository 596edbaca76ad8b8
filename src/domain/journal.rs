// ==========================================
// 教务系统 - 课表与成绩簿领域模型
// ==========================================
// 职责: 学生、学期、日历周、课表行、已有成绩
// 红线: 不含数据访问逻辑
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Student - 学生
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: i64,
    pub full_name: String,
    pub subgroup: i32, // 0 / 1 / 2
}

// ==========================================
// Semester - 学期日期窗口
// ==========================================
// 起止日期任一缺失 → 不做日期过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Semester {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Semester {
    /// 日期过滤窗口 (起, 止)；任一缺失返回 None
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

// ==========================================
// CalendarWeek - 日历周
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWeek {
    pub week_id: i64,
    pub cycle_week: i32, // 循环周 1-4
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CalendarWeek {
    /// 日历周是否与 [start, end] 相交
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

// ==========================================
// ScheduledLesson - 课表行
// ==========================================
// 某组在 (星期, 循环周) 上的一节课
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledLesson {
    pub subject_name: String,
    pub room: String,
    pub lesson_type: String,
    pub subgroup: i32,
    pub teacher: String,
    pub lesson_number: i32,
}

// ==========================================
// ExistingGrade - 已有成绩记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingGrade {
    pub value: i32,
    pub date: Option<NaiveDate>, // 空日期记录不参与去重
    pub grade_type: String,
}

// ==========================================
// GradeKey - 成绩唯一键
// ==========================================
// (学生, 科目, 学期, 日期) 上至多一条成绩
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GradeKey {
    pub student_id: i64,
    pub subject_id: i64,
    pub semester_id: i64,
    pub date: NaiveDate,
}

// ==========================================
// UpsertOutcome - 按键写入结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}
