// ==========================================
// 教务系统 - 课表/日历数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: subjects / calendar_weeks / semesters / schedule
// ==========================================

use crate::domain::{CalendarWeek, ScheduledLesson, Semester};
use crate::repository::date_field::{parse_optional_date, parse_required_date};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::schedule_provider::ScheduleProvider;
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ScheduleRepository - 课表仓储
// ==========================================
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl ScheduleProvider for ScheduleRepository {
    fn resolve_subject_id(&self, subject_name: &str) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM subjects WHERE name = ?1",
                params![subject_name.trim()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }

    fn list_calendar_weeks(&self) -> RepositoryResult<Vec<CalendarWeek>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, cycle_week, start_date, end_date
            FROM calendar_weeks
            ORDER BY start_date, id
            "#,
        )?;

        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(week_id, cycle_week, start, end)| {
                Ok(CalendarWeek {
                    week_id,
                    cycle_week,
                    start_date: parse_required_date("calendar_weeks.start_date", &start)?,
                    end_date: parse_required_date("calendar_weeks.end_date", &end)?,
                })
            })
            .collect()
    }

    fn get_semester(&self, semester_id: i64) -> RepositoryResult<Semester> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT start_date, end_date FROM semesters WHERE id = ?1",
                params![semester_id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                    ))
                },
            )
            .optional()?;

        let (start, end) = row.ok_or_else(|| RepositoryError::NotFound {
            entity: "Semester".to_string(),
            id: semester_id.to_string(),
        })?;

        Ok(Semester {
            start_date: parse_optional_date("semesters.start_date", start.as_deref())?,
            end_date: parse_optional_date("semesters.end_date", end.as_deref())?,
        })
    }

    fn list_group_lessons(
        &self,
        group_id: i64,
        weekday: u32,
        cycle_week: i32,
    ) -> RepositoryResult<Vec<ScheduledLesson>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT subject, room, lesson_type, subgroup, teacher, lesson_number
            FROM schedule
            WHERE group_id = ?1 AND weekday = ?2 AND cycle_week = ?3
            ORDER BY lesson_number, subgroup
            "#,
        )?;

        let lessons = stmt
            .query_map(params![group_id, weekday, cycle_week], |row| {
                Ok(ScheduledLesson {
                    subject_name: row.get(0)?,
                    room: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    lesson_type: row.get(2)?,
                    subgroup: row.get(3)?,
                    teacher: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    lesson_number: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lessons)
    }

    fn resolve_calendar_date(
        &self,
        week_id: i64,
        weekday: u32,
    ) -> RepositoryResult<Option<NaiveDate>> {
        if !(1..=7).contains(&weekday) {
            return Ok(None);
        }

        let conn = self.get_conn()?;
        let start = conn
            .query_row(
                "SELECT start_date FROM calendar_weeks WHERE id = ?1",
                params![week_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match start {
            Some(start) => {
                let week_start = parse_required_date("calendar_weeks.start_date", &start)?;
                Ok(Some(week_start + Duration::days(i64::from(weekday) - 1)))
            }
            None => Ok(None),
        }
    }
}
