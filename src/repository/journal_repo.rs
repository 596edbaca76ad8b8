// ==========================================
// 教务系统 - 成绩/缺勤数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: students / grades / absences
// 事务: 由调用方通过 begin/commit/rollback 控制
// ==========================================

use crate::domain::{ExistingGrade, GradeKey, Student, UpsertOutcome};
use crate::repository::date_field::{format_date, parse_optional_date};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::journal_store::JournalStore;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// JournalRepository - 成绩簿仓储
// ==========================================
pub struct JournalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl JournalRepository {
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

    fn find_id(conn: &Connection, table: &str, key: &GradeKey) -> RepositoryResult<Option<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE student_id = ?1 AND subject_id = ?2 AND semester_id = ?3 AND date = ?4 LIMIT 1",
            table
        );
        let id = conn
            .query_row(
                &sql,
                params![key.student_id, key.subject_id, key.semester_id, format_date(key.date)],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }
}

impl JournalStore for JournalRepository {
    fn list_group_students(&self, group_id: i64) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, full_name, subgroup
            FROM students
            WHERE group_id = ?1
            ORDER BY full_name, id
            "#,
        )?;

        let students = stmt
            .query_map(params![group_id], |row| {
                Ok(Student {
                    student_id: row.get(0)?,
                    full_name: row.get(1)?,
                    subgroup: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(students)
    }

    fn list_grades(
        &self,
        student_id: i64,
        subject_id: i64,
        semester_id: i64,
    ) -> RepositoryResult<Vec<ExistingGrade>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT value, date, grade_type
            FROM grades
            WHERE student_id = ?1 AND subject_id = ?2 AND semester_id = ?3
            ORDER BY date
            "#,
        )?;

        let raw = stmt
            .query_map(params![student_id, subject_id, semester_id], |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(value, date, grade_type)| {
                Ok(ExistingGrade {
                    value,
                    date: parse_optional_date("grades.date", date.as_deref())?,
                    grade_type: grade_type.unwrap_or_default(),
                })
            })
            .collect()
    }

    fn find_grade_id(&self, key: &GradeKey) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        Self::find_id(&conn, "grades", key)
    }

    fn find_absence_id(&self, key: &GradeKey) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        Self::find_id(&conn, "absences", key)
    }

    fn find_student(&self, student_id: i64) -> RepositoryResult<Option<(i64, Student)>> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT group_id, id, full_name, subgroup FROM students WHERE id = ?1",
                params![student_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        Student {
                            student_id: row.get(1)?,
                            full_name: row.get(2)?,
                            subgroup: row.get(3)?,
                        },
                    ))
                },
            )
            .optional()?;
        Ok(found)
    }

    fn upsert_grade(
        &self,
        key: &GradeKey,
        value: i32,
        grade_type: &str,
    ) -> RepositoryResult<UpsertOutcome> {
        let conn = self.get_conn()?;
        let date = format_date(key.date);

        match Self::find_id(&conn, "grades", key)? {
            Some(grade_id) => {
                conn.execute(
                    "UPDATE grades SET value = ?1, grade_type = ?2 WHERE id = ?3",
                    params![value, grade_type, grade_id],
                )?;
                debug!(grade_id, value, date = %date, "成绩已更新");
                Ok(UpsertOutcome::Updated)
            }
            None => {
                conn.execute(
                    r#"
                    INSERT INTO grades (student_id, subject_id, semester_id, date, value, grade_type)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        key.student_id,
                        key.subject_id,
                        key.semester_id,
                        date,
                        value,
                        grade_type
                    ],
                )?;
                debug!(student_id = key.student_id, value, date = %date, "成绩已新建");
                Ok(UpsertOutcome::Created)
            }
        }
    }

    fn begin_transaction(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch("BEGIN IMMEDIATE TRANSACTION")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn commit(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn rollback(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if conn.is_autocommit() {
            // 无活动事务
            return Ok(());
        }
        conn.execute_batch("ROLLBACK")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }
}
