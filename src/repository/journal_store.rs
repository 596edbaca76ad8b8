// ==========================================
// 教务系统 - 成绩/缺勤存储 Trait
// ==========================================
// 职责: 定义成绩生成所需的读写接口与事务边界（不包含实现）
// 实现者: JournalRepository（SQLite）
// 红线: 同一 (学生, 科目, 学期, 日期) 上成绩与缺勤互斥
// ==========================================

use crate::domain::{ExistingGrade, GradeKey, Student, UpsertOutcome};
use crate::repository::error::RepositoryResult;

pub trait JournalStore {
    // ===== 查询 =====

    /// 组内全部学生
    fn list_group_students(&self, group_id: i64) -> RepositoryResult<Vec<Student>>;

    /// (学生, 科目, 学期) 的已有成绩
    fn list_grades(
        &self,
        student_id: i64,
        subject_id: i64,
        semester_id: i64,
    ) -> RepositoryResult<Vec<ExistingGrade>>;

    /// 按键查询成绩ID
    fn find_grade_id(&self, key: &GradeKey) -> RepositoryResult<Option<i64>>;

    /// 按键查询缺勤ID
    fn find_absence_id(&self, key: &GradeKey) -> RepositoryResult<Option<i64>>;

    /// 按ID查询学生及其所在组ID
    fn find_student(&self, student_id: i64) -> RepositoryResult<Option<(i64, Student)>>;

    // ===== 写入 =====

    /// 按键写入成绩（存在则更新，否则新建）
    fn upsert_grade(
        &self,
        key: &GradeKey,
        value: i32,
        grade_type: &str,
    ) -> RepositoryResult<UpsertOutcome>;

    // ===== 事务 =====

    fn begin_transaction(&self) -> RepositoryResult<()>;

    fn commit(&self) -> RepositoryResult<()>;

    fn rollback(&self) -> RepositoryResult<()>;
}
