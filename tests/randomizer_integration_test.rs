// ==========================================
// D1Randomizer 集成测试
// ==========================================
// 测试范围:
// 1. 候选日期 → 对账 → 写入 的完整流程（真实 SQLite）
// 2. 已有成绩 / 覆写 / 缺勤 / 讲座 / 子组
// 3. 事务: 参数非法不开启事务, 存储失败整体回滚
// ==========================================


use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use school_journal::config::RandomizerSettings;
use school_journal::domain::{BiasPolicy, GradeRule};
use school_journal::engine::{D1Randomizer, RandomizerError, RuleCatalog};
use school_journal::logging;
use school_journal::repository::{JournalRepository, ScheduleRepository};
use test_helpers::*;

type Engine = D1Randomizer<ScheduleRepository, JournalRepository>;

fn engine(conn: &Arc<Mutex<Connection>>, rules: Vec<GradeRule>, seed: u64) -> Engine {
    logging::init_test();
    D1Randomizer::with_seed(
        Arc::new(ScheduleRepository::from_connection(conn.clone())),
        Arc::new(JournalRepository::from_connection(conn.clone())),
        RuleCatalog::from_rules(rules),
        RandomizerSettings::default(),
        seed,
    )
}

// ==========================================
// 基本生成
// ==========================================

#[test]
fn test_固定成绩_候选不足时全部填满() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();

    let (fx, student_id, subject_id) = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        let subject_id = insert_subject(&c, "Физкультура").unwrap();
        let student_id = insert_student(&c, fx.group_id, "Петров Пётр", 0).unwrap();
        fx.monday_lessons(&c, "Физкультура", "ПЗ", &[1, 2, 3]).unwrap();
        (fx, student_id, subject_id)
    };

    let mut engine = engine(&conn, vec![fixed_rule("Физкультура", "ПЗ", (6, 6), 9)], 7);
    let stats = engine
        .generate_for_group(fx.group_id, fx.semester_id, false)
        .unwrap();

    assert_eq!(stats.created_total, 3);
    assert_eq!(stats.updated_total, 0);
    assert_eq!(stats.students_processed, 1);
    assert_eq!(stats.created_by_subject.get("Физкультура"), Some(&3));
    assert_eq!(stats.per_rule.len(), 1);
    assert_eq!(stats.per_rule[0].rule_label, "Физкультура / ПЗ");
    assert_eq!(stats.per_rule[0].candidates_found, 3);
    assert_eq!(stats.per_rule[0].requested_grades, 6);
    assert_eq!(stats.per_rule[0].created, 3);

    let rows = list_grade_rows(&conn.lock().unwrap(), student_id, subject_id, fx.semester_id).unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r.0.as_str()).collect();
    assert_eq!(dates, vec!["2025-09-01", "2025-09-08", "2025-09-15"]);
    assert!(rows.iter().all(|r| r.1 == 9 && r.2 == "ПЗ"));
}

#[test]
fn test_成绩范围与日期唯一() {
    for seed in 0..20u64 {
        let (_tmp, db_path) = create_test_db().unwrap();
        let conn = open_shared(&db_path).unwrap();

        let (fx, student_id, subject_id) = {
            let c = conn.lock().unwrap();
            let fx = JournalFixture::new(&c).unwrap();
            let subject_id = insert_subject(&c, "БД").unwrap();
            let student_id = insert_student(&c, fx.group_id, "Сидорова Анна", 0).unwrap();
            for cycle_week in 1..=3 {
                insert_lesson(&c, fx.group_id, 1, cycle_week, 2, "БД", "ЛР", 0).unwrap();
                insert_lesson(&c, fx.group_id, 3, cycle_week, 4, "БД", "ЛР", 0).unwrap();
            }
            (fx, student_id, subject_id)
        };

        let candidates: BTreeSet<String> = [
            "2025-09-01", "2025-09-03", "2025-09-08", "2025-09-10", "2025-09-15", "2025-09-17",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let mut engine = engine(
            &conn,
            vec![rule("БД", "ЛР", (2, 5), (4, 9), BiasPolicy::None)],
            seed,
        );
        let stats = engine
            .generate_for_group(fx.group_id, fx.semester_id, false)
            .unwrap();

        let rows =
            list_grade_rows(&conn.lock().unwrap(), student_id, subject_id, fx.semester_id).unwrap();
        assert_eq!(rows.len(), stats.created_total, "seed={}", seed);
        assert!((2..=5).contains(&rows.len()), "seed={}", seed);
        assert_eq!(stats.per_rule[0].requested_grades, rows.len());

        let dates: BTreeSet<String> = rows.iter().map(|r| r.0.clone()).collect();
        assert_eq!(dates.len(), rows.len(), "日期不得重复");
        assert!(dates.is_subset(&candidates));
        assert!(rows.iter().all(|r| (4..=9).contains(&r.1)));
    }
}

#[test]
fn test_同种子结果可复现() {
    let run = |seed: u64| {
        let (_tmp, db_path) = create_test_db().unwrap();
        let conn = open_shared(&db_path).unwrap();
        let (fx, student_id, subject_id) = {
            let c = conn.lock().unwrap();
            let fx = JournalFixture::new(&c).unwrap();
            let subject_id = insert_subject(&c, "ООП").unwrap();
            let student_id = insert_student(&c, fx.group_id, "Кузнецов Олег", 0).unwrap();
            fx.monday_lessons(&c, "ООП", "ЛР", &[1, 2, 3, 4]).unwrap();
            (fx, student_id, subject_id)
        };

        let mut engine = engine(
            &conn,
            vec![rule("ООП", "ЛР", (1, 4), (5, 10), BiasPolicy::Often10)],
            seed,
        );
        engine
            .generate_for_group(fx.group_id, fx.semester_id, false)
            .unwrap();
        let rows = list_grade_rows(&conn.lock().unwrap(), student_id, subject_id, fx.semester_id);
        rows.unwrap()
    };

    assert_eq!(run(42), run(42));
}

// ==========================================
// 已有成绩与覆写
// ==========================================

/// 单一候选日期 09-01，且该日期已有成绩 5
fn existing_grade_setup() -> (tempfile::NamedTempFile, Arc<Mutex<Connection>>, JournalFixture, i64, i64) {
    let (tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let (fx, student_id, subject_id) = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        let subject_id = insert_subject(&c, "Математика").unwrap();
        let student_id = insert_student(&c, fx.group_id, "Морозова Ирина", 0).unwrap();
        fx.monday_lessons(&c, "Математика", "ПЗ", &[1]).unwrap();
        insert_grade(&c, student_id, subject_id, fx.semester_id, "2025-09-01", 5).unwrap();
        (fx, student_id, subject_id)
    };
    (tmp, conn, fx, student_id, subject_id)
}

#[test]
fn test_已有成绩_不覆写时跳过() {
    let (_tmp, conn, fx, student_id, subject_id) = existing_grade_setup();

    let mut engine = engine(
        &conn,
        vec![rule("Математика", "ПЗ", (1, 1), (3, 9), BiasPolicy::None)],
        1,
    );
    let stats = engine
        .generate_for_group(fx.group_id, fx.semester_id, false)
        .unwrap();

    assert_eq!(stats.created_total, 0);
    assert_eq!(stats.updated_total, 0);
    assert_eq!(stats.skipped_existing_total, 1);
    assert_eq!(stats.per_rule[0].skipped_existing, 1);

    let rows = list_grade_rows(&conn.lock().unwrap(), student_id, subject_id, fx.semester_id).unwrap();
    assert_eq!(rows, vec![("2025-09-01".to_string(), 5, "ПЗ".to_string())]);
}

#[test]
fn test_已有成绩_覆写时更新() {
    let (_tmp, conn, fx, student_id, subject_id) = existing_grade_setup();

    let mut engine = engine(
        &conn,
        vec![fixed_rule("Математика", "ПЗ", (1, 1), 8)],
        1,
    );
    let stats = engine
        .generate_for_group(fx.group_id, fx.semester_id, true)
        .unwrap();

    assert_eq!(stats.created_total, 0);
    assert_eq!(stats.updated_total, 1);
    assert_eq!(stats.per_rule[0].updated, 1);

    let rows = list_grade_rows(&conn.lock().unwrap(), student_id, subject_id, fx.semester_id).unwrap();
    assert_eq!(rows, vec![("2025-09-01".to_string(), 8, "ПЗ".to_string())]);
}

#[test]
fn test_覆写不超过目标数量() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let (fx, student_id, subject_id) = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        let subject_id = insert_subject(&c, "Физика").unwrap();
        let student_id = insert_student(&c, fx.group_id, "Волков Артём", 0).unwrap();
        fx.monday_lessons(&c, "Физика", "ЛР", &[1, 2, 3, 4]).unwrap();
        insert_grade(&c, student_id, subject_id, fx.semester_id, "2025-09-01", 4).unwrap();
        insert_grade(&c, student_id, subject_id, fx.semester_id, "2025-09-08", 4).unwrap();
        (fx, student_id, subject_id)
    };

    for seed in 0..10u64 {
        let mut engine = engine(&conn, vec![fixed_rule("Физика", "ЛР", (2, 2), 7)], seed);
        let stats = engine
            .generate_for_group(fx.group_id, fx.semester_id, true)
            .unwrap();
        assert_eq!(stats.created_total, 0, "seed={}", seed);

        let rows =
            list_grade_rows(&conn.lock().unwrap(), student_id, subject_id, fx.semester_id).unwrap();
        assert_eq!(rows.len(), 2, "seed={}", seed);
    }
}

#[test]
fn test_重复执行幂等() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let fx = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        insert_subject(&c, "Физкультура").unwrap();
        insert_student(&c, fx.group_id, "Орлов Денис", 0).unwrap();
        fx.monday_lessons(&c, "Физкультура", "ПЗ", &[1, 2, 3]).unwrap();
        fx
    };

    let rules = vec![fixed_rule("Физкультура", "ПЗ", (3, 3), 9)];
    let first = engine(&conn, rules.clone(), 11)
        .generate_for_group(fx.group_id, fx.semester_id, false)
        .unwrap();
    assert_eq!(first.created_total, 3);

    let second = engine(&conn, rules, 12)
        .generate_for_group(fx.group_id, fx.semester_id, false)
        .unwrap();
    assert_eq!(second.created_total, 0);
    assert_eq!(second.skipped_existing_total, 3);
    assert_eq!(count_all_grades(&conn.lock().unwrap()).unwrap(), 3);
}

// ==========================================
// 过滤条件
// ==========================================

#[test]
fn test_缺勤日期不打分() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let (fx, student_id, subject_id) = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        let subject_id = insert_subject(&c, "Физкультура").unwrap();
        let student_id = insert_student(&c, fx.group_id, "Белова Ольга", 0).unwrap();
        fx.monday_lessons(&c, "Физкультура", "ПЗ", &[1, 2, 3]).unwrap();
        insert_absence(&c, student_id, subject_id, fx.semester_id, "2025-09-08").unwrap();
        (fx, student_id, subject_id)
    };

    let stats = engine(&conn, vec![fixed_rule("Физкультура", "ПЗ", (6, 6), 9)], 3)
        .generate_for_group(fx.group_id, fx.semester_id, true)
        .unwrap();

    assert_eq!(stats.created_total, 2);
    assert_eq!(stats.per_rule[0].skipped_absence, 1);

    let rows = list_grade_rows(&conn.lock().unwrap(), student_id, subject_id, fx.semester_id).unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r.0.as_str()).collect();
    assert_eq!(dates, vec!["2025-09-01", "2025-09-15"]);
}

#[test]
fn test_讲座禁止打分() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let fx = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        insert_subject(&c, "Философия").unwrap();
        insert_student(&c, fx.group_id, "Зайцев Глеб", 0).unwrap();
        insert_student(&c, fx.group_id, "Зайцева Вера", 0).unwrap();
        fx.monday_lessons(&c, "Философия", "ЛК", &[1, 2]).unwrap();
        fx
    };

    let lecture = rule("Философия", "ЛК", (1, 1), (5, 8), BiasPolicy::None);
    let stats = engine(&conn, vec![lecture.clone()], 5)
        .generate_for_group(fx.group_id, fx.semester_id, true)
        .unwrap();
    assert_eq!(stats.created_total, 0);
    assert_eq!(stats.skipped_lecture_forbidden, 2);
    assert_eq!(stats.per_rule[0].lecture_forbidden, 2);
    assert_eq!(count_all_grades(&conn.lock().unwrap()).unwrap(), 0);

    let allowed = GradeRule {
        allow_lecture: true,
        ..lecture
    };
    let stats = engine(&conn, vec![allowed], 5)
        .generate_for_group(fx.group_id, fx.semester_id, false)
        .unwrap();
    assert_eq!(stats.created_total, 2);
    assert_eq!(stats.skipped_lecture_forbidden, 0);
}

#[test]
fn test_子组过滤() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let (fx, subject_id, first, second, whole) = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        let subject_id = insert_subject(&c, "Физика").unwrap();
        let first = insert_student(&c, fx.group_id, "А Первая", 1).unwrap();
        let second = insert_student(&c, fx.group_id, "Б Вторая", 2).unwrap();
        let whole = insert_student(&c, fx.group_id, "В Общая", 0).unwrap();
        for cycle_week in 1..=4 {
            insert_lesson(&c, fx.group_id, 2, cycle_week, 3, "Физика", "ЛР", 1).unwrap();
        }
        (fx, subject_id, first, second, whole)
    };

    let stats = engine(&conn, vec![fixed_rule("Физика", "ЛР", (2, 2), 6)], 9)
        .generate_for_group(fx.group_id, fx.semester_id, false)
        .unwrap();

    assert_eq!(stats.created_total, 4);
    assert_eq!(stats.per_rule[0].skipped_no_candidates, 1);

    let c = conn.lock().unwrap();
    assert_eq!(list_grade_rows(&c, first, subject_id, fx.semester_id).unwrap().len(), 2);
    assert!(list_grade_rows(&c, second, subject_id, fx.semester_id).unwrap().is_empty());
    assert_eq!(list_grade_rows(&c, whole, subject_id, fx.semester_id).unwrap().len(), 2);
}

#[test]
fn test_学期窗口外与周日不参与() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let (fx, short_semester, student_id, subject_id) = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        let short_semester = insert_semester(&c, "2025-09-01", "2025-09-14").unwrap();
        let subject_id = insert_subject(&c, "ОАиП").unwrap();
        let student_id = insert_student(&c, fx.group_id, "Егоров Иван", 0).unwrap();
        fx.monday_lessons(&c, "ОАиП", "ЛР", &[1, 2, 3, 4]).unwrap();
        for cycle_week in 1..=4 {
            insert_lesson(&c, fx.group_id, 7, cycle_week, 1, "ОАиП", "ЛР", 0).unwrap();
        }
        (fx, short_semester, student_id, subject_id)
    };

    let stats = engine(&conn, vec![fixed_rule("ОАиП", "ЛР", (6, 6), 10)], 2)
        .generate_for_group(fx.group_id, short_semester, false)
        .unwrap();

    assert_eq!(stats.per_rule[0].candidates_found, 2);
    let rows = list_grade_rows(&conn.lock().unwrap(), student_id, subject_id, short_semester).unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r.0.as_str()).collect();
    assert_eq!(dates, vec!["2025-09-01", "2025-09-08"]);
}

#[test]
fn test_未知科目规则被丢弃() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let fx = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        insert_subject(&c, "Физкультура").unwrap();
        insert_student(&c, fx.group_id, "Титов Лев", 0).unwrap();
        fx.monday_lessons(&c, "Физкультура", "ПЗ", &[1]).unwrap();
        fx
    };

    let rules = vec![
        rule("Астрономия", "ПЗ", (1, 2), (5, 9), BiasPolicy::None),
        fixed_rule("Физкультура", "ПЗ", (1, 1), 9),
    ];
    let stats = engine(&conn, rules, 4)
        .generate_for_group(fx.group_id, fx.semester_id, false)
        .unwrap();

    assert_eq!(stats.rules_dropped, 1);
    assert_eq!(stats.per_rule.len(), 1);
    assert_eq!(stats.created_total, 1);
}

// ==========================================
// 事务
// ==========================================

#[test]
fn test_参数非法_不开启事务() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let mut engine = engine(&conn, RuleCatalog::builtin().rules().to_vec(), 1);

    assert!(matches!(
        engine.generate_for_group(0, 1, false),
        Err(RandomizerError::Validation(_))
    ));
    assert!(matches!(
        engine.generate_for_group(1, -3, false),
        Err(RandomizerError::Validation(_))
    ));
    assert!(conn.lock().unwrap().is_autocommit());
}

#[test]
fn test_学期不存在_返回错误且无写入() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let fx = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        insert_subject(&c, "Физкультура").unwrap();
        insert_student(&c, fx.group_id, "Соколов Марк", 0).unwrap();
        fx.monday_lessons(&c, "Физкультура", "ПЗ", &[1, 2]).unwrap();
        fx
    };

    let result = engine(&conn, vec![fixed_rule("Физкультура", "ПЗ", (1, 1), 9)], 1)
        .generate_for_group(fx.group_id, 999, false);

    assert!(matches!(result, Err(RandomizerError::Storage(_))));
    let c = conn.lock().unwrap();
    assert!(c.is_autocommit());
    assert_eq!(count_all_grades(&c).unwrap(), 0);
}

#[test]
fn test_存储失败_整体回滚() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();
    let fx = {
        let c = conn.lock().unwrap();
        let fx = JournalFixture::new(&c).unwrap();
        insert_subject(&c, "Физкультура").unwrap();
        insert_student(&c, fx.group_id, "Первый Студент", 0).unwrap();
        insert_student(&c, fx.group_id, "Второй Студент", 0).unwrap();
        fx.monday_lessons(&c, "Физкультура", "ПЗ", &[1, 2]).unwrap();
        // 第三次写入失败
        c.execute_batch(
            r#"
            CREATE TRIGGER fail_third_grade BEFORE INSERT ON grades
            WHEN (SELECT COUNT(*) FROM grades) >= 2
            BEGIN
                SELECT RAISE(ABORT, 'disk full');
            END;
            "#,
        )
        .unwrap();
        fx
    };

    let result = engine(&conn, vec![fixed_rule("Физкультура", "ПЗ", (2, 2), 9)], 1)
        .generate_for_group(fx.group_id, fx.semester_id, false);

    assert!(matches!(result, Err(RandomizerError::Storage(_))));
    let c = conn.lock().unwrap();
    assert!(c.is_autocommit(), "事务必须已结束");
    assert_eq!(count_all_grades(&c).unwrap(), 0, "部分写入不得提交");
}
