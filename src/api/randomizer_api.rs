// ==========================================
// 教务系统 - 随机成绩生成 API
// ==========================================
// 职责: 装配仓储与引擎, 对上层暴露 generate_for_group
// 约定: 失败时只返回一条可读错误信息, 数据库无任何持久变更
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, RandomizerConfigReader, RandomizerSettings};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::D1RandomizerStats;
use crate::engine::{CandidateDateResolver, CandidateQuery, D1Randomizer, RuleCatalog};
use crate::repository::{JournalRepository, JournalStore, ScheduleProvider, ScheduleRepository};

// ==========================================
// GenerateOptions - 单次调用覆盖项
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// 固定种子（覆盖配置）
    pub seed: Option<u64>,
    /// 规则文件（覆盖配置）
    pub rules_path: Option<String>,
}

// ==========================================
// RandomizerApi
// ==========================================
pub struct RandomizerApi {
    conn: Arc<Mutex<Connection>>,
    config: ConfigManager,
    schedule_repo: Arc<ScheduleRepository>,
    journal_repo: Arc<JournalRepository>,
}

impl RandomizerApi {
    /// 打开数据库并创建 API 实例
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseError(format!("无法打开数据库 {}: {}", db_path, e)))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建 API 实例（各仓储共享同一连接，保证单一事务）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            config: ConfigManager::from_connection(conn.clone()),
            schedule_repo: Arc::new(ScheduleRepository::from_connection(conn.clone())),
            journal_repo: Arc::new(JournalRepository::from_connection(conn.clone())),
            conn,
        }
    }

    /// 创建 schema（幂等）
    pub fn init_schema(&self) -> ApiResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::DatabaseError(format!("数据库锁获取失败: {}", e)))?;
        ensure_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// 读取配置并合并调用覆盖项
    pub fn load_settings(&self, options: &GenerateOptions) -> ApiResult<RandomizerSettings> {
        let mut settings = self
            .config
            .load_settings()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        if options.seed.is_some() {
            settings.seed = options.seed;
        }
        if options.rules_path.is_some() {
            settings.rules_path = options.rules_path.clone();
        }
        Ok(settings)
    }

    /// 加载规则目录：指定文件优先，否则内置目录
    pub fn load_catalog(&self, settings: &RandomizerSettings) -> ApiResult<RuleCatalog> {
        match settings.rules_path.as_deref() {
            Some(path) => Ok(RuleCatalog::from_json_file(path)?),
            None => Ok(RuleCatalog::builtin()),
        }
    }

    /// 为一个组生成随机成绩
    ///
    /// # 参数
    /// - group_id: 组ID
    /// - semester_id: 学期ID
    /// - overwrite: 是否覆写已有成绩
    /// - options: 种子/规则文件覆盖
    ///
    /// # 返回
    /// - Ok(D1RandomizerStats): 已提交的统计
    /// - Err(ApiError): 校验或存储失败（已回滚）
    pub fn generate_for_group(
        &self,
        group_id: i64,
        semester_id: i64,
        overwrite: bool,
        options: &GenerateOptions,
    ) -> ApiResult<D1RandomizerStats> {
        let settings = self.load_settings(options)?;
        let catalog = self.load_catalog(&settings)?;

        let mut engine = D1Randomizer::new(
            self.schedule_repo.clone(),
            self.journal_repo.clone(),
            catalog,
            settings,
        );
        info!(seed = engine.seed(), "随机成绩生成引擎已创建");

        Ok(engine.generate_for_group(group_id, semester_id, overwrite)?)
    }

    /// 查询学生某科目某课程类型在学期内的上课日期
    ///
    /// 与生成时的候选日期解析完全一致（同一解析器）
    ///
    /// # 返回
    /// - Ok(Vec<NaiveDate>): 升序、去重
    /// - Err(NotFound): 学生/科目/学期不存在
    pub fn list_lesson_occurrences(
        &self,
        student_id: i64,
        subject_name: &str,
        lesson_type: &str,
        semester_id: i64,
    ) -> ApiResult<Vec<NaiveDate>> {
        if subject_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("科目名称不能为空".to_string()));
        }
        if lesson_type.trim().is_empty() {
            return Err(ApiError::InvalidInput("课程类型不能为空".to_string()));
        }

        let subject_id = self
            .schedule_repo
            .resolve_subject_id(subject_name)?
            .ok_or_else(|| ApiError::NotFound(format!("科目 {} 不存在", subject_name.trim())))?;
        let (group_id, student) = self
            .journal_repo
            .find_student(student_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学生(id={})不存在", student_id)))?;

        let mut resolver = CandidateDateResolver::new(self.schedule_repo.as_ref());
        Ok(resolver.resolve(&CandidateQuery {
            group_id,
            student_subgroup: student.subgroup,
            subject_id,
            lesson_type,
            semester_id,
        })?)
    }
}
