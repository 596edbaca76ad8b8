// ==========================================
// 教务系统 - 随机成绩生成参数
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认视为讲座的课程类型
pub const DEFAULT_LECTURE_LESSON_TYPES: &[&str] = &["ЛК", "Лекция", "лек"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizerSettings {
    /// 讲座课程类型（比较时忽略大小写与首尾空白）
    pub lecture_lesson_types: Vec<String>,
    /// 外部规则文件（JSON）；None 使用内置目录
    pub rules_path: Option<String>,
    /// 随机种子；None 使用时钟
    pub seed: Option<u64>,
}

impl Default for RandomizerSettings {
    fn default() -> Self {
        Self {
            lecture_lesson_types: DEFAULT_LECTURE_LESSON_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rules_path: None,
            seed: None,
        }
    }
}

impl RandomizerSettings {
    pub fn is_lecture(&self, lesson_type: &str) -> bool {
        let needle = lesson_type.trim().to_lowercase();
        self.lecture_lesson_types
            .iter()
            .any(|t| t.trim().to_lowercase() == needle)
    }
}
