// ==========================================
// 教务系统 - 成绩生成配置读取 Trait
// ==========================================
// 职责: 定义成绩生成所需的配置读取接口（不包含实现）
// 实现者: ConfigManager（从 config_kv 表读取）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::settings::RandomizerSettings;
use std::error::Error;

pub trait RandomizerConfigReader {
    /// 获取讲座课程类型列表
    ///
    /// # 默认值
    /// - ЛК, Лекция, лек
    fn get_lecture_lesson_types(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 获取外部规则文件路径
    ///
    /// # 默认值
    /// - None（内置目录）
    fn get_rules_path(&self) -> Result<Option<String>, Box<dyn Error>>;

    /// 获取固定随机种子
    ///
    /// # 默认值
    /// - None（时钟种子）
    fn get_seed(&self) -> Result<Option<u64>, Box<dyn Error>>;

    /// 汇总为参数对象
    fn load_settings(&self) -> Result<RandomizerSettings, Box<dyn Error>> {
        Ok(RandomizerSettings {
            lecture_lesson_types: self.get_lecture_lesson_types()?,
            rules_path: self.get_rules_path()?,
            seed: self.get_seed()?,
        })
    }
}
