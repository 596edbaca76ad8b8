// ==========================================
// 教务系统 - 命令行入口
// ==========================================
// 子命令: init / rules / generate / occurrences / config
// 输出: 结果写 stdout, 日志写 stderr
// ==========================================

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};

use school_journal::app::{get_default_db_path, AppState};
use school_journal::config::config_keys;
use school_journal::{logging, GenerateOptions, RuleCatalog};

#[derive(Parser)]
#[command(name = "school-journal")]
#[command(about = "随机成绩生成 (D1 Randomizer)", long_about = None)]
#[command(version)]
struct Cli {
    /// 数据库路径（默认: SCHOOL_JOURNAL_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 以 JSON 行输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 创建或升级数据库 schema
    Init,
    /// 打印规则目录（内置或指定文件）
    Rules {
        #[arg(long)]
        rules: Option<String>,
    },
    /// 为一个组生成随机成绩
    Generate {
        #[arg(long)]
        group: i64,
        #[arg(long)]
        semester: i64,
        /// 覆写已有成绩
        #[arg(long)]
        overwrite: bool,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        rules: Option<String>,
        /// 以 JSON 输出统计
        #[arg(long)]
        json: bool,
    },
    /// 列出学生某科目某课程类型的上课日期
    Occurrences {
        #[arg(long)]
        student: i64,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        lesson_type: String,
        #[arg(long)]
        semester: i64,
    },
    /// 读写配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 打印全部配置
    Show,
    /// 设置配置项
    Set { key: String, value: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    // rules 子命令不需要数据库
    if let Commands::Rules { rules } = &cli.command {
        let catalog = match rules {
            Some(path) => RuleCatalog::from_json_file(path)?,
            None => RuleCatalog::builtin(),
        };
        println!("{}", catalog.to_json_pretty()?);
        return Ok(());
    }

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("系统版本: {}", school_journal::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path.clone())
        .with_context(|| format!("无法初始化数据库 {}", db_path))?;
    let api = state.randomizer_api.as_ref();

    match cli.command {
        Commands::Init => {
            println!("Schema ready: {}", state.db_path);
        }
        Commands::Rules { .. } => {}
        Commands::Generate {
            group,
            semester,
            overwrite,
            seed,
            rules,
            json,
        } => {
            let options = GenerateOptions {
                seed,
                rules_path: rules,
            };
            let stats = api.generate_for_group(group, semester, overwrite, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", stats);
            }
        }
        Commands::Occurrences {
            student,
            subject,
            lesson_type,
            semester,
        } => {
            let dates = api.list_lesson_occurrences(student, &subject, &lesson_type, semester)?;
            if dates.is_empty() {
                println!("No lesson occurrences found.");
                return Ok(());
            }
            for date in dates {
                println!("{}", date.format("%Y-%m-%d"));
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let snapshot = api
                    .config()
                    .get_config_snapshot()
                    .map_err(|e| anyhow!("读取配置失败: {}", e))?;
                println!("{}", snapshot);
            }
            ConfigAction::Set { key, value } => {
                let known = [
                    config_keys::LECTURE_LESSON_TYPES,
                    config_keys::RULES_PATH,
                    config_keys::SEED,
                ];
                if !known.contains(&key.as_str()) {
                    return Err(anyhow!("未知配置项: {} (可用: {})", key, known.join(", ")));
                }
                api.config()
                    .set_config_value(&key, &value)
                    .map_err(|e| anyhow!("写入配置失败: {}", e))?;
                println!("{} = {}", key, value);
            }
        },
    }

    Ok(())
}
