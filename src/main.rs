use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use question_manager::orchestrator::Reply;
use question_manager::utils::logging::log_startup;
use question_manager::{logger, App, Command, Config};
use tracing::error;

/// 智能题目管理：图片提取题目、整理列表、导出 PDF
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 启动后立即提取的题目图片
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // 加载配置
    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None => Config::from_env().context("无法从环境变量加载配置")?,
    };

    // 初始化日志
    logger::init(args.verbose || config.verbose_logging);
    log_startup(&config);

    let mut app = App::initialize(config);

    if let Some(image) = args.image {
        match app.execute(Command::Extract(image)).await {
            Ok(Reply::Message(text)) => println!("{}", text),
            Ok(Reply::Quit) => return Ok(()),
            Err(e) => error!("❌ {}", e),
        }
    }

    app.run().await
}
