use clap::Parser;
use orphan_gallery_linker::config::{Mode, PLUGIN_ID};
use orphan_gallery_linker::domain::ports::Catalog;
use orphan_gallery_linker::utils::error::ErrorSeverity;
use orphan_gallery_linker::utils::{logger, progress::TracingProgress};
use orphan_gallery_linker::{CliArgs, OrphanResolver, Result, RunStats, Settings, StashClient};

async fn run(args: &CliArgs) -> Result<RunStats> {
    let input = args.read_payload()?;
    let mode = input.args.mode()?;

    let catalog = StashClient::from_connection(&input.server_connection)?;
    tracing::debug!("Catalog endpoint: {}", catalog.endpoint());

    // 主程式設定 < 本次任務參數
    let plugin_config = catalog.plugin_settings(PLUGIN_ID).await?;
    let settings = Settings::resolve(&plugin_config, &input.args.overrides)?;

    match mode {
        Mode::ProcessAll => {
            OrphanResolver::new(catalog, settings, TracingProgress::new())
                .run()
                .await
        }
    }
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    match run(&args).await {
        Ok(stats) => {
            // stdout 是給主程式讀的輸出文件
            println!("{}", serde_json::json!({ "output": stats }));
        }
        Err(e) => {
            tracing::error!(
                "❌ Fatal error: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            println!("{}", serde_json::json!({ "error": e.user_friendly_message() }));

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
