use std::process::ExitCode;

use tracing::{error, info};

use kba_updater::config::Config;
use kba_updater::orchestrator::App;
use kba_updater::utils::logging;

#[tokio::main]
async fn main() -> ExitCode {
    // 設定の読み込みとロガーの初期化
    let config = Config::from_env();
    logging::init(&config.log_file);

    info!("アプリケーションを開始します");

    match App::new(config).run().await {
        Ok(result) => {
            info!(
                "アプリケーションは正常に終了しました (成功 {} / 失敗 {})",
                result.success, result.failure
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("予期せぬエラーが発生しました: {:#}", e);
            eprintln!("エラーが発生しました: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
