//! ログ設定モジュール
//!
//! コンソールとログファイル（追記モード）の両方へ出力する。

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// ロガーを初期化する
///
/// ログファイルが開けない場合はコンソール出力のみで続行する
/// （ログ基盤の不調でバッチを止めない）。
pub fn init(log_file: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = tracing_subscriber::fmt::layer();

    // 二重初期化（テスト等）は無視する
    match open_log_file(log_file) {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init();
        }
        Err(e) => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .try_init();
            tracing::warn!("ログファイルを開けませんでした ({}): {}", log_file, e);
        }
    }
}

fn open_log_file(path: &str) -> std::io::Result<fs::File> {
    if let Some(dir) = Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// 起動バナーを記録する
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "記事メンテナンス処理 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("入力ファイル: {}", config.data_file);
    info!("リトライ回数: {}", config.retry_count);
    info!("{}", "=".repeat(60));
}
