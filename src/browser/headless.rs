use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;

/// ブラウザを起動し、操作用のページを1枚用意する
///
/// プロキシや安定化フラグは設定から組み立てる。ページはこの時点では
/// about:blank のままで、初期URLへのアクセスはセッション側が行う。
pub async fn launch_browser(config: &Config) -> Result<(Browser, Page)> {
    info!("🚀 ブラウザを起動しています...");

    let mut args: Vec<String> = vec![
        // 安定性のための追加Chromeオプション
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--window-size=1920,1080".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        // コンソールログを抑制
        "--disable-logging".to_string(),
        "--log-level=3".to_string(),
    ];

    // プロキシ設定
    if let Some(no_proxy) = &config.no_proxy {
        args.push(format!("--proxy-bypass-list={}", no_proxy));
    }
    if let Some(http_proxy) = &config.http_proxy {
        args.push(format!("--proxy-server={}", http_proxy));
        debug!("プロキシを設定しました: {}", http_proxy);
    } else if let Some(host) = &config.proxy_host {
        let proxy_server = format!("{}:{}", host, config.proxy_port);
        args.push(format!("--proxy-server={}", proxy_server));
        debug!("プロキシを設定しました: {}", proxy_server);
    } else {
        // プロキシを使用しない設定
        args.push("--no-proxy-server".to_string());
    }

    let mut builder = BrowserConfig::builder();
    if config.headless_mode {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }

    let browser_config = builder.args(args).build().map_err(|e| {
        error!("ブラウザの設定に失敗しました: {}", e);
        anyhow::anyhow!("ブラウザの設定に失敗しました: {}", e)
    })?;

    // 起動
    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("ブラウザの起動に失敗しました: {}", e);
        anyhow::anyhow!("ブラウザの起動に失敗しました: {}", e)
    })?;
    debug!("ブラウザの起動に成功しました");

    // バックグラウンドでブラウザイベントを処理する
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // ブラウザの状態同期を待つ
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("ページの作成に失敗しました: {}", e);
        anyhow::anyhow!("ページの作成に失敗しました: {}", e)
    })?;

    Ok((browser, page))
}
