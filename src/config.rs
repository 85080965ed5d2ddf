/// プログラム設定
#[derive(Clone, Debug)]
pub struct Config {
    /// ヘッドレスモードで起動するか
    pub headless_mode: bool,
    /// 1記事あたりの外側リトライ回数
    pub retry_count: u32,
    /// 入力データファイル（CSV）
    pub data_file: String,
    /// ログファイル
    pub log_file: String,
    /// 要素の暗黙待機時間（秒）
    pub element_wait_secs: u64,
    /// ページ読み込み後の待機時間（秒）
    pub page_load_wait_secs: u64,
    // --- プロキシ設定 ---
    pub proxy_host: Option<String>,
    pub proxy_port: u16,
    /// sampleプログラム互換の明示的プロキシURL
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
    /// セッション確立のための初期URL（プロセスで初回のみアクセスする）
    pub initial_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            headless_mode: true,
            retry_count: 3,
            data_file: "files/data.csv".to_string(),
            log_file: "log/app.log".to_string(),
            element_wait_secs: 5,
            page_load_wait_secs: 3,
            proxy_host: Some("mjsproxy.mjs.co.jp".to_string()),
            proxy_port: 80,
            http_proxy: Some("http://@mjsproxy.mjs.co.jp:80".to_string()),
            https_proxy: Some("http://@mjsproxy.mjs.co.jp:80".to_string()),
            no_proxy: Some(
                "localhost,127.0.0.1,sv-vw-ejap,*.local,192.168.*,10.*,172.16.*,172.17.*,172.18.*,172.19.*,172.20.*,172.21.*,172.22.*,172.23.*,172.24.*,172.25.*,172.26.*,172.27.*,172.28.*,172.29.*,172.30.*,172.31.*"
                    .to_string(),
            ),
            initial_url: Some(
                "http://sv-vw-ejap:5555/SupportCenter/main.aspx?area=nav_answers&etc=127&page=CS&pageType=EntityList&web=true"
                    .to_string(),
            ),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            headless_mode: std::env::var("HEADLESS_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless_mode),
            retry_count: std::env::var("RETRY_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_count),
            data_file: std::env::var("DATA_FILE").unwrap_or(default.data_file),
            log_file: std::env::var("LOG_FILE").unwrap_or(default.log_file),
            element_wait_secs: std::env::var("ELEMENT_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.element_wait_secs),
            page_load_wait_secs: std::env::var("PAGE_LOAD_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.page_load_wait_secs),
            proxy_host: env_opt("PROXY_HOST", default.proxy_host),
            proxy_port: std::env::var("PROXY_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.proxy_port),
            http_proxy: env_opt("HTTP_PROXY_URL", default.http_proxy),
            https_proxy: env_opt("HTTPS_PROXY_URL", default.https_proxy),
            no_proxy: env_opt("NO_PROXY_LIST", default.no_proxy),
            initial_url: env_opt("INITIAL_URL", default.initial_url),
        }
    }
}

/// 省略可能な設定値を環境変数から読む（空文字列の指定で無効化できる）
fn env_opt(name: &str, default: Option<String>) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if v.trim().is_empty() => None,
        Ok(v) => Some(v),
        Err(_) => default,
    }
}
