use std::time::Duration;

use chromiumoxide::Browser;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{AppError, AppResult, DriverError};
use crate::infrastructure::{DomExecutor, FrameWait, SelectOutcome};
use crate::session::{SessionOps, SessionState};

/// セッション確立後の待機時間（CRM がサーバー側セッションを作るのを待つ）
const BOOTSTRAP_SETTLE: Duration = Duration::from_secs(2);

/// CRM 向けブラウザセッション
///
/// 実行中は BatchRunner が唯一の所有者。初期URLへのアクセスは
/// プロセス内で最初に構築が成功したときの一度だけ行う。CRM への
/// ディープリンクは確立済みセッション（Cookie）を前提とするため、
/// 記事ごとに繰り返す必要はない。
pub struct CrmSession {
    config: Config,
    state: SessionState,
    browser: Option<Browser>,
    executor: Option<DomExecutor>,
    current_frame: Option<String>,
    bootstrapped: bool,
}

impl CrmSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: SessionState::Uninitialized,
            browser: None,
            executor: None,
            current_frame: None,
            bootstrapped: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// セッションを安全に閉じる（冪等）
    ///
    /// クローズ時のエラーはログに残すだけで伝播させない。
    pub async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("ドライバーのクローズ中にエラーが発生しました: {}", e);
            }
            let _ = browser.wait().await;
        }
        self.executor = None;
        self.current_frame = None;
        self.state = SessionState::Uninitialized;
    }

    fn executor(&self) -> AppResult<&DomExecutor> {
        self.executor
            .as_ref()
            .ok_or(AppError::Driver(DriverError::NotInitialized))
    }

    /// ドライバーエラーを観測したらセッションを Broken にする
    fn note<T>(&mut self, result: AppResult<T>) -> AppResult<T> {
        if let Err(AppError::Driver(_)) = &result {
            warn!("ブラウザ操作に失敗したため、セッションを再初期化対象とします");
            self.state = SessionState::Broken;
        }
        result
    }
}

impl SessionOps for CrmSession {
    async fn ensure_ready(&mut self) -> bool {
        if self.state == SessionState::Ready && self.executor.is_some() {
            return true;
        }

        // 古いセッションが残っていれば破棄する
        self.close().await;

        apply_proxy_env(&self.config);

        let (browser, page) = match browser::launch_browser(&self.config).await {
            Ok(pair) => pair,
            Err(e) => {
                error!("ドライバーの初期化に失敗しました: {}", e);
                self.state = SessionState::Uninitialized;
                return false;
            }
        };

        let executor = DomExecutor::new(page, Duration::from_secs(self.config.element_wait_secs));

        // 初回のみ：セッション確立のため初期URLにアクセス
        if !self.bootstrapped {
            if let Some(url) = self.config.initial_url.as_deref() {
                debug!("初期URLにアクセス: {}", url);
                if let Err(e) = executor.navigate(url).await {
                    error!("初期URLへのアクセスに失敗しました: {}", e);
                    let mut browser = browser;
                    if let Err(e) = browser.close().await {
                        warn!("ドライバーのクローズ中にエラーが発生しました: {}", e);
                    }
                    let _ = browser.wait().await;
                    self.state = SessionState::Uninitialized;
                    return false;
                }
                sleep(BOOTSTRAP_SETTLE).await;
            }
            self.bootstrapped = true;
        }

        self.browser = Some(browser);
        self.executor = Some(executor);
        self.current_frame = None;
        self.state = SessionState::Ready;
        info!("ブラウザセッションの初期化が正常に完了しました");
        true
    }

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        let result = {
            let executor = self.executor()?;
            executor.navigate(url).await
        };
        if result.is_ok() {
            self.current_frame = None;
        }
        self.note(result)
    }

    async fn probe_button(&mut self, id: &str) -> AppResult<Option<bool>> {
        let frame = self.current_frame.clone();
        let result = {
            let executor = self.executor()?;
            executor.probe_element(frame.as_deref(), id).await
        };
        let probe = self.note(result)?;
        Ok(if probe.found {
            Some(probe.is_actionable())
        } else {
            None
        })
    }

    async fn click(&mut self, id: &str) -> AppResult<()> {
        let frame = self.current_frame.clone();
        let result = {
            let executor = self.executor()?;
            executor.click(frame.as_deref(), id).await
        };
        match self.note(result)? {
            true => Ok(()),
            false => Err(AppError::element_not_found(id)),
        }
    }

    async fn switch_to_frame(&mut self, id: &str) -> AppResult<()> {
        let result = {
            let executor = self.executor()?;
            executor.wait_for_frame(id).await
        };
        match self.note(result)? {
            FrameWait::Ready => {
                self.current_frame = Some(id.to_string());
                Ok(())
            }
            FrameWait::Missing => Err(AppError::element_not_found(id)),
            FrameWait::Timeout => Err(AppError::element_timeout(id)),
        }
    }

    async fn switch_to_default(&mut self) -> AppResult<()> {
        self.current_frame = None;
        Ok(())
    }

    async fn read_field(&mut self, id: &str) -> AppResult<String> {
        let frame = self.current_frame.clone();
        let result = {
            let executor = self.executor()?;
            executor.probe_element(frame.as_deref(), id).await
        };
        let probe = self.note(result)?;
        if !probe.found {
            return Err(AppError::element_not_found(id));
        }
        Ok(probe.value.unwrap_or_default())
    }

    async fn write_field(&mut self, id: &str, value: &str) -> AppResult<()> {
        let frame = self.current_frame.clone();
        let result = {
            let executor = self.executor()?;
            executor.write_field(frame.as_deref(), id, value).await
        };
        match self.note(result)? {
            true => Ok(()),
            false => Err(AppError::element_not_found(id)),
        }
    }

    async fn select_value(&mut self, id: &str, value: &str) -> AppResult<bool> {
        let frame = self.current_frame.clone();
        let result = {
            let executor = self.executor()?;
            executor.select_value(frame.as_deref(), id, value).await
        };
        match self.note(result)? {
            SelectOutcome::Selected => Ok(true),
            SelectOutcome::ControlMissing | SelectOutcome::OptionMissing => Ok(false),
        }
    }
}

/// sampleプログラム互換：プロキシ設定を環境変数にも反映する
fn apply_proxy_env(config: &Config) {
    if let Some(http_proxy) = &config.http_proxy {
        std::env::set_var("HTTP_PROXY", http_proxy);
        std::env::set_var("http_proxy", http_proxy);
    }
    if let Some(https_proxy) = &config.https_proxy {
        std::env::set_var("HTTPS_PROXY", https_proxy);
        std::env::set_var("https_proxy", https_proxy);
    }
    if let Some(no_proxy) = &config.no_proxy {
        std::env::set_var("NO_PROXY", no_proxy);
        std::env::set_var("no_proxy", no_proxy);
    }
}
