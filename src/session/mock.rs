//! テスト用のスクリプト化セッション
//!
//! 実ブラウザなしで更新フローとバッチ処理を検証するための
//! SessionOps 実装。呼び出しを記録し、シナリオに応じた応答を返す。

use crate::error::{AppError, AppResult, DriverError};
use crate::session::SessionOps;
use crate::workflow::update_flow::{
    CONTENT_FRAME_ID, PUBLISH_BUTTON_ID, TARGET_SELECT_ID, TITLE_FIELD_ID, UNPUBLISH_BUTTON_ID,
};

/// ボタンのシナリオ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Actionable,
    Inactive,
    Missing,
}

pub struct MockSession {
    // --- シナリオ設定 ---
    /// 最初の n 回の ensure_ready を失敗させる
    pub ready_failures: u32,
    /// navigate を常に失敗させる
    pub navigate_error: bool,
    /// URL がこの文字列を含む行だけ navigate を失敗させる
    pub fail_url_containing: Option<String>,
    pub unpublish: ButtonState,
    /// probe ごとの承認ボタンの操作可否（尽きたら true を返し続ける）
    pub publish_plan: Vec<bool>,
    pub publish_missing: bool,
    pub title: String,
    pub title_missing: bool,
    pub select_present: bool,

    // --- 呼び出し記録 ---
    pub ensure_ready_calls: u32,
    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
    pub writes: Vec<(String, String)>,
    pub selections: Vec<(String, String)>,
    pub frame_switches: u32,
    pub publish_probes: u32,
    pub publish_plan_pos: usize,
}

impl Default for MockSession {
    fn default() -> Self {
        Self {
            ready_failures: 0,
            navigate_error: false,
            fail_url_containing: None,
            unpublish: ButtonState::Actionable,
            publish_plan: Vec::new(),
            publish_missing: false,
            title: "社内規定に関するFAQ".to_string(),
            title_missing: false,
            select_present: true,
            ensure_ready_calls: 0,
            navigations: Vec::new(),
            clicks: Vec::new(),
            writes: Vec::new(),
            selections: Vec::new(),
            frame_switches: 0,
            publish_probes: 0,
            publish_plan_pos: 0,
        }
    }
}

fn driver_unusable() -> AppError {
    AppError::Driver(DriverError::Unusable {
        source: "シミュレートされたブラウザ障害".into(),
    })
}

impl SessionOps for MockSession {
    async fn ensure_ready(&mut self) -> bool {
        self.ensure_ready_calls += 1;
        self.ensure_ready_calls > self.ready_failures
    }

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        self.navigations.push(url.to_string());
        if self.navigate_error {
            return Err(driver_unusable());
        }
        if let Some(pattern) = &self.fail_url_containing {
            if url.contains(pattern.as_str()) {
                return Err(driver_unusable());
            }
        }
        Ok(())
    }

    async fn probe_button(&mut self, id: &str) -> AppResult<Option<bool>> {
        if id == UNPUBLISH_BUTTON_ID {
            return Ok(match self.unpublish {
                ButtonState::Actionable => Some(true),
                ButtonState::Inactive => Some(false),
                ButtonState::Missing => None,
            });
        }
        if id == PUBLISH_BUTTON_ID {
            self.publish_probes += 1;
            if self.publish_missing {
                return Ok(None);
            }
            let actionable = match self.publish_plan.get(self.publish_plan_pos) {
                Some(&v) => {
                    self.publish_plan_pos += 1;
                    v
                }
                None => true,
            };
            return Ok(Some(actionable));
        }
        Ok(None)
    }

    async fn click(&mut self, id: &str) -> AppResult<()> {
        self.clicks.push(id.to_string());
        Ok(())
    }

    async fn switch_to_frame(&mut self, id: &str) -> AppResult<()> {
        assert_eq!(id, CONTENT_FRAME_ID);
        self.frame_switches += 1;
        Ok(())
    }

    async fn switch_to_default(&mut self) -> AppResult<()> {
        Ok(())
    }

    async fn read_field(&mut self, id: &str) -> AppResult<String> {
        if id == TITLE_FIELD_ID && self.title_missing {
            return Err(AppError::element_not_found(id));
        }
        Ok(self.title.clone())
    }

    async fn write_field(&mut self, id: &str, value: &str) -> AppResult<()> {
        self.writes.push((id.to_string(), value.to_string()));
        if id == TITLE_FIELD_ID {
            self.title = value.to_string();
        }
        Ok(())
    }

    async fn select_value(&mut self, id: &str, value: &str) -> AppResult<bool> {
        if id == TARGET_SELECT_ID && !self.select_present {
            return Ok(false);
        }
        self.selections.push((id.to_string(), value.to_string()));
        Ok(true)
    }
}
