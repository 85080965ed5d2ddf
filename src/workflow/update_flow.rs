//! 記事更新フロー - フロー層
//!
//! 1記事分の「公開取り下げ → 編集 → 承認」を実行する。
//! 外側のリトライはドライバー初期化の失敗と更新処理の失敗で
//! 同じ予算を共有する（初期化失敗を二重にカウントしない）。
//! 承認ボタンには独立した小さなリトライ予算の内側ループがある。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ElementError, UpdateError};
use crate::models::{Classification, WorkItem, MAINTAINED_MARKER};
use crate::session::SessionOps;

/// 公開取り下げボタン
pub const UNPUBLISH_BUTTON_ID: &str =
    "kbarticle|NoRelationship|Form|Mscrm.Form.kbarticle.Unpublish-Medium";
/// 承認（公開）ボタン
pub const PUBLISH_BUTTON_ID: &str =
    "kbarticle|NoRelationship|Form|Mscrm.Form.kbarticle.Publish-Medium";
/// 編集フォームを含む iframe
pub const CONTENT_FRAME_ID: &str = "contentIFrame";
/// タイトル入力フィールド
pub const TITLE_FIELD_ID: &str = "title";
/// 対象区分の select 要素
pub const TARGET_SELECT_ID: &str = "mjs_target";

/// リトライ間の待機時間
const RETRY_BACKOFF: Duration = Duration::from_secs(1);
/// 承認ボタンのポーリング間隔
const PUBLISH_POLL_WAIT: Duration = Duration::from_secs(2);
/// 承認ボタンの最大確認回数
const MAX_PUBLISH_RETRIES: u32 = 3;

/// 記事更新フロー
pub struct UpdateFlow {
    retry_count: u32,
    page_load_wait: Duration,
}

impl UpdateFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            retry_count: config.retry_count,
            page_load_wait: Duration::from_secs(config.page_load_wait_secs),
        }
    }

    /// 1記事を更新する
    ///
    /// 最大で retry_count + 1 回の試行を行い、成功で true、
    /// 予算を使い切ったら false を返す。失敗しても呼び出し側の
    /// バッチは次の記事へ進める。
    pub async fn run<S: SessionOps>(&self, session: &mut S, item: &WorkItem) -> bool {
        let mut retry = 0u32;
        while retry <= self.retry_count {
            // 初期化に失敗した場合もリトライ予算を消費する
            if !session.ensure_ready().await {
                retry += 1;
                warn!(
                    "ドライバー初期化に失敗しました。リトライ {}/{}",
                    retry, self.retry_count
                );
                sleep(RETRY_BACKOFF).await;
                continue;
            }

            match self.apply(session, item).await {
                Ok(()) => {
                    info!("KBA: {} : URL: {} : 更新成功", item.kba, item.url);
                    return true;
                }
                Err(e) => {
                    retry += 1;
                    if retry > self.retry_count {
                        error!(
                            "KBA: {} : URL: {} : 更新失敗 ({}回目): {}",
                            item.kba, item.url, retry, e
                        );
                        return false;
                    }
                    warn!(
                        "KBA: {} : URL: {} : エラー発生、リトライします ({}/{}): {}",
                        item.kba, item.url, retry, self.retry_count, e
                    );
                    sleep(RETRY_BACKOFF).await;
                }
            }
        }
        false
    }

    /// 更新シーケンスの1回分
    async fn apply<S: SessionOps>(&self, session: &mut S, item: &WorkItem) -> AppResult<()> {
        session.navigate(&item.url).await?;
        sleep(self.page_load_wait).await;

        // 公開の取り下げ（任意操作：既に取り下げ済みの記事ではボタンがない）
        match session.probe_button(UNPUBLISH_BUTTON_ID).await? {
            Some(true) => {
                session.click(UNPUBLISH_BUTTON_ID).await?;
                debug!("公開取り下げボタンをクリックしました");
            }
            Some(false) => {
                info!("公開取り下げボタンが非アクティブのため、クリックをスキップしました");
            }
            None => {
                warn!("公開取り下げボタンが見つかりませんでした");
            }
        }

        session.switch_to_frame(CONTENT_FRAME_ID).await?;
        debug!("iframeに切り替えました");

        // タイトル更新（マーカー付与は冪等：既に付いていれば何もしない）
        let title = session.read_field(TITLE_FIELD_ID).await?;
        if !title.is_empty() && !title.starts_with(MAINTAINED_MARKER) {
            let new_title = format!("{}{}", MAINTAINED_MARKER, title);
            session.write_field(TITLE_FIELD_ID, &new_title).await?;
            debug!("タイトルを更新しました: {}", new_title);
        }

        // 社外/社内区分の更新
        if let Some(label) = &item.classification {
            // ラベルの解析失敗はこの試行全体の失敗（選択は行わない）
            let classification = Classification::from_label(label).ok_or_else(|| {
                warn!("不正な対象区分です: {}", label);
                AppError::Update(UpdateError::InvalidClassification {
                    label: label.clone(),
                })
            })?;

            if session
                .select_value(TARGET_SELECT_ID, classification.value())
                .await?
            {
                debug!("対象区分を更新しました: {}", classification);
            } else {
                warn!("対象区分要素が見つかりませんでした");
            }
        }

        session.switch_to_default().await?;
        debug!("デフォルトコンテンツに戻りました");

        self.publish(session).await
    }

    /// 承認サブループ
    ///
    /// ボタンが操作可能になるまで一定回数ポーリングする。上限に達した場合は
    /// 専用のエラーを返し、外側のリトライ予算を1つ消費させる（ページの
    /// 再読み込みでボタンが復活することがあるため）。
    async fn publish<S: SessionOps>(&self, session: &mut S) -> AppResult<()> {
        let mut publish_retry = 0u32;
        loop {
            match session.probe_button(PUBLISH_BUTTON_ID).await? {
                None => {
                    error!("承認ボタンが見つかりませんでした");
                    return Err(AppError::Element(ElementError::NotFound {
                        id: PUBLISH_BUTTON_ID.to_string(),
                    }));
                }
                Some(true) => {
                    session.click(PUBLISH_BUTTON_ID).await?;
                    debug!("承認ボタンをクリックしました");
                    return Ok(());
                }
                Some(false) => {
                    publish_retry += 1;
                    if publish_retry >= MAX_PUBLISH_RETRIES {
                        error!("承認ボタンが非アクティブのため、最大リトライ回数に達しました。更新処理を失敗とします");
                        return Err(AppError::Update(UpdateError::PublishNotActionable {
                            retries: publish_retry,
                        }));
                    }
                    info!(
                        "承認ボタンが非アクティブです。{}秒待機してリトライします ({}/{})",
                        PUBLISH_POLL_WAIT.as_secs(),
                        publish_retry,
                        MAX_PUBLISH_RETRIES
                    );
                    sleep(PUBLISH_POLL_WAIT).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::create_url;
    use crate::session::mock::{ButtonState, MockSession};

    fn flow() -> UpdateFlow {
        UpdateFlow::new(&Config::default())
    }

    fn item(classification: Option<&str>) -> WorkItem {
        WorkItem {
            kba: "1001".to_string(),
            url: create_url("ABC-100"),
            classification: classification.map(str::to_string),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_first_attempt() {
        let mut session = MockSession::default();
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert_eq!(session.ensure_ready_calls, 1);
        assert_eq!(session.navigations.len(), 1);
        assert_eq!(session.navigations[0], create_url("ABC-100"));
        assert!(session.clicks.contains(&UNPUBLISH_BUTTON_ID.to_string()));
        assert!(session.clicks.contains(&PUBLISH_BUTTON_ID.to_string()));
        assert_eq!(session.frame_switches, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn title_marker_is_prepended_once() {
        let mut session = MockSession {
            title: "社内規定に関するFAQ".to_string(),
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert_eq!(
            session.writes,
            vec![(
                TITLE_FIELD_ID.to_string(),
                "【メンテ済】社内規定に関するFAQ".to_string()
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn already_marked_title_is_untouched() {
        let mut session = MockSession {
            title: "【メンテ済】社内規定に関するFAQ".to_string(),
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert!(session.writes.is_empty());
        // 再実行してもマーカーは1つのまま
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert_eq!(session.title, "【メンテ済】社内規定に関するFAQ");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_title_is_untouched() {
        let mut session = MockSession {
            title: String::new(),
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert!(session.writes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_is_bounded() {
        let mut session = MockSession {
            navigate_error: true,
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(!ok);
        // RETRY_COUNT=3 なので試行は最大 4 回
        assert_eq!(session.navigations.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn init_failure_consumes_same_budget() {
        let mut session = MockSession {
            ready_failures: u32::MAX,
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(!ok);
        assert_eq!(session.ensure_ready_calls, 4);
        // 初期化に失敗した試行ではページ操作は行われない
        assert!(session.navigations.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn init_failures_and_update_share_one_counter() {
        // 初期化が2回失敗しても残りの予算で成功できる
        let mut session = MockSession {
            ready_failures: 2,
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert_eq!(session.ensure_ready_calls, 3);
        assert_eq!(session.navigations.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn classification_is_selected() {
        let mut session = MockSession::default();
        let ok = flow().run(&mut session, &item(Some("社内向け"))).await;
        assert!(ok);
        assert_eq!(
            session.selections,
            vec![(TARGET_SELECT_ID.to_string(), "1".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_classification_fails_without_selecting() {
        let mut session = MockSession::default();
        let ok = flow().run(&mut session, &item(Some("部外秘"))).await;
        assert!(!ok);
        assert!(session.selections.is_empty());
        // 不正ラベルは毎試行で失敗し、予算を使い切る
        assert_eq!(session.navigations.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_select_control_is_not_fatal() {
        let mut session = MockSession {
            select_present: false,
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(Some("社外向け"))).await;
        assert!(ok);
        assert!(session.selections.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_unpublish_button_is_not_fatal() {
        let mut session = MockSession {
            unpublish: ButtonState::Missing,
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert!(!session.clicks.contains(&UNPUBLISH_BUTTON_ID.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_unpublish_button_is_skipped() {
        let mut session = MockSession {
            unpublish: ButtonState::Inactive,
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert!(!session.clicks.contains(&UNPUBLISH_BUTTON_ID.to_string()));
        assert!(session.clicks.contains(&PUBLISH_BUTTON_ID.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn publish_clicks_on_first_actionable_probe() {
        let mut session = MockSession {
            publish_plan: vec![true],
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert_eq!(session.publish_probes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn publish_retries_until_actionable() {
        let mut session = MockSession {
            publish_plan: vec![false, true],
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(ok);
        assert_eq!(session.publish_probes, 2);
        assert!(session.clicks.contains(&PUBLISH_BUTTON_ID.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn publish_never_actionable_exhausts_both_budgets() {
        let mut session = MockSession {
            publish_plan: vec![false; 100],
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(!ok);
        // 内側3回 × 外側4試行
        assert_eq!(session.publish_probes, 12);
        assert!(!session.clicks.contains(&PUBLISH_BUTTON_ID.to_string()));
        assert_eq!(session.navigations.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_publish_button_is_fatal() {
        let mut session = MockSession {
            publish_missing: true,
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(!ok);
        assert_eq!(session.navigations.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_title_field_is_fatal() {
        let mut session = MockSession {
            title_missing: true,
            ..Default::default()
        };
        let ok = flow().run(&mut session, &item(None)).await;
        assert!(!ok);
        assert!(session.writes.is_empty());
        assert_eq!(session.navigations.len(), 4);
    }
}
