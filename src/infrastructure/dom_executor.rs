//! DOM 実行器 - 基盤層
//!
//! 唯一の Page 資源を持ち、「ページ上で JS を実行して要素を操作する」能力
//! だけを公開する。記事やバッチの概念は知らない。

use std::time::Duration;

use chromiumoxide::Page;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::AppResult;

/// 要素出現待ちのポーリング間隔
const POLL_INTERVAL_MS: u64 = 200;

/// 要素の状態スナップショット
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProbe {
    pub found: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub disabled_attr: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl ElementProbe {
    /// コントロールが操作可能かどうかの単一の判定
    ///
    /// enabled 状態と disabled 属性の両方を見る（CRM のリボンボタンは
    /// disabled="true" 属性だけで非アクティブ表現をすることがある）。
    pub fn is_actionable(&self) -> bool {
        self.found && self.enabled && self.disabled_attr.as_deref() != Some("true")
    }
}

/// select 操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    ControlMissing,
    OptionMissing,
}

/// DOM 実行器
pub struct DomExecutor {
    page: Page,
    element_wait: Duration,
}

impl DomExecutor {
    pub fn new(page: Page, element_wait: Duration) -> Self {
        Self { page, element_wait }
    }

    /// JS コードを実行して JSON 値を返す
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// URL へ遷移し、ナビゲーション完了を待つ
    pub async fn navigate(&self, url: &str) -> AppResult<()> {
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    /// 要素の状態を調べる（暗黙待機つき）
    ///
    /// 要素が出現するまで最大 `element_wait` までポーリングし、
    /// 見つからなければ `found: false` を返す。
    pub async fn probe_element(&self, frame: Option<&str>, id: &str) -> AppResult<ElementProbe> {
        let js = format!(
            r#"
            (async () => {{
                const deadline = Date.now() + {timeout};
                for (;;) {{
                    const doc = {doc};
                    const el = doc ? doc.getElementById({id}) : null;
                    if (el) {{
                        return {{
                            found: true,
                            enabled: !el.disabled,
                            disabledAttr: el.getAttribute('disabled'),
                            value: ('value' in el) ? String(el.value) : null,
                        }};
                    }}
                    if (Date.now() >= deadline) {{
                        return {{ found: false }};
                    }}
                    await new Promise((resolve) => setTimeout(resolve, {poll}));
                }}
            }})()
            "#,
            timeout = self.element_wait.as_millis(),
            poll = POLL_INTERVAL_MS,
            doc = doc_expr(frame),
            id = js_string(id),
        );

        let value = self.eval(js).await?;
        let probe: ElementProbe = serde_json::from_value(value)?;
        Ok(probe)
    }

    /// 要素をクリックする。要素が（もう）存在しなければ false。
    pub async fn click(&self, frame: Option<&str>, id: &str) -> AppResult<bool> {
        let js = format!(
            r#"
            (() => {{
                const doc = {doc};
                const el = doc ? doc.getElementById({id}) : null;
                if (!el) return false;
                el.click();
                return true;
            }})()
            "#,
            doc = doc_expr(frame),
            id = js_string(id),
        );

        let value = self.eval(js).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// 入力フィールドへ値を書き込む。要素が存在しなければ false。
    pub async fn write_field(&self, frame: Option<&str>, id: &str, value: &str) -> AppResult<bool> {
        let js = format!(
            r#"
            (() => {{
                const doc = {doc};
                const el = doc ? doc.getElementById({id}) : null;
                if (!el) return false;
                el.value = {value};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            doc = doc_expr(frame),
            id = js_string(id),
            value = js_string(value),
        );

        let result = self.eval(js).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    /// select 要素の option を値で選択する
    pub async fn select_value(
        &self,
        frame: Option<&str>,
        id: &str,
        value: &str,
    ) -> AppResult<SelectOutcome> {
        let js = format!(
            r#"
            (() => {{
                const doc = {doc};
                const el = doc ? doc.getElementById({id}) : null;
                if (!el) return 'missing';
                el.value = {value};
                if (el.value !== {value}) return 'nooption';
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return 'ok';
            }})()
            "#,
            doc = doc_expr(frame),
            id = js_string(id),
            value = js_string(value),
        );

        let result = self.eval(js).await?;
        Ok(match result.as_str() {
            Some("ok") => SelectOutcome::Selected,
            Some("nooption") => SelectOutcome::OptionMissing,
            _ => SelectOutcome::ControlMissing,
        })
    }

    /// iframe が出現し contentDocument が読めるようになるまで待つ
    pub async fn wait_for_frame(&self, id: &str) -> AppResult<FrameWait> {
        let js = format!(
            r#"
            (async () => {{
                const deadline = Date.now() + {timeout};
                for (;;) {{
                    const fr = document.getElementById({id});
                    if (fr) {{
                        if (fr.contentDocument && fr.contentDocument.readyState !== 'loading') {{
                            return 'ok';
                        }}
                        if (Date.now() >= deadline) return 'timeout';
                    }} else if (Date.now() >= deadline) {{
                        return 'missing';
                    }}
                    await new Promise((resolve) => setTimeout(resolve, {poll}));
                }}
            }})()
            "#,
            timeout = self.element_wait.as_millis(),
            poll = POLL_INTERVAL_MS,
            id = js_string(id),
        );

        let result = self.eval(js).await?;
        Ok(match result.as_str() {
            Some("ok") => FrameWait::Ready,
            Some("timeout") => FrameWait::Timeout,
            _ => FrameWait::Missing,
        })
    }
}

/// iframe 待機の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameWait {
    Ready,
    Missing,
    Timeout,
}

/// 現在のフレーム文脈に応じた document 式を組み立てる
fn doc_expr(frame: Option<&str>) -> String {
    match frame {
        Some(frame_id) => format!(
            "(function() {{ const fr = document.getElementById({}); return fr ? fr.contentDocument : null; }})()",
            js_string(frame_id)
        ),
        None => "document".to_string(),
    }
}

/// Rust 文字列を JS 文字列リテラルへエスケープする
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}
