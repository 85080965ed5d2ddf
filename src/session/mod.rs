//! ドライバーセッション層
//!
//! ブラウザセッションを1つだけ所有し、更新フローが必要とする
//! プリミティブ（遷移・ボタン調査・クリック・フレーム切替・
//! フィールド読み書き・select 選択）をトレイト境界として公開する。
//! 更新フローはこのトレイトにだけ依存するため、実ブラウザなしで
//! テストできる。

pub mod crm_session;

#[cfg(test)]
pub mod mock;

pub use crm_session::CrmSession;

use crate::error::AppResult;

/// セッションのライフサイクル状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 未初期化（ブラウザなし）
    Uninitialized,
    /// 操作可能
    Ready,
    /// プリミティブが続行不能を報告した状態。close + 再初期化でのみ復帰する。
    Broken,
}

/// 更新フローが利用するセッション操作の境界
#[allow(async_fn_in_trait)]
pub trait SessionOps {
    /// セッションを操作可能な状態にする。既に Ready なら何もしない。
    /// 構築に失敗した場合は false（呼び出し側がリトライ予算を消費する）。
    async fn ensure_ready(&mut self) -> bool;

    /// URL へ遷移する。成功するとフレーム文脈はトップレベルへ戻る。
    async fn navigate(&mut self, url: &str) -> AppResult<()>;

    /// ボタンの状態を調べる。
    /// `Ok(None)` は要素なし、`Ok(Some(actionable))` は存在と操作可否。
    async fn probe_button(&mut self, id: &str) -> AppResult<Option<bool>>;

    /// 要素をクリックする。要素が存在しなければ NotFound エラー。
    async fn click(&mut self, id: &str) -> AppResult<()>;

    /// 指定 iframe の中へフレーム文脈を切り替える
    async fn switch_to_frame(&mut self, id: &str) -> AppResult<()>;

    /// フレーム文脈をトップレベルへ戻す
    async fn switch_to_default(&mut self) -> AppResult<()>;

    /// 入力フィールドの現在値を読む。要素が存在しなければ NotFound エラー。
    async fn read_field(&mut self, id: &str) -> AppResult<String>;

    /// 入力フィールドへ値を書き込む
    async fn write_field(&mut self, id: &str, value: &str) -> AppResult<()>;

    /// select 要素の option を値で選択する。
    /// コントロールまたは option がなければ false（任意操作の扱いは呼び出し側）。
    async fn select_value(&mut self, id: &str, value: &str) -> AppResult<bool>;
}
