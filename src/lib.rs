//! # KBA Updater
//!
//! ナレッジベース記事（KBA）を CRM 上で一括メンテナンスするツール。
//! CSV の各行について「公開取り下げ → タイトルへマーカー付与・対象区分
//! 更新 → 承認」をブラウザ自動操作で実行する。
//!
//! ## 層構造
//!
//! ### ① 基盤層（Infrastructure）
//! - `infrastructure::DomExecutor` - 唯一の Page 保有者。ページ上での
//!   JS 実行と要素プリミティブだけを公開する
//!
//! ### ② セッション層（Session）
//! - `session::CrmSession` - ブラウザセッションのライフサイクル管理
//!   （Uninitialized / Ready / Broken）、プロキシ適用、初回のみの
//!   初期URLアクセス
//! - `session::SessionOps` - 更新フローが依存する操作境界（テストでは
//!   モックに差し替える）
//!
//! ### ③ フロー層（Workflow）
//! - `workflow::UpdateFlow` - 1記事分の更新ステートマシン。外側リトライ
//!   予算と、承認ボタン専用の内側ポーリングループを持つ
//!
//! ### ④ 編成層（Orchestration）
//! - `orchestrator::App` / `run_batch` - 行の逐次処理、失敗の隔離、集計

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod utils;
pub mod workflow;

// よく使う型の再エクスポート
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::DomExecutor;
pub use models::{ArticleRow, Classification, WorkItem, MAINTAINED_MARKER};
pub use orchestrator::{run_batch, App, BatchResult};
pub use session::{CrmSession, SessionOps, SessionState};
pub use workflow::UpdateFlow;
