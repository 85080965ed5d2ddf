//! 編成層（Orchestration Layer）
//!
//! ```text
//! batch_runner (行リストを逐次処理)
//!     ↓
//! workflow::UpdateFlow (1記事の更新フロー)
//!     ↓
//! session (ドライバーセッションのプリミティブ)
//!     ↓
//! infrastructure::DomExecutor (ページ上の JS 実行)
//! ```

pub mod batch_runner;

pub use batch_runner::{run_batch, App, BatchResult};
