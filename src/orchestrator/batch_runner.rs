//! バッチ処理 - 編成層
//!
//! ## 職責
//!
//! 1. **アプリ初期化**: 入力ファイルの確認と読み込み
//! 2. **逐次処理**: 行を入力順に1件ずつ処理する（並行処理はしない）
//! 3. **失敗の隔離**: 1行の失敗がバッチ全体を止めることはない
//! 4. **資源管理**: CrmSession を唯一所有し、終了時に必ずクローズする
//! 5. **集計**: 成功・失敗件数のサマリーを出力する

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, InputError};
use crate::models::{load_rows, ArticleRow, WorkItem};
use crate::session::{CrmSession, SessionOps};
use crate::utils::logging;
use crate::workflow::UpdateFlow;

/// バッチ処理結果
///
/// 不変条件: total == success + failure（主キー欠落によるスキップは
/// 失敗としてカウントする）。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
}

/// アプリ主構造
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// バッチ全体を実行する
    ///
    /// ファイルが読めて処理が最後まで走れば Ok（個々の行の成否は問わない）。
    /// ファイル不在・読み込み不能のときだけ Err を返す。
    pub async fn run(&self) -> Result<BatchResult> {
        logging::log_startup(&self.config);
        info!("更新処理を開始します");

        let path = Path::new(&self.config.data_file);
        if !path.exists() {
            let error = AppError::Input(InputError::FileNotFound {
                path: self.config.data_file.clone(),
            });
            eprintln!("{}", error);
            return Err(error.into());
        }

        info!("データファイルを読み込みます: {}", self.config.data_file);
        let rows = load_rows(path).await?;

        let flow = UpdateFlow::new(&self.config);
        let mut session = CrmSession::new(self.config.clone());

        let result = run_batch(&flow, &mut session, &rows).await;

        // 成否に関わらずセッションは必ず閉じる
        session.close().await;

        Ok(result)
    }
}

/// 行リストを入力順に処理する
///
/// 1行の処理はここで完結し、どんな結果でも次の行へ進む。
pub async fn run_batch<S: SessionOps>(
    flow: &UpdateFlow,
    session: &mut S,
    rows: &[ArticleRow],
) -> BatchResult {
    let total = rows.len();
    let mut result = BatchResult {
        total,
        ..Default::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let row_no = index + 1;

        // 必須項目の確認（主キーのない行はセッションに触れずに失敗扱い）
        let Some(item) = WorkItem::from_row(row, row_no) else {
            warn!("行 {}: 主キーが指定されていません。スキップします。", row_no);
            result.failure += 1;
            continue;
        };

        info!("処理中 ({}/{}): KBA: {}", row_no, total, item.kba);

        if flow.run(session, &item).await {
            result.success += 1;
            println!("記事番号: {} 更新成功 ({}/{})", item.kba, row_no, total);
        } else {
            result.failure += 1;
            println!("記事番号: {} 更新失敗 ({}/{})", item.kba, row_no, total);
        }
    }

    let summary = format!(
        "処理完了: 合計 {}件、成功 {}件、失敗 {}件",
        result.total, result.success, result.failure
    );
    info!("{}", summary);
    println!("{}", summary);

    result
}
