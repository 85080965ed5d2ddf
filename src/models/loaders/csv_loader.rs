use std::path::Path;

use tokio::fs;

use crate::error::{AppError, AppResult, InputError};
use crate::models::article::ArticleRow;

/// CSV 文字列を行リストへ解析する
pub fn parse_rows(content: &str) -> AppResult<Vec<ArticleRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: ArticleRow = record?;
        rows.push(row);
    }
    Ok(rows)
}

/// データファイルを読み込み、行リストへ変換する
pub async fn load_rows(path: &Path) -> AppResult<Vec<ArticleRow>> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        AppError::Input(InputError::ReadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    let rows = parse_rows(strip_bom(&content))?;
    tracing::info!("CSVファイルの読み込みに成功しました。レコード数: {}", rows.len());
    Ok(rows)
}

/// Excel が出力する UTF-8 CSV は BOM 付きのことがある
fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}
