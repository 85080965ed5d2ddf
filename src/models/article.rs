use serde::Deserialize;

/// メンテ済みタイトルの先頭マーカー
pub const MAINTAINED_MARKER: &str = "【メンテ済】";

/// 記事編集画面の固定URLテンプレート
///
/// 識別子はテンプレートへそのまま埋め込む（追加エスケープなし）。
/// CRM側のURL解釈に合わせた仕様であり、変更しないこと。
const ARTICLE_URL_PREFIX: &str =
    "http://sv-vw-ejap:5555/SupportCenter/main.aspx?etc=127&extraqs=%3fetc%3d127%26id%3d%257b";
const ARTICLE_URL_SUFFIX: &str = "%257d&newWindow=true&pagetype=entityrecord";

/// 記事IDから編集画面URLを生成する
pub fn create_url(article_id: &str) -> String {
    format!("{}{}{}", ARTICLE_URL_PREFIX, article_id, ARTICLE_URL_SUFFIX)
}

/// 入力CSVの1行
///
/// 列構成: 記事（主キー・必須）、番号（表示用KBA番号）、対象（対象区分）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleRow {
    #[serde(rename = "記事", default)]
    pub article: Option<String>,
    #[serde(rename = "番号", default)]
    pub number: Option<String>,
    #[serde(rename = "対象", default)]
    pub target: Option<String>,
}

/// 1行分の正規化済み処理単位
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// 表示用のKBA番号
    pub kba: String,
    /// 編集画面URL
    pub url: String,
    /// 対象区分（入力そのまま、解析は更新処理側で行う）
    pub classification: Option<String>,
}

impl WorkItem {
    /// 行から処理単位を作る。主キーが空の行は `None`（呼び出し側で失敗扱い）。
    pub fn from_row(row: &ArticleRow, row_no: usize) -> Option<Self> {
        let article = row
            .article
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())?;

        let kba = row
            .number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("不明_{}", row_no));

        let classification = row
            .target
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            kba,
            url: create_url(article),
            classification,
        })
    }
}

/// 対象区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 社内向け
    Internal,
    /// 社外向け
    External,
    /// 該当なし
    NotApplicable,
}

impl Classification {
    /// 入力ラベルから対象区分を解析する（完全一致）
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "社内向け" => Some(Classification::Internal),
            "社外向け" => Some(Classification::External),
            "該当なし" => Some(Classification::NotApplicable),
            _ => None,
        }
    }

    /// select 要素に設定する option 値
    pub fn value(self) -> &'static str {
        match self {
            Classification::Internal => "1",
            Classification::External => "2",
            Classification::NotApplicable => "3",
        }
    }

    /// 表示名
    pub fn name(self) -> &'static str {
        match self {
            Classification::Internal => "社内向け",
            Classification::External => "社外向け",
            Classification::NotApplicable => "該当なし",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
