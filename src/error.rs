use std::fmt;

/// アプリケーションエラー型
#[derive(Debug)]
pub enum AppError {
    /// ドライバー（ブラウザセッション）関連エラー
    Driver(DriverError),
    /// 要素操作エラー
    Element(ElementError),
    /// 入力ファイル関連エラー
    Input(InputError),
    /// 更新処理の業務エラー
    Update(UpdateError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Driver(e) => write!(f, "ドライバーエラー: {}", e),
            AppError::Element(e) => write!(f, "要素エラー: {}", e),
            AppError::Input(e) => write!(f, "入力エラー: {}", e),
            AppError::Update(e) => write!(f, "更新エラー: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Driver(e) => Some(e),
            AppError::Element(e) => Some(e),
            AppError::Input(e) => Some(e),
            AppError::Update(e) => Some(e),
        }
    }
}

/// ドライバー関連エラー
///
/// セッションの再初期化（close + ensure_ready）で回復を試みる対象。
#[derive(Debug)]
pub enum DriverError {
    /// セッションが初期化されていない
    NotInitialized,
    /// ブラウザ操作が続行不能
    Unusable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NotInitialized => {
                write!(f, "ブラウザセッションが初期化されていません")
            }
            DriverError::Unusable { source } => {
                write!(f, "ブラウザ操作が続行できません: {}", source)
            }
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Unusable { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 要素操作エラー
#[derive(Debug)]
pub enum ElementError {
    /// 要素が見つからない（暗黙待機を超えても出現しなかった）
    NotFound { id: String },
    /// 要素は存在するが読み込みが完了しなかった
    Timeout { id: String },
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementError::NotFound { id } => {
                write!(f, "要素が見つかりません: {}", id)
            }
            ElementError::Timeout { id } => {
                write!(f, "要素の読み込みがタイムアウトしました: {}", id)
            }
        }
    }
}

impl std::error::Error for ElementError {}

/// 入力ファイル関連エラー
#[derive(Debug)]
pub enum InputError {
    /// ファイルが存在しない
    FileNotFound { path: String },
    /// ファイルの読み込みに失敗
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// CSV の解析に失敗
    CsvParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::FileNotFound { path } => {
                write!(f, "ファイルが見つかりません: {}", path)
            }
            InputError::ReadFailed { path, source } => {
                write!(f, "ファイルの読み込みに失敗しました ({}): {}", path, source)
            }
            InputError::CsvParseFailed { source } => {
                write!(f, "CSVの解析に失敗しました: {}", source)
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::ReadFailed { source, .. } | InputError::CsvParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 更新処理の業務エラー
#[derive(Debug)]
pub enum UpdateError {
    /// 不正な対象区分
    InvalidClassification { label: String },
    /// 承認ボタンが非アクティブのままリトライ上限に達した
    PublishNotActionable { retries: u32 },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::InvalidClassification { label } => {
                write!(f, "不正な対象区分です: {}", label)
            }
            UpdateError::PublishNotActionable { retries } => {
                write!(
                    f,
                    "承認ボタンが非アクティブで最大リトライ回数に達しました ({}回)",
                    retries
                )
            }
        }
    }
}

impl std::error::Error for UpdateError {}

// ========== 外部エラー型からの変換 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Driver(DriverError::Unusable {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Driver(DriverError::Unusable {
            source: Box::new(err),
        })
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Input(InputError::CsvParseFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便利コンストラクタ ==========

impl AppError {
    /// 要素未発見エラーを作成
    pub fn element_not_found(id: impl Into<String>) -> Self {
        AppError::Element(ElementError::NotFound { id: id.into() })
    }

    /// 要素タイムアウトエラーを作成
    pub fn element_timeout(id: impl Into<String>) -> Self {
        AppError::Element(ElementError::Timeout { id: id.into() })
    }
}

// ========== Result 型エイリアス ==========

/// アプリケーション結果型
pub type AppResult<T> = Result<T, AppError>;
