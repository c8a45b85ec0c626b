/// ドメイン層のエラー定義
///
/// アップロード対象アセットに関する制約違反を表現する。
/// ネットワークに触れる前に検出されるエラーだけをここに置く。
use crate::error_severity::ErrorSeverity;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// ファイルが見つからない
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// ディレクトリが指定された（無効なアセット）
    #[error("the asset to upload can't be a directory: {path}")]
    NotAFile { path: String },
}

impl DomainError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// エラーの深刻度を返す
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::UserError
    }

    /// ユーザー向けのヒントメッセージを返す
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::FileNotFound { .. } => Some(
                "Local paths are resolved against the working directory. \
                 Check the path and ensure the file exists.",
            ),
            Self::NotAFile { .. } => Some("Please specify a file, not a directory."),
        }
    }
}
