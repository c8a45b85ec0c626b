//! エラー深刻度の共通分類
//!
//! ライブラリの各層（config, domain, api）のエラーはすべてこの分類に
//! 写像される。CLI はこれを終了コードとヒント表示の決定に使う。
//!
//! このモジュールは他のモジュールに依存しない。

use reqwest::StatusCode;
use std::fmt;

/// エラーの深刻度と対応する終了コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// ユーザーが直せるエラー
    ///
    /// ファイルが見つからない、ディレクトリを指定した、サーバーが
    /// パラメータを拒否した（4xx）など。
    ///
    /// **Exit Code: 1**
    UserError,

    /// 設定エラー
    ///
    /// 接続文字列の形式が不正、API シークレットがない、認証情報が
    /// サーバーに拒否された（401/403）など。
    ///
    /// **Exit Code: 2**
    ConfigError,

    /// システムエラー
    ///
    /// ネットワーク障害、キャンセル、サーバー障害（5xx）など。
    ///
    /// **Exit Code: 3**
    SystemError,
}

impl ErrorSeverity {
    /// 対応する Unix 終了コードを返す
    pub fn exit_code(self) -> i32 {
        match self {
            Self::UserError => 1,
            Self::ConfigError => 2,
            Self::SystemError => 3,
        }
    }

    /// 成功範囲外の HTTP ステータスを深刻度に分類する
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::ConfigError,
            s if s.is_client_error() => Self::UserError,
            _ => Self::SystemError,
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserError => write!(f, "user error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::SystemError => write!(f, "system error"),
        }
    }
}
