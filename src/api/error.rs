/// API層のエラー定義
///
/// リクエスト構築、送信、レスポンス処理の各段階のエラーを1つの列挙にまとめる。
/// - 設定エラー（ベースURLの不変条件など）は ConfigError を包む
/// - アセットの制約違反は DomainError を包む
/// - 送信失敗とキャンセルは区別する（キャンセルが優先）
/// - 成功範囲外のステータスは ErrorResponse として、レスポンスを保持したまま返す
/// - 成功レスポンスのデコード失敗は API エラーとは別扱い
///
/// どのバリアントの表示文字列にも API シークレットは含まれない。
use crate::api::context::ContextError;
use crate::api::response::{ErrorResponse, Response};
use crate::api::transport::TransportError;
use crate::config::error::ConfigError;
use crate::domain::error::DomainError;
use crate::error_severity::ErrorSeverity;
use reqwest::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 無効なアセット
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 相対パスをベースURLに対して解決できない
    #[error("invalid request path '{path}'")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// リクエストボディのエンコード失敗
    #[error("failed to encode request body")]
    Serialize(#[source] serde_json::Error),

    /// リクエストの組み立て失敗
    #[error("failed to build request")]
    Build(#[source] reqwest::Error),

    /// ローカルファイルやシンクへのI/O失敗
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// トランスポート層の失敗
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// コンテキストのキャンセルまたは期限切れ
    #[error(transparent)]
    Cancelled(#[from] ContextError),

    /// 成功範囲外のステータス
    #[error(transparent)]
    Response(Box<ErrorResponse>),

    /// 成功レスポンスのボディを解釈できない
    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),
}

impl From<ErrorResponse> for ApiError {
    fn from(err: ErrorResponse) -> Self {
        Self::Response(Box::new(err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Build(err.without_url())
    }
}

impl ApiError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// サーバーが返したエラーのステータスコード
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response(err) => Some(err.status()),
            _ => None,
        }
    }

    /// サーバーが返したエラーのレスポンス
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Response(err) => Some(err.response()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// エラーの深刻度を返す
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config(err) => err.severity(),
            Self::Domain(err) => err.severity(),
            Self::Response(err) => ErrorSeverity::from_status(err.status()),
            _ => ErrorSeverity::SystemError,
        }
    }

    /// ユーザー向けのヒントメッセージを返す
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config(err) => err.hint(),
            Self::Domain(err) => err.hint(),
            Self::Transport(err) if err.is_timeout() => {
                Some("The request timed out. Check your connection or try a smaller file.")
            }
            Self::Transport(_) => Some("Check your network connection and try again."),
            Self::Response(err) => match err.status() {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Some("The API key or secret was rejected. Run 'cloudup login' again.")
                }
                StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                    Some("Check the upload preset and options; the server rejected the request.")
                }
                _ => err.documentation_url(),
            },
            Self::Decode(_) => Some("The server returned an unexpected response format."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use reqwest::Method;
    use url::Url;

    fn api_error(status: StatusCode) -> ApiError {
        let response = Response::new(
            Method::POST,
            Url::parse("https://h/v1_1/demo/image/upload").unwrap(),
            status,
            HeaderMap::new(),
        );
        ErrorResponse::from_body(response, br#"{"error":{"message":"nope"}}"#).into()
    }

    #[test]
    fn test_response_error_exposes_status_and_envelope() {
        let err = api_error(StatusCode::BAD_REQUEST);
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.response().unwrap().url().path(), "/v1_1/demo/image/upload");
        assert_eq!(err.to_string(), "POST https://h/v1_1/demo/image/upload: 400 nope");
    }

    #[test]
    fn test_severity_follows_status() {
        assert_eq!(
            api_error(StatusCode::UNAUTHORIZED).severity(),
            ErrorSeverity::ConfigError
        );
        assert_eq!(
            api_error(StatusCode::BAD_REQUEST).severity(),
            ErrorSeverity::UserError
        );
        assert_eq!(
            api_error(StatusCode::SERVICE_UNAVAILABLE).severity(),
            ErrorSeverity::SystemError
        );
    }

    #[test]
    fn test_cancelled_is_distinct() {
        let err: ApiError = ContextError::Canceled.into();
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "context canceled");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_wrapped_layers_keep_their_hints() {
        let err: ApiError = DomainError::not_a_file("/tmp").into();
        assert_eq!(err.severity(), ErrorSeverity::UserError);
        assert_eq!(err.hint(), Some("Please specify a file, not a directory."));

        let err: ApiError = ConfigError::MissingSecret.into();
        assert_eq!(err.severity(), ErrorSeverity::ConfigError);
        assert!(err.hint().is_some());
    }
}
