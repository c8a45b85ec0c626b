//! レスポンスのエンベロープとエラーマッピング
//!
//! 受信したレスポンスのメタデータ（メソッド、URL、ステータス、ヘッダー）を保持し、
//! 成功範囲外のステータスを `ErrorResponse` に変換する。

use crate::api::sanitize::sanitize_url;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::fmt;
use url::Url;

/// 成功とみなすステータスかどうか（200..=299、202 も含む）
pub fn is_success_status(status: StatusCode) -> bool {
    (200..=299).contains(&status.as_u16())
}

/// API レスポンスのエンベロープ
///
/// ボディは消費済み。URL はリクエストのURLをサニタイズしたもの。
#[derive(Debug, Clone)]
pub struct Response {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
}

impl Response {
    pub fn new(method: Method, url: Url, status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            method,
            url: sanitize_url(url),
            status,
            headers,
        }
    }

    pub(crate) fn from_raw(method: Method, url: Url, raw: &reqwest::Response) -> Self {
        Self::new(method, url, raw.status(), raw.headers().clone())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }

    /// ステータスを検査し、成功範囲外なら `ErrorResponse` を返す
    ///
    /// `body` はエラー時のみ解釈される。JSONとして読めない場合でもエラーは
    /// 返り、メッセージが空になるだけ。
    pub fn check(self, body: &[u8]) -> Result<Self, ErrorResponse> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ErrorResponse::from_body(self, body))
        }
    }
}

/// `{"error": {"message": ...}, "documentation_url": ...}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorData,
    #[serde(default)]
    documentation_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorData {
    #[serde(default)]
    message: String,
}

/// 成功範囲外のステータスを受け取ったときのエラー
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    response: Response,
    message: String,
    documentation_url: Option<String>,
}

impl ErrorResponse {
    pub fn from_body(response: Response, body: &[u8]) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        Self {
            response,
            message: parsed.error.message,
            documentation_url: parsed.documentation_url,
        }
    }

    /// エラーを起こしたレスポンス（ヘッダーやステータスの参照用）
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.response.method,
            self.response.url,
            self.response.status.as_u16(),
            self.message
        )
    }
}

impl std::error::Error for ErrorResponse {}
