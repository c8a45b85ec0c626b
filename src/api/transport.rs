//! HTTPトランスポートの抽象
//!
//! ディスパッチャは「リクエストを送ってレスポンスを受け取る」操作だけに依存する。
//! 既定の実装は reqwest::Client。テストでは任意の実装に差し替えられる。

use crate::api::sanitize::sanitize_url;
use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// トランスポート層のエラー
///
/// 保持するURLは常にサニタイズ済み。reqwest のエラーから作る場合は、
/// 元エラーに埋め込まれたURLも取り除く。
#[derive(Debug, Error)]
#[error("transport error{}", .url.as_ref().map(|u| format!(" for {}", u)).unwrap_or_default())]
pub struct TransportError {
    url: Option<Url>,
    timeout: bool,
    connect: bool,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new(url: Option<Url>, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            url: url.map(sanitize_url),
            timeout: false,
            connect: false,
            source: source.into(),
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn is_timeout(&self) -> bool {
        self.timeout
    }

    pub fn is_connect(&self) -> bool {
        self.connect
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().cloned().map(sanitize_url);
        let timeout = err.is_timeout();
        let connect = err.is_connect();
        Self {
            url,
            timeout,
            connect,
            source: Box::new(err.without_url()),
        }
    }
}

/// リクエストを1件送信してレスポンスを返すトランスポート
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

/// reqwest による既定のトランスポート
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// タイムアウト付きのクライアントを作成
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// 構築済みの reqwest::Client を使う
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.client.execute(request).await.map_err(TransportError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_url_is_sanitized() {
        let url = Url::parse("https://h/p?client_secret=shh").unwrap();
        let err = TransportError::new(
            Some(url),
            io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"),
        );

        assert_eq!(err.to_string(), "transport error for https://h/p?client_secret=REDACTED");
        assert!(!err.to_string().contains("shh"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_error_without_url() {
        let err = TransportError::new(None, "boom");
        assert_eq!(err.to_string(), "transport error");
        assert_eq!(err.source().unwrap().to_string(), "boom");
    }

    #[tokio::test]
    async fn test_reqwest_error_drops_embedded_url() {
        // 到達不能なポートへ送ってエラーを得る
        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let request = transport
            .client()
            .get("http://127.0.0.1:1/?client_secret=shh")
            .build()
            .unwrap();

        let err = transport.send(request).await.unwrap_err();

        assert!(err.is_connect());
        assert!(!err.to_string().contains("shh"));
        assert!(!err.source().unwrap().to_string().contains("shh"));
        assert_eq!(
            err.url().map(Url::as_str),
            Some("http://127.0.0.1:1/?client_secret=REDACTED")
        );
    }
}
