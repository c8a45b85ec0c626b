/// HTTPクライアント
///
/// Cloudinary API との通信を担当するクライアント。
/// リクエストの組み立て（JSON / マルチパート）、キャンセル可能な送信、
/// レスポンスのデコード、エラーステータスの構造化を行います。
use crate::api::auth::{Clock, Credentials, SystemClock};
use crate::api::context::RequestContext;
use crate::api::error::ApiError;
use crate::api::response::{ErrorResponse, Response};
use crate::api::sanitize::sanitize_url;
use crate::api::transport::{HttpTransport, ReqwestTransport, TransportError};
use crate::api::upload::UploadService;
use crate::config::APP_CONFIG;
use crate::config::error::ConfigError;
use crate::config::user::CLOUDINARY_URL_ENV;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Method, Request};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;
use url::Url;

/// APIクライアントの結果型
type ApiResult<T> = Result<T, ApiError>;

/// 成功レスポンスのボディの行き先
///
/// 呼び出し側が明示的に選ぶ。
pub enum Destination<'a, T> {
    /// ボディを読まずに捨てる
    Discard,
    /// 生のバイト列をそのまま書き込む（JSON 以外のペイロード用）
    Sink(&'a mut (dyn AsyncWrite + Unpin + Send)),
    /// JSON としてデコードする。空のボディなら値は変更しない
    Json(&'a mut T),
}

impl<'a> Destination<'a, IgnoredAny> {
    pub fn discard() -> Self {
        Self::Discard
    }

    pub fn sink(writer: &'a mut (dyn AsyncWrite + Unpin + Send)) -> Self {
        Self::Sink(writer)
    }
}

impl<'a, T: DeserializeOwned> Destination<'a, T> {
    pub fn json(target: &'a mut T) -> Self {
        Self::Json(target)
    }
}

/// Cloudinary API クライアント
///
/// 構築後は共有して並行に使える（`Clone` は安価）。
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    credentials: Credentials,
    base_url: Url,
    asset_root: PathBuf,
}

impl Client {
    /// 接続文字列から、依存を差し替えられるビルダーを作る
    pub fn builder(uri: &str) -> Result<ClientBuilder, ConfigError> {
        Ok(ClientBuilder::new(Credentials::parse(uri)?))
    }

    /// `cloudinary://<api_key>:<api_secret>@<cloud_name>` からクライアントを作る
    pub fn from_uri(uri: &str) -> ApiResult<Self> {
        Self::builder(uri)?.build()
    }

    /// 環境変数 CLOUDINARY_URL からクライアントを作る
    pub fn from_env() -> ApiResult<Self> {
        Self::from_env_value(std::env::var(CLOUDINARY_URL_ENV).ok())
    }

    fn from_env_value(value: Option<String>) -> ApiResult<Self> {
        let uri = value.ok_or_else(|| {
            ConfigError::credentials_not_found(format!("{} is not set", CLOUDINARY_URL_ENV))
        })?;
        Self::from_uri(&uri)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// ベースURLを差し替える。末尾スラッシュの検査はリクエスト構築時に行う
    pub fn set_base_url(&mut self, base_url: Url) {
        self.base_url = base_url;
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// ローカルパスの解決に使うディレクトリ
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// アップロード API
    pub fn upload(&self) -> UploadService<'_> {
        UploadService::new(self)
    }

    /// 相対パスをベースURLに対して解決する
    fn resolve(&self, path: &str) -> ApiResult<Url> {
        if !self.base_url.path().ends_with('/') {
            return Err(ConfigError::BaseUrlWithoutTrailingSlash {
                base_url: self.base_url.to_string(),
            }
            .into());
        }
        self.base_url
            .join(path)
            .map_err(|source| ApiError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    /// APIリクエストを作る
    ///
    /// `path` はベースURLからの相対パス（先頭スラッシュなしが基本）。
    /// `body` があれば JSON にエンコードして Content-Type を設定する。
    /// serde_json は `<` `>` `&` をエスケープしないので、変換指定はそのまま届く。
    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<Request>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;
        let mut builder = self.http.request(method, url);

        if let Some(body) = body {
            let encoded = serde_json::to_vec(body).map_err(ApiError::Serialize)?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(encoded);
        }

        Ok(builder.build()?)
    }

    /// マルチパートのアップロードリクエストを作る
    ///
    /// Content-Type は `multipart/form-data; boundary=<form の境界>` になる。
    pub fn new_upload_request(&self, path: &str, form: Form) -> ApiResult<Request> {
        let url = self.resolve(path)?;
        Ok(self.http.post(url).multipart(form).build()?)
    }

    /// リクエストを送信し、レスポンスを処理する
    ///
    /// - 送信がコンテキストと競争し、コンテキストが先に終わればその理由を返す
    /// - 送信失敗時にコンテキストが終わっていれば、送信エラーよりその理由を優先する
    /// - 200..=299 以外はボディを読み切って `ErrorResponse` にする。
    ///   読んでいる間にコンテキストが終われば `ErrorResponse` ではなくその理由を返す
    /// - 成功時は `destination` に従ってボディを処理する
    ///
    /// ボディはどの経路でも返る前に消費または破棄される。
    pub async fn execute<T>(
        &self,
        ctx: &RequestContext,
        request: Request,
        destination: Destination<'_, T>,
    ) -> ApiResult<Response>
    where
        T: DeserializeOwned,
    {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        let method = request.method().clone();
        let url = sanitize_url(request.url().clone());
        debug!(%method, %url, "sending request");

        let outcome = tokio::select! {
            biased;
            reason = ctx.done() => Err(ApiError::Cancelled(reason)),
            sent = self.transport.send(request) => Ok(sent),
        };

        let raw = match outcome? {
            Ok(raw) => raw,
            Err(err) => {
                debug!(%method, %url, error = %err, "transport failed");
                return Err(transport_failure(ctx, err));
            }
        };

        let response = Response::from_raw(method, url, &raw);
        debug!(
            method = %response.method(),
            url = %response.url(),
            status = response.status().as_u16(),
            "received response"
        );

        if !response.is_success() {
            // キャンセル以外で読めなかった場合は詳細なしのエラーとして返す
            let body = match read_body(ctx, raw).await {
                Ok(body) => body,
                Err(err @ ApiError::Cancelled(_)) => return Err(err),
                Err(_) => Bytes::new(),
            };
            return Err(ErrorResponse::from_body(response, &body).into());
        }

        match destination {
            Destination::Discard => drop(raw),
            Destination::Sink(writer) => copy_body(ctx, raw, writer).await?,
            Destination::Json(target) => {
                let body = read_body(ctx, raw).await?;
                if !body.iter().all(u8::is_ascii_whitespace) {
                    *target = serde_json::from_slice(&body).map_err(ApiError::Decode)?;
                }
            }
        }

        Ok(response)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url.as_str())
            .field("asset_root", &self.asset_root)
            .finish_non_exhaustive()
    }
}

/// コンテキストが終わっていればその理由を、そうでなければ送信エラーを返す
fn transport_failure(ctx: &RequestContext, err: TransportError) -> ApiError {
    match ctx.err() {
        Some(reason) => reason.into(),
        None => err.into(),
    }
}

async fn read_body(ctx: &RequestContext, raw: reqwest::Response) -> ApiResult<Bytes> {
    tokio::select! {
        biased;
        reason = ctx.done() => Err(reason.into()),
        body = raw.bytes() => body.map_err(|e| transport_failure(ctx, e.into())),
    }
}

async fn copy_body(
    ctx: &RequestContext,
    mut raw: reqwest::Response,
    writer: &mut (dyn AsyncWrite + Unpin + Send),
) -> ApiResult<()> {
    let copy = async {
        while let Some(chunk) = raw
            .chunk()
            .await
            .map_err(|e| transport_failure(ctx, e.into()))?
        {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| ApiError::io("Failed to write response body", e))?;
        }
        writer
            .flush()
            .await
            .map_err(|e| ApiError::io("Failed to flush response body", e))
    };

    tokio::select! {
        biased;
        reason = ctx.done() => Err(reason.into()),
        result = copy => result,
    }
}

/// アカウント単位のベースURL `<api_root>/<cloud_name>/` を作る
pub fn base_endpoint(api_root: &str, cloud_name: &str) -> Result<Url, ConfigError> {
    let raw = format!("{}/{}/", api_root.trim_end_matches('/'), cloud_name);
    Url::parse(&raw).map_err(|source| ConfigError::InvalidUri { source })
}

/// クライアントの組み立て
///
/// 既定のトランスポート、時計、アセットルートはここで一度だけ作られ、
/// クライアントに注入される。
pub struct ClientBuilder {
    credentials: Credentials,
    api_root: String,
    timeout: Duration,
    transport: Option<Arc<dyn HttpTransport>>,
    clock: Option<Arc<dyn Clock>>,
    asset_root: Option<PathBuf>,
}

impl ClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api_root: APP_CONFIG.api.endpoint.clone(),
            timeout: Duration::from_secs(APP_CONFIG.api.timeout_seconds),
            transport: None,
            clock: None,
            asset_root: None,
        }
    }

    /// API ルートURL（既定は埋め込み設定の endpoint）
    pub fn api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    /// 既定トランスポートのタイムアウト
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// ローカルパスの解決に使うディレクトリ（既定はカレントディレクトリ）
    pub fn asset_root(mut self, asset_root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(asset_root.into());
        self
    }

    pub fn build(self) -> ApiResult<Client> {
        let base_url = base_endpoint(&self.api_root, self.credentials.cloud_name())?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(TransportError::from)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_client(http.clone())),
        };

        let asset_root = match self.asset_root {
            Some(root) => root,
            None => std::env::current_dir()
                .map_err(|e| ApiError::io("Failed to resolve the working directory", e))?,
        };

        Ok(Client {
            http,
            transport,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            credentials: self.credentials,
            base_url,
            asset_root,
        })
    }
}
