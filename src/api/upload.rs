/// アップロード API
///
/// ファイル参照の接頭辞からアップロード戦略を選び、署名して送信する。
/// - `/` で始まる: ローカルファイルをマルチパートでストリーミング送信
/// - `s3` / `gs` で始まる: 転送は未対応。空の成功結果を返す
/// - それ以外: URL を JSON ボディで送信（サーバー側で取得される）
use crate::api::client::{Client, Destination};
use crate::api::context::RequestContext;
use crate::api::error::ApiError;
use crate::api::response::Response;
use crate::api::types::{AssetKind, UploadOptions, UploadRequest, UploadResponse};
use crate::domain::error::DomainError;
use crate::domain::source::FileSource;
use reqwest::Body;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// アップロード結果（成功レスポンスと、受信したレスポンスのエンベロープ）
pub type UploadResult = Result<(UploadResponse, Option<Response>), ApiError>;

/// JSON 経路で送るボディ
#[derive(Serialize)]
struct SignedPayload<'a> {
    #[serde(flatten)]
    request: &'a UploadRequest,
    timestamp: String,
    #[serde(flatten)]
    options: &'a UploadOptions,
}

/// アップロード API のサービス
pub struct UploadService<'a> {
    client: &'a Client,
}

impl<'a> UploadService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// 画像をアップロードする（`image/upload`）
    pub async fn upload_image(
        &self,
        ctx: &RequestContext,
        request: &UploadRequest,
        options: &UploadOptions,
    ) -> UploadResult {
        self.upload(ctx, AssetKind::Image, request, options).await
    }

    /// 指定した種類のアセットをアップロードする
    ///
    /// # Errors
    /// - ローカルパスがディレクトリ: DomainError::NotAFile（送信前）
    /// - ローカルパスが存在しない: DomainError::FileNotFound（送信前）
    /// - それ以外は `Client::execute` と同じ
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        kind: AssetKind,
        request: &UploadRequest,
        options: &UploadOptions,
    ) -> UploadResult {
        let path = kind.upload_path();
        let source = FileSource::classify(&request.file);
        debug!(%source, %kind, "selected upload strategy");

        match source {
            FileSource::LocalPath(file) => {
                self.upload_from_local_path(ctx, &path, file, request, options)
                    .await
            }
            FileSource::AmazonS3(_) | FileSource::GoogleStorage(_) => {
                Ok(self.upload_from_object_storage(source))
            }
            FileSource::RemoteUrl(_) => self.upload_from_url(ctx, &path, request, options).await,
        }
    }

    async fn upload_from_url(
        &self,
        ctx: &RequestContext,
        path: &str,
        request: &UploadRequest,
        options: &UploadOptions,
    ) -> UploadResult {
        let payload = SignedPayload {
            request,
            timestamp: self.signing_token(),
            options,
        };
        let http_request = self
            .client
            .new_request(Method::POST, path, Some(&payload))?;

        let mut uploaded = UploadResponse::default();
        let response = self
            .client
            .execute(ctx, http_request, Destination::json(&mut uploaded))
            .await?;

        Ok((uploaded, Some(response)))
    }

    async fn upload_from_local_path(
        &self,
        ctx: &RequestContext,
        path: &str,
        file: &str,
        request: &UploadRequest,
        options: &UploadOptions,
    ) -> UploadResult {
        let location = resolve_local_path(self.client.asset_root(), file);
        let (handle, length) = open_asset(&location).await?;

        let file_name = location
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(handle)), length)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;

        let mut form = Form::new()
            .text("timestamp", self.signing_token())
            .text("upload_preset", request.upload_preset.clone())
            .part("file", part);
        for (key, value) in options.form_fields().map_err(ApiError::Serialize)? {
            form = form.text(key, value);
        }

        let http_request = self.client.new_upload_request(path, form)?;

        let mut uploaded = UploadResponse::default();
        let response = self
            .client
            .execute(ctx, http_request, Destination::json(&mut uploaded))
            .await?;

        Ok((uploaded, Some(response)))
    }

    fn upload_from_object_storage(&self, source: FileSource<'_>) -> (UploadResponse, Option<Response>) {
        warn!(%source, "object storage uploads are not implemented; nothing was transferred");
        (UploadResponse::default(), None)
    }

    /// 署名トークン。アップロードのたびに時計を読み直す
    fn signing_token(&self) -> String {
        self.client.credentials().signing_token(self.client.clock())
    }
}

/// ローカルパスをアセットルートからの相対パスとして解決する
pub fn resolve_local_path(asset_root: &Path, file: &str) -> PathBuf {
    asset_root.join(file.trim_start_matches('/'))
}

/// アセットを開き、ファイルであることを確認する
async fn open_asset(location: &Path) -> Result<(tokio::fs::File, u64), ApiError> {
    let display = location.display().to_string();
    let not_readable = |e: io::Error| match e.kind() {
        io::ErrorKind::NotFound => ApiError::from(DomainError::file_not_found(&display)),
        _ => ApiError::io(format!("Failed to read {}", display), e),
    };

    let metadata = tokio::fs::metadata(location).await.map_err(&not_readable)?;
    if metadata.is_dir() {
        return Err(DomainError::not_a_file(&display).into());
    }

    let handle = tokio::fs::File::open(location).await.map_err(&not_readable)?;
    Ok((handle, metadata.len()))
}
