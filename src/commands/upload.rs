/// アップロードコマンド
///
/// ローカルファイルまたはリモートURLを Cloudinary にアップロードします。
/// Ctrl-C でリクエストをキャンセルできます。
use crate::commands::result::{CommandResult, UploadResult};
use anyhow::{Context, Result};
use cloudup::api::{AssetKind, ClientBuilder, RequestContext, UploadOptions, UploadRequest};
use cloudup::config::user::CLOUDINARY_URL_ENV;
use cloudup::config::{APP_CONFIG, UserConfig};
use std::env;
use std::path::Path;

/// アップロードコマンドの引数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadArgs {
    /// ローカルパス、またはスキーム付きの参照（https://, s3://, gs://）
    pub file: String,
    pub kind: AssetKind,
    pub preset: Option<String>,
    pub public_id: Option<String>,
    pub folder: Option<String>,
    pub tags: Vec<String>,
    pub overwrite: bool,
}

/// アップロードコマンドを実行する
///
/// # エラー
/// このレイヤーでは anyhow::Result を返し、
/// ライブラリの ConfigError / DomainError / ApiError を集約する。
pub async fn execute(args: UploadArgs) -> Result<CommandResult> {
    let config = UserConfig::load()
        .context("Failed to load user configuration. Please check your config.toml file.")?;
    let credentials = config
        .credentials(env::var(CLOUDINARY_URL_ENV).ok())
        .context("Cloudinary credentials are not available")?;

    // ローカルパスは絶対パスにしてから渡すので、ルートは "/" でよい
    let client = ClientBuilder::new(credentials)
        .asset_root("/")
        .build()
        .context("Failed to initialize the API client")?;

    let file = file_reference(&args.file)?;
    let preset = args
        .preset
        .clone()
        .or_else(|| config.upload_preset.clone())
        .unwrap_or_else(|| APP_CONFIG.upload.default_preset.clone());
    let request = UploadRequest::new(file.clone(), preset);
    let options = build_options(&args);

    let ctx = RequestContext::background();
    let interrupt = ctx.cancellation_token();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    eprintln!("Uploading {}...", file);
    let outcome = client
        .upload()
        .upload(&ctx, args.kind, &request, &options)
        .await;
    watcher.abort();

    let (uploaded, response) = outcome.context("Upload failed")?;

    Ok(CommandResult::Upload(UploadResult {
        file,
        transferred: response.is_some(),
        public_id: uploaded.public_id,
        version: uploaded.version,
        format: uploaded.format,
        resource_type: uploaded.resource_type,
        bytes: uploaded.bytes,
        width: uploaded.width,
        height: uploaded.height,
        secure_url: uploaded.secure_url,
        tags: uploaded.tags,
        status: response.map(|r| r.status().as_u16()),
    }))
}

/// CLI 引数をファイル参照文字列にする
///
/// スキーム付きの参照はそのまま、それ以外はローカルパスとして絶対パスにする。
fn file_reference(arg: &str) -> Result<String> {
    if arg.contains("://") {
        return Ok(arg.to_string());
    }

    let absolute = std::path::absolute(Path::new(arg))
        .with_context(|| format!("Failed to resolve path: {}", arg))?;
    Ok(absolute.to_string_lossy().into_owned())
}

fn build_options(args: &UploadArgs) -> UploadOptions {
    let mut options = UploadOptions::new();

    if let Some(public_id) = &args.public_id {
        options = options.public_id(public_id.as_str());
    }
    if let Some(folder) = &args.folder {
        options = options.folder(folder.as_str());
    }
    if !args.tags.is_empty() {
        options = options.tags(args.tags.join(","));
    }
    if args.overwrite {
        options = options.overwrite(true);
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_references_pass_through() {
        for reference in ["https://example.com/cat.png", "s3://bucket/cat.png", "gs://b/c.png"] {
            assert_eq!(file_reference(reference).unwrap(), reference);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_local_path_becomes_absolute() {
        let reference = file_reference("cat.png").unwrap();
        assert!(reference.starts_with('/'));
        assert!(reference.ends_with("cat.png"));

        assert_eq!(file_reference("/tmp/cat.png").unwrap(), "/tmp/cat.png");
    }

    #[test]
    fn test_only_given_flags_become_options() {
        let args = UploadArgs {
            file: "cat.png".to_string(),
            ..Default::default()
        };
        assert_eq!(build_options(&args), UploadOptions::new());

        let args = UploadArgs {
            file: "cat.png".to_string(),
            public_id: Some("cat".to_string()),
            tags: vec!["pets".to_string(), "cute".to_string()],
            overwrite: true,
            ..Default::default()
        };
        let options = build_options(&args);
        assert_eq!(options.public_id.as_deref(), Some("cat"));
        assert_eq!(options.tags.as_deref(), Some("pets,cute"));
        assert_eq!(options.overwrite, Some(true));
        assert_eq!(options.folder, None);
    }
}
