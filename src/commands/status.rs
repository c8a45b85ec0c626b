/// ステータスコマンド
///
/// 有効な接続文字列があるか、どこから読まれるかを表示します。
/// ネットワークには接続しません。
use crate::commands::result::{CommandResult, CredentialSource, StatusResult};
use anyhow::{Context, Result};
use cloudup::config::user::CLOUDINARY_URL_ENV;
use cloudup::config::{APP_CONFIG, UserConfig};
use std::env;

/// ステータスコマンドを実行
///
/// # Returns
/// 成功時はOk(CommandResult)、失敗時はエラー
pub async fn execute() -> Result<CommandResult> {
    let config = UserConfig::load().context("Failed to load configuration file")?;
    Ok(describe(&config, env::var(CLOUDINARY_URL_ENV).ok()))
}

fn describe(config: &UserConfig, env_url: Option<String>) -> CommandResult {
    let source = if env_url.as_deref().is_some_and(|url| !url.trim().is_empty()) {
        Some(CredentialSource::Environment)
    } else if config.has_credentials() {
        Some(CredentialSource::ConfigFile)
    } else {
        None
    };

    let credentials = config.credentials(env_url).ok();
    let upload_preset = config
        .upload_preset
        .clone()
        .unwrap_or_else(|| APP_CONFIG.upload.default_preset.clone());

    CommandResult::Status(StatusResult {
        is_configured: credentials.is_some(),
        source,
        cloud_name: credentials.as_ref().map(|c| c.cloud_name().to_string()),
        api_key: credentials.as_ref().map(|c| c.masked_api_key()),
        upload_preset,
    })
}
