/// ログインコマンド
///
/// Cloudinary の接続文字列を検証し、config.toml に保存します。
use crate::commands::result::{CommandResult, LoginResult};
use anyhow::{Context, Result};
use cloudup::api::auth::Credentials;
use cloudup::config::UserConfig;
use cloudup::config::error::ConfigError;
use std::path::Path;
use tracing::warn;

/// ログインコマンドを実行
///
/// # Returns
/// 成功時はOk(CommandResult)、失敗時はエラー
pub async fn execute(cloudinary_url: String) -> Result<CommandResult> {
    let config_path = UserConfig::config_path().context("Failed to locate configuration file")?;
    save_credentials(cloudinary_url, &config_path)
}

fn save_credentials(cloudinary_url: String, config_path: &Path) -> Result<CommandResult> {
    let cloudinary_url = cloudinary_url.trim().to_string();

    // 保存前に形式を検証（エラーメッセージにシークレットは含まれない）
    let credentials =
        Credentials::parse(&cloudinary_url).context("The Cloudinary URL is not valid")?;

    let mut config = match UserConfig::load_from(config_path) {
        Ok(config) => config,
        // 壊れた接続文字列はこれから上書きするので作り直す
        Err(ConfigError::ValidationError { message }) => {
            warn!(%message, "replacing invalid stored configuration");
            UserConfig::default()
        }
        Err(e) => return Err(e).context("Failed to load configuration file"),
    };

    let was_logged_in = config.has_credentials();
    config.set_cloudinary_url(cloudinary_url);

    config
        .save_to(config_path)
        .context("Failed to save configuration file")?;

    Ok(CommandResult::Login(LoginResult {
        was_logged_in,
        cloud_name: credentials.cloud_name().to_string(),
        api_key: credentials.masked_api_key(),
    }))
}
