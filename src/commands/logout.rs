/// ログアウトコマンド
///
/// 保存されている接続文字列を削除します。
/// CLOUDINARY_URL 環境変数には触れません。
use crate::commands::result::{CommandResult, LogoutResult};
use anyhow::{Context, Result};
use cloudup::config::UserConfig;
use std::path::Path;

/// ログアウトコマンドを実行
///
/// # Returns
/// 成功時はOk(CommandResult)、失敗時はエラー
pub async fn execute() -> Result<CommandResult> {
    let config_path = UserConfig::config_path().context("Failed to locate configuration file")?;
    clear_credentials(&config_path)
}

fn clear_credentials(config_path: &Path) -> Result<CommandResult> {
    let mut config = UserConfig::load_from(config_path)
        .context("Failed to load configuration file")?;

    // 認証情報が存在するか確認
    let was_logged_in = config.has_credentials();

    if !was_logged_in {
        return Ok(CommandResult::Logout(LogoutResult { was_logged_in: false }));
    }

    config.clear_credentials();

    config
        .save_to(config_path)
        .context("Failed to save configuration file")?;

    Ok(CommandResult::Logout(LogoutResult { was_logged_in: true }))
}
