/// ユーザー設定モジュール
///
/// 実行時にユーザーディレクトリから読み込まれる動的設定を管理します。
/// Windows: C:\Users\<User>\AppData\Roaming\cloudup\config.toml
/// macOS:   /Users/<User>/Library/Application Support/cloudup/config.toml
/// Linux:   /home/<user>/.config/cloudup/config.toml
///
/// 初回起動時にデフォルトテンプレートから config.toml を作成します。
use crate::api::auth::Credentials;
use crate::config::error::ConfigError;
use crate::config::permissions::set_token_file_permissions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 保存済みURLより優先される環境変数
pub const CLOUDINARY_URL_ENV: &str = "CLOUDINARY_URL";

/// ユーザー設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// `cloudinary://<api_key>:<api_secret>@<cloud_name>` 形式の接続文字列
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudinary_url: Option<String>,

    /// 既定のアップロードプリセット
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_preset: Option<String>,
}

impl UserConfig {
    /// ユーザー設定ファイルのパスを取得
    ///
    /// # Errors
    /// 設定ディレクトリが取得できない場合に ConfigError::DirectoryNotFound を返します。
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .ok_or_else(|| ConfigError::directory_not_found("Failed to get user config directory"))
            .map(|config_dir| config_dir.join("cloudup").join("config.toml"))
    }

    /// 既定パスからユーザー設定を読み込む
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスからユーザー設定を読み込む
    ///
    /// ファイルが存在しない場合はデフォルトテンプレートから作成します。
    /// 読み込み後、自動的に検証を実行します（Fail Fast）。
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to read config file: {}", config_path.display()),
                e,
            )
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ConfigError::parse_error(
                format!("Failed to parse config file ({})", config_path.display()),
                e,
            )
        })?;

        config.validate()?;

        Ok(config)
    }

    /// デフォルト設定ファイルを作成
    fn create_default_config(config_path: &Path) -> Result<(), ConfigError> {
        Self::ensure_parent_dir(config_path)?;

        fs::write(config_path, Self::default_toml_content()).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to create default config file: {}", config_path.display()),
                e,
            )
        })?;

        Ok(())
    }

    fn default_toml_content() -> &'static str {
        r#"# cloudup - User Configuration
# Credentials are stored with 'cloudup login'.
# The CLOUDINARY_URL environment variable takes precedence over this file.

# cloudinary_url = "cloudinary://<api_key>:<api_secret>@<cloud_name>"
# upload_preset = "my_preset"
"#
    }

    fn ensure_parent_dir(config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::file_system(
                    format!("Failed to create config directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// 既定パスへ保存する
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// 指定パスへ保存する
    ///
    /// シークレットを含むため、保存後に所有者のみ読み書き可能な権限へ変更します。
    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        Self::ensure_parent_dir(config_path)?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::serialize_error("Failed to serialize config", e))?;

        fs::write(config_path, content).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to write config file: {}", config_path.display()),
                e,
            )
        })?;

        set_token_file_permissions(config_path)
    }

    /// ユーザー設定を検証
    ///
    /// # 検証内容
    /// - cloudinary_url: 設定されている場合は接続文字列として解釈できること
    /// - upload_preset: 設定されている場合は空白のみでないこと
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.cloudinary_url {
            Credentials::parse(url).map_err(|e| {
                ConfigError::validation_error(format!(
                    "stored cloudinary_url is invalid ({}). Please run 'cloudup login' again.",
                    e
                ))
            })?;
        }

        if let Some(preset) = &self.upload_preset
            && preset.trim().is_empty()
        {
            return Err(ConfigError::validation_error(
                "upload_preset cannot be empty",
            ));
        }

        Ok(())
    }

    /// 接続文字列を設定
    pub fn set_cloudinary_url(&mut self, url: String) {
        self.cloudinary_url = Some(url);
    }

    /// 接続文字列が存在するかチェック
    pub fn has_credentials(&self) -> bool {
        self.cloudinary_url.is_some()
    }

    /// 接続文字列を削除
    pub fn clear_credentials(&mut self) {
        self.cloudinary_url = None;
    }

    /// 有効な接続文字列を解決する
    ///
    /// `env_override`（通常は CLOUDINARY_URL の値）が優先される。
    pub fn resolve_url(&self, env_override: Option<String>) -> Result<String, ConfigError> {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.cloudinary_url.clone())
            .ok_or_else(|| {
                ConfigError::credentials_not_found(
                    "No Cloudinary URL configured. Please run 'cloudup login' first.",
                )
            })
    }

    /// 接続文字列を解析して認証情報を返す
    pub fn credentials(&self, env_override: Option<String>) -> Result<Credentials, ConfigError> {
        Credentials::parse(&self.resolve_url(env_override)?)
    }
}
