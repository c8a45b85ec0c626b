/// アプリケーション設定モジュール
///
/// ビルド時に config.toml から読み込まれる静的設定を管理します。
/// これらの設定は実行時には変更できません。
use serde::Deserialize;
use std::sync::LazyLock;

/// 埋め込み設定のグローバルインスタンス（初回参照時にパース）
pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::load);

/// アプリケーション全体の設定
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// API関連の設定
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Cloudinary API のルートURL（クラウド名はこの後ろに付与される）
    pub endpoint: String,

    /// トランスポート層のタイムアウト(秒)
    pub timeout_seconds: u64,
}

/// アップロード関連の設定
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// CLI でプリセット未指定時に使うアップロードプリセット
    pub default_preset: String,
}

/// ロギング関連の設定
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// RUST_LOG 未設定時のフィルタ (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// ビルド時に埋め込まれたconfig.tomlから設定を読み込む
    ///
    /// # Panics
    /// 設定ファイルのパースに失敗した場合はパニックします。
    /// これはビルド時設定なので、実行時エラーではなくコンパイルエラーとして扱うべきです。
    pub fn load() -> Self {
        const CONFIG_STR: &str = include_str!("../../config.toml");
        toml::from_str(CONFIG_STR)
            .expect("Failed to parse embedded config.toml. This is a build-time configuration error.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let config = AppConfig::load();
        assert_eq!(config.api.endpoint, "https://api.cloudinary.com/v1_1/");
        assert_eq!(config.api.timeout_seconds, 60);
        assert!(!config.upload.default_preset.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_endpoint_has_trailing_slash() {
        // クラウド名を連結してベースURLを作るため、末尾スラッシュが必須
        assert!(APP_CONFIG.api.endpoint.ends_with('/'));
    }
}
