/// 設定管理モジュール
///
/// 2層の設定構造を提供します:
/// 1. AppConfig - ビルド時に埋め込まれる静的設定（APP_CONFIG）
/// 2. UserConfig - 実行時に読み込まれる動的設定（接続文字列、既定プリセット）
///
/// # 使用例
///
/// ```no_run
/// use cloudup::config::{APP_CONFIG, UserConfig};
///
/// let endpoint = &APP_CONFIG.api.endpoint;
/// let user_config = UserConfig::load()?;
/// let credentials = user_config.credentials(std::env::var("CLOUDINARY_URL").ok())?;
/// # Ok::<(), cloudup::config::error::ConfigError>(())
/// ```
pub mod app;
pub mod error;
pub mod permissions;
pub mod user;

pub use app::APP_CONFIG;
pub use user::UserConfig;
