/// コマンド実行結果を表す型
///
/// 各コマンドはこの型を返し、プレゼンテーション層（main.rs/cli.rs）で
/// 人間向けと機械向けの出力フォーマットを決定する。
use serde::Serialize;

/// コマンド実行結果の統一型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandResult {
    Login(LoginResult),
    Logout(LogoutResult),
    Upload(UploadResult),
    Status(StatusResult),
    Help,
}

/// ログインコマンドの結果
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// 既にログイン済みだったか（上書き更新の場合true）
    pub was_logged_in: bool,
    pub cloud_name: String,
    /// マスキングされた API キー
    pub api_key: String,
}

/// ログアウトコマンドの結果
#[derive(Debug, Clone, Serialize)]
pub struct LogoutResult {
    /// ログイン状態だったか
    pub was_logged_in: bool,
}

/// 認証情報の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// CLOUDINARY_URL 環境変数
    Environment,
    /// ユーザー設定ファイル
    ConfigFile,
}

/// ステータスコマンドの結果
#[derive(Debug, Clone, Serialize)]
pub struct StatusResult {
    /// 有効な接続文字列があるか
    pub is_configured: bool,
    pub source: Option<CredentialSource>,
    pub cloud_name: Option<String>,
    /// マスキングされた API キー
    pub api_key: Option<String>,
    /// プリセット未指定時に使われるアップロードプリセット
    pub upload_preset: String,
}

/// アップロードコマンドの結果
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    /// 指定されたファイル参照
    pub file: String,
    /// 実際にサーバーへ転送されたか（オブジェクトストレージ参照では false）
    pub transferred: bool,
    pub public_id: String,
    pub version: i64,
    pub format: String,
    pub resource_type: String,
    pub bytes: i64,
    pub width: i64,
    pub height: i64,
    pub secure_url: String,
    pub tags: Vec<String>,
    /// レスポンスのステータスコード
    pub status: Option<u16>,
}

impl CommandResult {
    /// 成功メッセージを取得（人間向け出力用）
    pub fn success_message(&self) -> String {
        match self {
            CommandResult::Login(r) => {
                if r.was_logged_in {
                    "Login credentials updated!".to_string()
                } else {
                    "Login successful!".to_string()
                }
            }
            CommandResult::Logout(r) => {
                if r.was_logged_in {
                    "Logged out successfully.".to_string()
                } else {
                    "Already logged out.".to_string()
                }
            }
            CommandResult::Upload(r) => {
                if r.transferred {
                    "Upload completed successfully!".to_string()
                } else {
                    "Nothing was transferred.".to_string()
                }
            }
            CommandResult::Status(r) => {
                if r.is_configured {
                    "Configured".to_string()
                } else {
                    "Not configured".to_string()
                }
            }
            CommandResult::Help => "".to_string(),
        }
    }
}
