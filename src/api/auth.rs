/// 認証情報と署名トークン
///
/// `cloudinary://<api_key>:<api_secret>@<cloud_name>` 形式の接続文字列を解析し、
/// アップロード時の署名トークン（UNIX秒 + API シークレット）を生成します。
use crate::config::error::ConfigError;
use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

/// 接続文字列に要求されるスキーム
pub const CLOUDINARY_SCHEME: &str = "cloudinary";

/// 現在時刻の取得元
pub trait Clock: Send + Sync {
    /// 現在の UNIX 時刻（秒）
    fn unix_timestamp(&self) -> i64;
}

/// システム時計
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Cloudinary の認証情報
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
    cloud_name: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        cloud_name: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            cloud_name: cloud_name.into(),
        }
    }

    /// 接続文字列を解析する
    ///
    /// # Errors
    /// - URLとして解釈できない: ConfigError::InvalidUri
    /// - スキームが `cloudinary` でない: ConfigError::MissingScheme
    /// - API キー / シークレット / クラウド名がない: 対応する ConfigError
    /// - API キー / シークレットのデコード結果が UTF-8 でない: ConfigError::InvalidUserInfo
    pub fn parse(uri: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(uri).map_err(|source| ConfigError::InvalidUri { source })?;

        if url.scheme() != CLOUDINARY_SCHEME {
            return Err(ConfigError::MissingScheme {
                found: url.scheme().to_string(),
            });
        }

        let api_secret = url.password().ok_or(ConfigError::MissingSecret)?;
        if url.username().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let cloud_name = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or(ConfigError::MissingCloudName)?;

        let api_key = decode_user_info(url.username(), "API key")?;
        let api_secret = decode_user_info(api_secret, "API secret")?;

        Ok(Self::new(api_key, api_secret, cloud_name))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    /// 署名トークンを生成する
    ///
    /// 呼び出しのたびに時計を読む。サーバーは許容範囲を過ぎた時刻を拒否するので
    /// キャッシュしてはならない。
    pub fn signing_token(&self, clock: &dyn Clock) -> String {
        format!("{}{}", clock.unix_timestamp(), self.api_secret)
    }

    /// API キーをマスキングして表示
    pub fn masked_api_key(&self) -> String {
        let key = &self.api_key;
        if key.chars().count() <= 8 {
            "*".repeat(key.chars().count())
        } else {
            let head: String = key.chars().take(4).collect();
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            format!("{}***{}", head, tail)
        }
    }
}

/// `Url` はユーザー情報をエンコードされたまま返すのでデコードする
fn decode_user_info(raw: &str, field: &'static str) -> Result<String, ConfigError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|source| ConfigError::InvalidUserInfo { field, source })
}

// シークレットをログに出さない
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("cloud_name", &self.cloud_name)
            .finish()
    }
}
