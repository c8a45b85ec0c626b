/// API通信用の型定義
///
/// アップロード API のリクエスト、オプション、レスポンスを定義します。
/// オプションは「未指定」と「明示的に false/空を指定」をサーバーが区別するため、
/// すべて `Option` で持ち、未指定のものはペイロードから完全に省く。
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// アップロード対象の種類（エンドポイントの先頭部分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetKind {
    #[default]
    Image,
    Video,
    Raw,
    Auto,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Raw => "raw",
            Self::Auto => "auto",
        }
    }

    /// ベースURLからの相対パス（例: `image/upload`）
    pub fn upload_path(&self) -> String {
        format!("{}/upload", self.as_str())
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// アップロードの必須項目
///
/// 署名用のタイムスタンプは送信直前に生成するので、ここには持たない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRequest {
    /// ファイル参照（ローカルパス、s3/gs 参照、HTTP(S) URL）
    pub file: String,

    /// アップロードプリセット名
    pub upload_preset: String,
}

impl UploadRequest {
    pub fn new(file: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            upload_preset: upload_preset.into(),
        }
    }
}

/// アップロードの任意項目
///
/// `UploadOptions::new().public_id("cat").overwrite(true)` のように組み立てる。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadOptions {
    // 命名と保存先
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_filename: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_filename: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// 配信タイプ（upload / private / authenticated）
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discard_original_filename: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,

    // リソースデータ
    /// カンマ区切りのタグ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faces: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_analysis: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_metadata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phash: Option<bool>,
    /// 自動タグ付けの信頼度しきい値（0.0〜1.0）。NaN と無限大は直列化エラー
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_finite"
    )]
    pub auto_tagging: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exif: Option<bool>,

    // 変換
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eager_async: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eager_notification_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_coordinates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_coordinates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_removal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_convert: Option<String>,

    // その他
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_formats: Option<String>,
    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_delete_token: Option<bool>,
}

macro_rules! option_setters {
    ($($name:ident: $ty:ty),* $(,)?) => {
        impl UploadOptions {
            $(
                pub fn $name(mut self, value: impl Into<$ty>) -> Self {
                    self.$name = Some(value.into());
                    self
                }
            )*
        }
    };
}

option_setters! {
    public_id: String,
    folder: String,
    use_filename: bool,
    unique_filename: bool,
    resource_type: String,
    delivery_type: String,
    access_mode: String,
    discard_original_filename: bool,
    overwrite: bool,
    tags: String,
    context: String,
    colors: bool,
    faces: bool,
    quality_analysis: bool,
    image_metadata: bool,
    phash: bool,
    auto_tagging: f64,
    categorization: String,
    detection: String,
    ocr: String,
    exif: bool,
    eager: String,
    eager_async: bool,
    eager_notification_url: String,
    transformation: String,
    format: String,
    custom_coordinates: String,
    face_coordinates: String,
    background_removal: String,
    raw_convert: String,
    allowed_formats: String,
    is_async: bool,
    backup: bool,
    callback: String,
    headers: String,
    invalidate: bool,
    moderation: String,
    proxy: String,
    return_delete_token: bool,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定済みのオプションをフォームのテキストフィールドに変換する
    ///
    /// 真偽値は `true`/`false`、数値は10進表記、文字列はそのまま。
    /// 未指定のオプションは含まれない。
    pub fn form_fields(&self) -> Result<Vec<(String, String)>, serde_json::Error> {
        let Value::Object(map) = serde_json::to_value(self)? else {
            return Ok(Vec::new());
        };

        Ok(map
            .into_iter()
            .map(|(key, value)| (key, form_value(value)))
            .collect())
    }
}

// serde_json は非有限の f64 を null にしてしまう
fn serialize_finite<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if !v.is_finite() => Err(S::Error::custom(format!(
            "unsupported non-finite value: {}",
            v
        ))),
        _ => value.serialize(serializer),
    }
}

fn form_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => f.to_string(),
            (None, None) => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// アップロードのレスポンス
///
/// サーバーのレスポンスをデコードしてのみ作られる。欠けているフィールドは既定値になる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResponse {
    pub public_id: String,
    pub version: i64,
    pub signature: String,
    pub width: i64,
    pub height: i64,
    pub format: String,
    pub resource_type: String,
    pub created_at: String,
    pub tags: Vec<String>,
    pub bytes: i64,
    #[serde(rename = "type")]
    pub delivery_type: String,
    pub etag: String,
    pub placeholder: bool,
    pub url: String,
    pub secure_url: String,
    pub access_mode: String,
    pub original_filename: String,
}

impl UploadResponse {
    /// 何も保存されていない（スタブ戦略の結果など）かどうか
    pub fn is_empty(&self) -> bool {
        self.public_id.is_empty() && self.secure_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(options: &UploadOptions) -> Vec<String> {
        match serde_json::to_value(options).unwrap() {
            Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unset_options_serialize_to_empty_object() {
        assert_eq!(serde_json::to_value(UploadOptions::new()).unwrap(), json!({}));
        assert!(UploadOptions::new().form_fields().unwrap().is_empty());
    }

    #[test]
    fn test_single_option_serializes_to_exactly_its_key() {
        let cases: Vec<(UploadOptions, &str)> = vec![
            (UploadOptions::new().public_id("cat"), "public_id"),
            (UploadOptions::new().folder("pets"), "folder"),
            (UploadOptions::new().use_filename(false), "use_filename"),
            (UploadOptions::new().unique_filename(false), "unique_filename"),
            (UploadOptions::new().resource_type("image"), "resource_type"),
            (UploadOptions::new().delivery_type("private"), "type"),
            (UploadOptions::new().access_mode("public"), "access_mode"),
            (UploadOptions::new().discard_original_filename(true), "discard_original_filename"),
            (UploadOptions::new().overwrite(false), "overwrite"),
            (UploadOptions::new().tags("a,b"), "tags"),
            (UploadOptions::new().context("alt=cat"), "context"),
            (UploadOptions::new().colors(false), "colors"),
            (UploadOptions::new().faces(true), "faces"),
            (UploadOptions::new().quality_analysis(true), "quality_analysis"),
            (UploadOptions::new().image_metadata(false), "image_metadata"),
            (UploadOptions::new().phash(true), "phash"),
            (UploadOptions::new().auto_tagging(0.0), "auto_tagging"),
            (UploadOptions::new().categorization("google_tagging"), "categorization"),
            (UploadOptions::new().detection("adv_face"), "detection"),
            (UploadOptions::new().ocr("adv_ocr"), "ocr"),
            (UploadOptions::new().exif(false), "exif"),
            (UploadOptions::new().eager("w_100"), "eager"),
            (UploadOptions::new().eager_async(true), "eager_async"),
            (UploadOptions::new().eager_notification_url("https://n"), "eager_notification_url"),
            (UploadOptions::new().transformation(""), "transformation"),
            (UploadOptions::new().format("png"), "format"),
            (UploadOptions::new().custom_coordinates("1,2,3,4"), "custom_coordinates"),
            (UploadOptions::new().face_coordinates("1,2,3,4"), "face_coordinates"),
            (UploadOptions::new().background_removal("cloudinary_ai"), "background_removal"),
            (UploadOptions::new().raw_convert("aspose"), "raw_convert"),
            (UploadOptions::new().allowed_formats("png,jpg"), "allowed_formats"),
            (UploadOptions::new().is_async(false), "async"),
            (UploadOptions::new().backup(true), "backup"),
            (UploadOptions::new().callback("https://cb"), "callback"),
            (UploadOptions::new().headers("X-A: b"), "headers"),
            (UploadOptions::new().invalidate(true), "invalidate"),
            (UploadOptions::new().moderation("manual"), "moderation"),
            (UploadOptions::new().proxy("http://proxy"), "proxy"),
            (UploadOptions::new().return_delete_token(false), "return_delete_token"),
        ];

        for (options, key) in cases {
            assert_eq!(keys(&options), vec![key.to_string()], "option {}", key);
            assert_eq!(options.form_fields().unwrap().len(), 1, "option {}", key);
        }
    }

    #[test]
    fn test_explicit_false_and_empty_are_kept() {
        let options = UploadOptions::new().overwrite(false).transformation("");
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({ "overwrite": false, "transformation": "" })
        );
    }

    #[test]
    fn test_form_field_values() {
        let options = UploadOptions::new()
            .overwrite(true)
            .exif(false)
            .auto_tagging(0.5)
            .public_id("cat<1>&2");
        let fields = options.form_fields().unwrap();

        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("overwrite"), Some("true"));
        assert_eq!(get("exif"), Some("false"));
        assert_eq!(get("auto_tagging"), Some("0.5"));
        assert_eq!(get("public_id"), Some("cat<1>&2"));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn test_whole_number_threshold_renders_without_fraction() {
        let fields = UploadOptions::new().auto_tagging(1.0).form_fields().unwrap();
        assert_eq!(fields, vec![("auto_tagging".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_upload_response_deserialization() {
        let json = r#"{
            "public_id": "cat",
            "version": 1700000000,
            "signature": "abc",
            "width": 640,
            "height": 480,
            "format": "png",
            "resource_type": "image",
            "created_at": "2024-01-01T00:00:00Z",
            "tags": ["pets"],
            "bytes": 1024,
            "type": "upload",
            "etag": "e",
            "placeholder": false,
            "url": "http://res.cloudinary.com/demo/image/upload/v1/cat.png",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/cat.png",
            "access_mode": "public",
            "original_filename": "cat",
            "api_key": "ignored"
        }"#;

        let response: UploadResponse = serde_json::from_str(json).expect("Failed to parse");

        assert_eq!(response.public_id, "cat");
        assert_eq!(response.width, 640);
        assert_eq!(response.tags, vec!["pets"]);
        assert_eq!(response.delivery_type, "upload");
        assert!(!response.is_empty());
    }

    #[test]
    fn test_upload_response_tolerates_missing_fields() {
        let response: UploadResponse = serde_json::from_str(r#"{"public_id":"x"}"#).unwrap();
        assert_eq!(response.public_id, "x");
        assert_eq!(response.version, 0);
        assert!(UploadResponse::default().is_empty());
    }

    #[test]
    fn test_non_finite_float_option_is_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let options = UploadOptions::new().auto_tagging(value);
            assert!(options.form_fields().is_err());
            assert!(serde_json::to_vec(&options).is_err());
        }

        let options = UploadOptions::new().auto_tagging(0.5);
        assert_eq!(
            options.form_fields().unwrap(),
            vec![("auto_tagging".to_string(), "0.5".to_string())]
        );
    }

    #[test]
    fn test_asset_kind_paths() {
        assert_eq!(AssetKind::default().upload_path(), "image/upload");
        assert_eq!(AssetKind::Video.upload_path(), "video/upload");
        assert_eq!(AssetKind::Raw.to_string(), "raw");
        assert_eq!(AssetKind::Auto.upload_path(), "auto/upload");
    }
}
