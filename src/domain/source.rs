/// ドメインサービス: ファイル参照の分類
///
/// アップロード時のファイル参照文字列を、接頭辞によって一度だけ分類する。
/// 分類結果はアップロード戦略の選択に使われ、以後変化しない。
use std::fmt;

/// ファイル参照の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource<'a> {
    /// `/` で始まるローカルパス（マルチパートでバイト列を送る）
    LocalPath(&'a str),
    /// `s3` で始まる Amazon S3 参照
    AmazonS3(&'a str),
    /// `gs` で始まる Google Cloud Storage 参照
    GoogleStorage(&'a str),
    /// それ以外（HTTP/HTTPS URL として JSON で送る）
    RemoteUrl(&'a str),
}

impl<'a> FileSource<'a> {
    pub fn classify(file: &'a str) -> Self {
        if file.starts_with('/') {
            Self::LocalPath(file)
        } else if file.starts_with("s3") {
            Self::AmazonS3(file)
        } else if file.starts_with("gs") {
            Self::GoogleStorage(file)
        } else {
            Self::RemoteUrl(file)
        }
    }

    /// 元のファイル参照文字列
    pub fn reference(&self) -> &'a str {
        match self {
            Self::LocalPath(s) | Self::AmazonS3(s) | Self::GoogleStorage(s) | Self::RemoteUrl(s) => s,
        }
    }

    /// オブジェクトストレージ参照かどうか
    pub fn is_object_storage(&self) -> bool {
        matches!(self, Self::AmazonS3(_) | Self::GoogleStorage(_))
    }
}

impl fmt::Display for FileSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::LocalPath(_) => "local path",
            Self::AmazonS3(_) => "Amazon S3",
            Self::GoogleStorage(_) => "Google Storage",
            Self::RemoteUrl(_) => "remote URL",
        };
        write!(f, "{} '{}'", kind, self.reference())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_prefix() {
        assert_eq!(
            FileSource::classify("/tmp/cat.png"),
            FileSource::LocalPath("/tmp/cat.png")
        );
        assert_eq!(
            FileSource::classify("s3://bucket/cat.png"),
            FileSource::AmazonS3("s3://bucket/cat.png")
        );
        assert_eq!(
            FileSource::classify("gs://bucket/cat.png"),
            FileSource::GoogleStorage("gs://bucket/cat.png")
        );
        assert_eq!(
            FileSource::classify("https://example.com/cat.png"),
            FileSource::RemoteUrl("https://example.com/cat.png")
        );
    }

    #[test]
    fn test_prefix_match_is_literal() {
        // 接頭辞のみで判定するため、URLらしさは見ない
        assert!(matches!(FileSource::classify("s3cret.png"), FileSource::AmazonS3(_)));
        assert!(matches!(FileSource::classify("http://s3.amazonaws.com/x"), FileSource::RemoteUrl(_)));
        assert!(matches!(FileSource::classify("cat.png"), FileSource::RemoteUrl(_)));
        assert!(matches!(FileSource::classify(""), FileSource::RemoteUrl(_)));
    }

    #[test]
    fn test_object_storage_and_display() {
        assert!(FileSource::classify("gs://b/o").is_object_storage());
        assert!(!FileSource::classify("/a").is_object_storage());
        assert_eq!(
            FileSource::classify("/a/b.png").to_string(),
            "local path '/a/b.png'"
        );
    }
}
