/// ドメイン層
///
/// ファイル参照の分類とアセットの制約違反エラー。
/// 外部クレート（HTTP、ファイルシステム）には依存しない。
pub mod error;
pub mod source;
