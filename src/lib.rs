//! cloudup - Cloudinary アップロード API クライアント
//!
//! - `api`: リクエストの組み立てと送信、レスポンス処理、アップロード
//! - `config`: 埋め込み設定とユーザー設定、接続文字列のエラー
//! - `domain`: ファイル参照の分類とアセットの制約
//! - `error_severity`: 各層のエラーに共通の深刻度（CLI の終了コード）

pub mod api;
pub mod config;
pub mod domain;
pub mod error_severity;
