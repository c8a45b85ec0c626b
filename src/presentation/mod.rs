/// プレゼンテーション層モジュール
///
/// コマンドの実行結果とユーザーとの入出力の橋渡しを行います。
/// プレゼンテーション層はライブラリ（api, config, domain）に依存しますが、
/// その逆はありません。
///
/// # モジュール
/// - `input`: ユーザー入力処理
/// - `output`: コマンド結果とエラーの出力（人間向け・機械向け）

pub mod input;
pub mod output;
