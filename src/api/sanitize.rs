//! URLからシークレットのクエリパラメータを取り除く。
//!
//! ログやエラーに出す前のURLはすべてここを通す。

use url::Url;

/// 伏せ字にするクエリパラメータ名
pub const SECRET_PARAM: &str = "client_secret";

/// 伏せ字
pub const REDACTED: &str = "REDACTED";

/// `client_secret` の値を `REDACTED` に置き換える。
///
/// 他のパラメータの順序と値、パスはそのまま。
/// 伏せ字にすべき値がなければ入力をそのまま返すので、何度適用しても同じ結果になる。
pub fn sanitize_url(mut url: Url) -> Url {
    if !has_unredacted_secret(&url) {
        return url;
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == SECRET_PARAM && !value.is_empty() {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url
}

/// 文字列版。URLとして解釈できない場合は入力をそのまま返す。
pub fn sanitize_url_str(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) if has_unredacted_secret(&url) => sanitize_url(url).to_string(),
        _ => raw.to_string(),
    }
}

fn has_unredacted_secret(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, value)| key == SECRET_PARAM && !value.is_empty() && value != REDACTED)
}
