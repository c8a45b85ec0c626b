/// ログ出力の初期化
///
/// `RUST_LOG` があればそれを使い、なければ埋め込み設定の
/// `[logging] level` を使う。出力先は stderr（stdout は --machine 用）。
use cloudup::config::APP_CONFIG;
use tracing_subscriber::EnvFilter;

/// 環境変数がない場合のフィルタ
fn default_filter() -> EnvFilter {
    EnvFilter::new(format!("cloudup={}", APP_CONFIG.logging.level))
}

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    // 二重初期化（テストなど）は無視する
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_app_config_level() {
        let filter = default_filter().to_string();
        assert!(filter.contains("cloudup"));
        assert!(filter.contains(&APP_CONFIG.logging.level));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init();
    }
}
