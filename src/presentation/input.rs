/// プレゼンテーション層: ユーザー入力処理
///
/// CLI引数やstdinからのユーザー入力を取得し、
/// アプリケーション層で使用可能な形式に変換します。
use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};

/// 対話的に接続文字列を取得
pub fn read_cloudinary_url_interactive() -> Result<String> {
    eprintln!("Logging in to Cloudinary...");
    eprintln!();
    eprintln!("Please enter your Cloudinary URL (cloudinary://<api_key>:<api_secret>@<cloud_name>).");
    eprintln!("You can find it on the dashboard at: https://console.cloudinary.com/");
    eprintln!();

    eprint!("Cloudinary URL: ");
    io::stderr().flush()?;
    read_url_line(&mut io::stdin().lock(), "input")
}

/// stdin からパイプで接続文字列を取得（1行目のみ）
pub fn read_cloudinary_url_from_stdin() -> Result<String> {
    read_url_line(&mut io::stdin().lock(), "stdin")
}

fn read_url_line(reader: &mut impl BufRead, origin: &str) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .with_context(|| format!("Failed to read Cloudinary URL from {}", origin))?;
    let url = line.trim().to_string();

    if url.is_empty() {
        bail!("Cloudinary URL cannot be empty. Please provide a valid cloudinary:// URL.");
    }

    Ok(url)
}
