use crate::commands::{self, CommandResult};
use crate::commands::upload::UploadArgs;
use crate::presentation::input;
use anyhow::{Context, Result, bail};
use cloudup::api::AssetKind;

/// CLI引数を解析し、適切なコマンドにディスパッチする
///
/// `--machine` は呼び出し側で取り除いてから渡す。
pub async fn parse_args(args: &[String]) -> Result<CommandResult> {
    if args.len() < 2 {
        return commands::help::execute().await;
    }

    let command = &args[1];

    match command.as_str() {
        "login" => {
            let cloudinary_url = match args.get(2).map(String::as_str) {
                Some("--stdin") => input::read_cloudinary_url_from_stdin()?,
                Some(url) => url.to_string(),
                None => input::read_cloudinary_url_interactive()?,
            };
            commands::login::execute(cloudinary_url)
                .await
                .context("Login command failed")
        }
        "logout" => commands::logout::execute()
            .await
            .context("Logout command failed"),
        "status" => commands::status::execute()
            .await
            .context("Status command failed"),
        "upload" => {
            let upload_args = parse_upload_args(&args[2..])?;
            commands::upload::execute(upload_args)
                .await
                .context("Upload command failed")
        }
        "help" | "--help" | "-h" => commands::help::execute().await,
        _ => bail!(
            "Unknown command: '{}'. Use 'help' to see available commands.",
            command
        ),
    }
}

/// upload コマンドの引数を解析する
fn parse_upload_args(args: &[String]) -> Result<UploadArgs> {
    let mut upload = UploadArgs::default();
    let mut file = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--preset" => upload.preset = Some(flag_value(&mut iter, "--preset")?),
            "--public-id" => upload.public_id = Some(flag_value(&mut iter, "--public-id")?),
            "--folder" => upload.folder = Some(flag_value(&mut iter, "--folder")?),
            "--tag" => upload.tags.push(flag_value(&mut iter, "--tag")?),
            "--kind" => upload.kind = parse_kind(&flag_value(&mut iter, "--kind")?)?,
            "--overwrite" => upload.overwrite = true,
            flag if flag.starts_with("--") => {
                bail!("Unknown option for upload: '{}'", flag)
            }
            value => {
                if file.is_some() {
                    bail!("Only one file can be uploaded at a time (unexpected '{}')", value);
                }
                file = Some(value.to_string());
            }
        }
    }

    upload.file = file.context("Please specify a file path or URL for upload command")?;
    Ok(upload)
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String> {
    iter.next()
        .filter(|value| !value.starts_with("--"))
        .cloned()
        .with_context(|| format!("Option '{}' requires a value", flag))
}

fn parse_kind(value: &str) -> Result<AssetKind> {
    match value {
        "image" => Ok(AssetKind::Image),
        "video" => Ok(AssetKind::Video),
        "raw" => Ok(AssetKind::Raw),
        "auto" => Ok(AssetKind::Auto),
        other => bail!(
            "Unknown asset kind: '{}'. Expected image, video, raw or auto.",
            other
        ),
    }
}
