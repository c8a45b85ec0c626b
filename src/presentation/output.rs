/// プレゼンテーション層: コマンド結果の出力
///
/// コマンド実行結果をユーザー向け（人間可読）または
/// 機械向け（JSON）形式で出力する責務を担います。
/// エラーの出力とCLI使用方法の表示もこのモジュールが担当します。
use crate::commands::result::{CommandResult, CredentialSource};
use anyhow::Result;
use serde_json::Value;

/// ヘルプテキスト（単一の情報源）
const HELP_TEXT: &str = "cloudup
Upload images and other assets to Cloudinary from the command line

Usage:
  cloudup [--machine] <command> [args...]

Global Flags:
  --machine        - Output machine-readable JSON to stdout (for scripting)
                     Works for both success and error cases

Available commands:
  login [<url> | --stdin]
                   - Save a Cloudinary URL (cloudinary://<api_key>:<api_secret>@<cloud_name>)
                     Without arguments: Interactive input (default)
                     With --stdin: Read the URL from the first line of standard input
  logout           - Remove the saved Cloudinary URL
  status           - Show which credentials and upload preset will be used
  upload <file|url> [--kind image|video|raw|auto] [--preset <name>]
         [--public-id <id>] [--folder <folder>] [--tag <tag>]... [--overwrite]
                   - Upload a local file, or let Cloudinary fetch a remote URL
  help             - Display this help message

Environment:
  CLOUDINARY_URL   - Takes precedence over the saved URL
  RUST_LOG         - Log filter for diagnostics written to stderr (e.g. cloudup=debug)

Machine-Readable Output:
  --machine status               - JSON output for success
  echo \"cloudinary://...\" | cloudup --machine login --stdin
                                 - Automated login with JSON response

Error Output:
  Normal mode:   Human-readable error messages to stderr
  --machine:     JSON error object with exit_code and hint fields";

/// コマンド使用方法を表示する
pub fn print_usage() {
    eprintln!("{}", HELP_TEXT);
}

/// コマンド結果を適切な形式で出力する
///
/// # Arguments
/// * `result` - コマンド実行結果
/// * `machine_output` - 機械可読出力フラグ
///
/// # Output
/// * `machine_output = false`: 人間向けの詳細メッセージ（stderr）
/// * `machine_output = true`: 機械可読JSON（stdout）
pub fn output_result(result: &CommandResult, machine_output: bool) -> Result<()> {
    if machine_output {
        println!("{}", serde_json::to_string(&machine_readable(result)?)?);
    } else {
        output_human_readable(result);
    }

    Ok(())
}

/// エラーを出力する
///
/// 機械向けの場合は stdout に JSON、それ以外は stderr に人間向けのメッセージ。
pub fn output_error(error: &anyhow::Error, exit_code: i32, hint: Option<&str>, machine_output: bool) {
    if machine_output {
        println!("{}", error_json(error, exit_code, hint));
        return;
    }

    eprintln!("Error: {}", error);

    // エラーチェーンを辿って詳細を表示
    let chain: Vec<_> = error.chain().skip(1).collect();
    if !chain.is_empty() {
        eprintln!("\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            eprintln!("  {}: {}", i + 1, cause);
        }
    }

    if let Some(hint) = hint {
        eprintln!("\nHint: {}", hint);
    }
}

fn error_json(error: &anyhow::Error, exit_code: i32, hint: Option<&str>) -> Value {
    serde_json::json!({
        "success": false,
        "error": error.to_string(),
        "causes": error.chain().skip(1).map(|c| c.to_string()).collect::<Vec<_>>(),
        "exit_code": exit_code,
        "hint": hint
    })
}

/// 人間向けの詳細メッセージを出力（stderr）
///
/// すべての出力はstderrに送られ、stdoutはパイプライン用に予約されます。
fn output_human_readable(result: &CommandResult) {
    match result {
        CommandResult::Login(r) => {
            eprintln!();
            eprintln!("{}", result.success_message());
            eprintln!("Cloud name: {}", r.cloud_name);
            eprintln!("API key:    {}", r.api_key);
            eprintln!("The Cloudinary URL has been saved.");
        }
        CommandResult::Logout(r) => {
            eprintln!("{}", result.success_message());
            if r.was_logged_in {
                eprintln!("The saved Cloudinary URL has been removed.");
            }
        }
        CommandResult::Status(r) => {
            eprintln!();
            eprintln!("{}", result.success_message());
            match r.source {
                Some(CredentialSource::Environment) => {
                    eprintln!("Credentials from: CLOUDINARY_URL environment variable")
                }
                Some(CredentialSource::ConfigFile) => {
                    eprintln!("Credentials from: configuration file")
                }
                None => {
                    eprintln!("No Cloudinary URL found.");
                    eprintln!("Please run 'cloudup login' or set CLOUDINARY_URL.");
                }
            }
            if let Some(cloud_name) = &r.cloud_name {
                eprintln!("Cloud name:     {}", cloud_name);
            }
            if let Some(api_key) = &r.api_key {
                eprintln!("API key:        {}", api_key);
            }
            if r.source.is_some() && !r.is_configured {
                eprintln!("The Cloudinary URL is not valid. Please run 'cloudup login' again.");
            }
            eprintln!("Upload preset:  {}", r.upload_preset);
        }
        CommandResult::Upload(r) => {
            eprintln!("\n{}", result.success_message());
            if !r.transferred {
                eprintln!("Object storage references are not supported yet: {}", r.file);
                return;
            }
            eprintln!("---");
            eprintln!("Public ID:  {}", r.public_id);
            eprintln!("Version:    {}", r.version);
            if !r.format.is_empty() {
                eprintln!("Format:     {} ({})", r.format, r.resource_type);
            }
            if r.width > 0 && r.height > 0 {
                eprintln!("Size:       {}x{}, {} bytes", r.width, r.height, r.bytes);
            } else {
                eprintln!("Size:       {} bytes", r.bytes);
            }
            if !r.tags.is_empty() {
                eprintln!("Tags:       {}", r.tags.join(", "));
            }
            eprintln!("\nURL:");
            eprintln!("{}", r.secure_url);
            eprintln!("---");
        }
        CommandResult::Help => {
            print_usage();
        }
    }
}

/// 機械可読JSONを作る
///
/// コマンド結果に `success: true` を加えたもの（`command` タグ付き）。
fn machine_readable(result: &CommandResult) -> Result<Value> {
    let mut json = serde_json::to_value(result)?;
    if let Value::Object(map) = &mut json {
        map.insert("success".to_string(), Value::Bool(true));
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::result::{LoginResult, LogoutResult, StatusResult, UploadResult};

    fn upload_result(transferred: bool) -> CommandResult {
        CommandResult::Upload(UploadResult {
            file: "/tmp/cat.png".to_string(),
            transferred,
            public_id: "cat".to_string(),
            version: 1,
            format: "png".to_string(),
            resource_type: "image".to_string(),
            bytes: 1024,
            width: 640,
            height: 480,
            secure_url: "https://res.cloudinary.com/demo/image/upload/v1/cat.png".to_string(),
            tags: vec![],
            status: transferred.then_some(200),
        })
    }

    #[test]
    fn test_machine_readable_login() {
        let result = CommandResult::Login(LoginResult {
            was_logged_in: false,
            cloud_name: "demo".to_string(),
            api_key: "***".to_string(),
        });

        let json = machine_readable(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["command"], "login");
        assert_eq!(json["cloud_name"], "demo");
    }

    #[test]
    fn test_machine_readable_status() {
        let result = CommandResult::Status(StatusResult {
            is_configured: true,
            source: Some(CredentialSource::Environment),
            cloud_name: Some("demo".to_string()),
            api_key: Some("***".to_string()),
            upload_preset: "ml_default".to_string(),
        });

        let json = machine_readable(&result).unwrap();
        assert_eq!(json["command"], "status");
        assert_eq!(json["source"], "environment");
    }

    #[test]
    fn test_machine_readable_upload() {
        let json = machine_readable(&upload_result(true)).unwrap();
        assert_eq!(json["command"], "upload");
        assert_eq!(json["public_id"], "cat");
        assert_eq!(json["status"], 200);
    }

    #[test]
    fn test_machine_readable_help() {
        let json = machine_readable(&CommandResult::Help).unwrap();
        assert_eq!(json, serde_json::json!({ "command": "help", "success": true }));
    }

    #[test]
    fn test_error_json_shape() {
        let error = anyhow::anyhow!("inner").context("Upload command failed");
        let json = error_json(&error, 3, Some("Check your network connection and try again."));

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Upload command failed");
        assert_eq!(json["causes"], serde_json::json!(["inner"]));
        assert_eq!(json["exit_code"], 3);
        assert!(json["hint"].is_string());
    }

    #[test]
    fn test_output_result_both_modes() {
        let results = [
            CommandResult::Help,
            CommandResult::Logout(LogoutResult { was_logged_in: true }),
            upload_result(true),
            upload_result(false),
        ];
        for result in &results {
            assert!(output_result(result, true).is_ok());
            assert!(output_result(result, false).is_ok());
        }
    }
}
