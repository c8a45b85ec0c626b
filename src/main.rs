mod cli;
mod commands;
mod logging;
mod presentation;

use cloudup::api::error::ApiError;
use cloudup::config::error::ConfigError;
use cloudup::domain::error::DomainError;
use cloudup::error_severity::ErrorSeverity;
use presentation::output;
use std::env;

#[tokio::main]
async fn main() {
    logging::init();

    let args: Vec<String> = env::args().collect();
    let machine_output = args.iter().any(|arg| arg == "--machine");
    let args: Vec<String> = args.into_iter().filter(|arg| arg != "--machine").collect();

    if let Err(e) = run(&args, machine_output).await {
        handle_error(e, machine_output);
    }
}

/// アプリケーションのメイン処理
async fn run(args: &[String], machine_output: bool) -> anyhow::Result<()> {
    let result = cli::parse_args(args).await?;
    output::output_result(&result, machine_output)
}

/// エラーハンドリングとユーザーへの表示
///
/// anyhow::Error から元のエラー型を downcast して、
/// エラーの種類に応じた exit code とメッセージを決定する。
fn handle_error(error: anyhow::Error, machine_output: bool) {
    let exit_code = determine_severity(&error)
        .map(ErrorSeverity::exit_code)
        .unwrap_or(1);
    let hint = get_error_hint(&error);

    output::output_error(&error, exit_code, hint.as_deref(), machine_output);

    std::process::exit(exit_code);
}

/// エラーチェーンから深刻度を決定
fn determine_severity(error: &anyhow::Error) -> Option<ErrorSeverity> {
    error.chain().find_map(|cause| {
        if let Some(api_err) = cause.downcast_ref::<ApiError>() {
            return Some(api_err.severity());
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return Some(config_err.severity());
        }
        cause
            .downcast_ref::<DomainError>()
            .map(DomainError::severity)
    })
}

/// エラーに対するユーザー向けヒントを取得
fn get_error_hint(error: &anyhow::Error) -> Option<String> {
    error.chain().find_map(|cause| {
        let hint = if let Some(api_err) = cause.downcast_ref::<ApiError>() {
            api_err.hint()
        } else if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            config_err.hint()
        } else if let Some(domain_err) = cause.downcast_ref::<DomainError>() {
            domain_err.hint()
        } else {
            None
        };
        hint.map(str::to_string)
    })
}
