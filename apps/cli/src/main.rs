//! # MediRoom CLI Entry Point
//!
//! Parses arguments, sets up logging, and maps failures to exit codes.

use std::process::ExitCode;

use clap::Parser;

use mediroom_cli::{init_tracing, run, ApiError, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ApiError>() {
            Some(api) => {
                if json {
                    // ApiError is plain strings; serializing can't fail
                    let body = serde_json::to_string_pretty(api).unwrap_or_default();
                    eprintln!("{}", body);
                } else {
                    eprintln!("Error: {}", api);
                }
                ExitCode::from(api.exit_code() as u8)
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
