//! FILENAME: app/dashboard/src/main.rs
// PURPOSE: Command-line entry point with unified logging.
// FORMAT: seq|level|category|message

use std::process::ExitCode;

use clap::Parser;
use dashboard_lib::cli::{run, Args};
use dashboard_lib::log_error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_error!("APP", "{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
