//! Bootstrapper entry point
//!
//! Parses the command line, runs the update-and-launch sequence and exits
//! with the launched application's exit code. Initialization failures are
//! shown with a suggestion and exit with code 1.

use bootstrapper::cli;
use bootstrapper::core::error::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
