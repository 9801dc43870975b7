//! autorefresh - call an API through the autorefresh client from the shell.
//!
//! Exit status is 0 on success, 3 when the session is gone and a new login
//! is required, and 1 for any other failure.

mod cli;
mod commands;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Commands};
use commands::{login, request};

/// Exit status when recovery ended in a redirect to login.
const EXIT_LOGIN_REQUIRED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    let result = match cli.command {
        Commands::Login(args) => login::run(args).await,
        Commands::Request(args) => request::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn report(err: &anyhow::Error) -> ExitCode {
    output::error(&format!("{err:#}"));

    let redirected = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<autorefresh::Error>())
        .any(autorefresh::Error::is_redirect);
    if redirected {
        output::error("The session could not be refreshed; log in again");
        return ExitCode::from(EXIT_LOGIN_REQUIRED);
    }

    ExitCode::FAILURE
}
