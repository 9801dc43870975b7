//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{login::LoginArgs, request::RequestArgs};

/// Call an API with automatic session refresh.
#[derive(Parser, Debug)]
#[command(name = "autorefresh")]
#[command(author, version = env!("AUTOREFRESH_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check client credentials against the login endpoint
    Login(LoginArgs),

    /// Send a request, refreshing the session if the main token is rejected
    Request(RequestArgs),
}
