//! Login command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;

use super::ConnectionArgs;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print the issued tokens
    #[arg(long)]
    pub show_tokens: bool,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let client = args.connection.client()?;
    args.connection.login(&client).await?;

    output::success("Logged in successfully");
    output::field("Server", client.base_url().as_str());

    if args.show_tokens {
        let session = client.session().snapshot().await;
        output::field("Main token", session.main_token().as_str());
        output::field("Refresh token", session.refresh_token().as_str());
    }

    Ok(())
}
