//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use autorefresh::Method;

use crate::output;

use super::{ConnectionArgs, TokenArgs};

#[derive(Args, Debug)]
pub struct RequestArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub tokens: TokenArgs,

    /// HTTP method (GET, POST, PUT, PATCH, DELETE, ...)
    pub method: String,

    /// Path relative to the base URL
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Pretty-print the response body
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: RequestArgs) -> Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{}'", args.method))?;
    let body = args
        .body
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("Request body is not valid JSON")?;

    let client = args.connection.client()?;
    if args.tokens.seed(&client).await {
        debug!("Using tokens from the command line");
    } else {
        args.connection.login(&client).await?;
    }

    let value = match client
        .request::<serde_json::Value>(method, &args.path, body)
        .await
    {
        Ok(value) => value,
        // Left unwrapped so main can tell a redirect from other failures
        Err(err) if err.is_redirect() => return Err(err.into()),
        Err(err) => return Err(err).context("Request failed"),
    };

    output::body(&value, args.pretty)
}
