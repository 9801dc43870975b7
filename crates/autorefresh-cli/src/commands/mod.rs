//! Subcommand implementations.

pub mod login;
pub mod request;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use autorefresh::{AuthClient, BaseUrl, MainToken, RefreshPolicy, RefreshToken};

/// Server and credential options shared by every subcommand.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Server base URL; endpoint paths resolve relative to it
    #[arg(long, env = "AUTOREFRESH_BASE_URL")]
    pub base_url: String,

    /// Client identifier sent to the login endpoint
    #[arg(long, env = "AUTOREFRESH_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret sent to the login endpoint
    #[arg(long, env = "AUTOREFRESH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Path of the login endpoint
    #[arg(long, default_value = autorefresh::client::LOGIN_PATH)]
    pub login_path: String,

    /// Path of the refresh endpoint
    #[arg(long, default_value = autorefresh::client::REFRESH_PATH)]
    pub refresh_path: String,

    /// Scheme placed before the main token in the authorization header (e.g. Bearer)
    #[arg(long)]
    pub auth_scheme: Option<String>,

    /// Share one refresh between concurrent 401 responses
    #[arg(long)]
    pub single_flight: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ConnectionArgs {
    /// Build a client from these options.
    pub fn client(&self) -> Result<AuthClient> {
        let base = BaseUrl::new(&self.base_url).context("Invalid base URL")?;

        let mut builder = AuthClient::builder(base)
            .login_path(&self.login_path)
            .refresh_path(&self.refresh_path)
            .user_agent(concat!("autorefresh-cli/", env!("AUTOREFRESH_VERSION")));
        if let Some(ref scheme) = self.auth_scheme {
            builder = builder.auth_scheme(scheme);
        }
        if self.single_flight {
            builder = builder.refresh_policy(RefreshPolicy::SingleFlight);
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build().context("Failed to create client")
    }

    /// Log in with the configured client credentials.
    pub async fn login(&self, client: &AuthClient) -> Result<()> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            bail!("Both --client-id and --client-secret are required to log in");
        };

        eprintln!("{}", "Logging in...".dimmed());
        client
            .login(client_id, client_secret)
            .await
            .context("Failed to login")
    }
}

/// Tokens supplied on the command line instead of logging in.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Start from this main token instead of logging in
    #[arg(long)]
    pub main_token: Option<String>,

    /// Start from this refresh token instead of logging in
    #[arg(long)]
    pub refresh_token: Option<String>,
}

impl TokenArgs {
    /// Seed the client's session. Returns false when no tokens were given.
    pub async fn seed(&self, client: &AuthClient) -> bool {
        if self.main_token.is_none() && self.refresh_token.is_none() {
            return false;
        }

        client
            .session()
            .update(
                MainToken::new(self.main_token.clone().unwrap_or_default()),
                RefreshToken::new(self.refresh_token.clone().unwrap_or_default()),
            )
            .await;
        true
    }
}
