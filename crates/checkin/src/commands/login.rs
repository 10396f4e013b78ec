//! Login command - run the SSO and OAuth flow only.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde_json::json;

use checkin_config::{ResolvedOAuth, mask_secret};
use checkin_oauth::{OAuthError, OAuthFlowClient, OAuthTokens};

use super::{Context, Credentials, oauth_config, print_error};

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Portal username (prompted for when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Print the full access token instead of a masked one
    #[arg(long)]
    pub show_token: bool,
}

/// Run the login command.
pub async fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let oauth = loaded.config.resolve_oauth()?;
    let timeout = loaded.config.timeout()?;

    let username = args
        .username
        .or_else(|| loaded.config.checkin.and_then(|c| c.username));
    let credentials = Credentials::prompt(username)?;

    let tokens = authenticate(ctx, &oauth, timeout, &credentials).await?;

    let token = if args.show_token {
        tokens.access_token.clone()
    } else {
        mask_secret(&tokens.access_token)
    };

    if ctx.json_output {
        let output = json!({
            "status": "ok",
            "username": credentials.username,
            "token_type": tokens.token_type,
            "expires_in": tokens.expires_in,
            "scope": tokens.scope,
            "access_token": token,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{} Login successful!", style("✓").green().bold());
    println!("  {} {}", dim.apply_to("User:        "), credentials.username);
    if let Some(ref token_type) = tokens.token_type {
        println!("  {} {}", dim.apply_to("Token type:  "), token_type);
    }
    if let Some(expires_in) = tokens.expires_in {
        println!("  {} {}s", dim.apply_to("Expires in:  "), expires_in);
    }
    println!("  {} {}", dim.apply_to("Access token:"), style(token).cyan());

    Ok(())
}

/// Run the full flow for `credentials`, reporting a failure before returning it.
pub async fn authenticate(
    ctx: &Context,
    oauth: &ResolvedOAuth,
    timeout: Duration,
    credentials: &Credentials,
) -> Result<OAuthTokens> {
    let mut client = OAuthFlowClient::new(oauth_config(oauth, timeout))?;

    if !ctx.json_output {
        println!("Logging in as {}...", style(&credentials.username).cyan());
    }

    match client
        .complete_flow(&credentials.username, &credentials.password)
        .await
    {
        Ok(tokens) => Ok(tokens),
        Err(e) => {
            report_login_failure(ctx, &e)?;
            Err(e.into())
        }
    }
}

fn report_login_failure(ctx: &Context, err: &OAuthError) -> Result<()> {
    if ctx.json_output {
        let output = json!({
            "status": "error",
            "step": err.failed_step().map(|s| s.as_str()),
            "http_status": err.http_status(),
            "transport": err.is_transport(),
            "message": err.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_error(ctx, "Login failed");
    }
    Ok(())
}
