//! Run command - log in, then check in from a random point in the geofence.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};

use checkin_client::{CheckinClient, CheckinError, CheckinOutcome};

use super::login::authenticate;
use super::{Context, Credentials, geofence, print_error};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Portal username (prompted for when omitted)
    #[arg(short, long)]
    pub username: Option<String>,
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    // Validate everything before asking for a password.
    let resolved = loaded.config.resolve()?;

    let credentials = Credentials::prompt(args.username.or(resolved.username.clone()))?;
    let tokens = authenticate(ctx, &resolved.oauth, resolved.timeout, &credentials).await?;

    if !ctx.json_output {
        println!("{} Login successful!", style("✓").green().bold());
    }

    let mut builder = CheckinClient::builder().timeout(resolved.timeout);
    if let Some(ref base_url) = resolved.checkin_base_url {
        builder = builder.base_url(base_url);
    }
    let client = builder.build()?;

    let fence = geofence(&resolved.location);
    let outcome = client
        .submit(
            &credentials.username,
            &tokens.access_token,
            resolved.qr_code,
            &fence,
        )
        .await;

    print_outcome(ctx, &outcome)?;

    if let Err(e) = outcome.into_result() {
        if let Some(hint) = rejection_hint(&e) {
            tracing::warn!(status = ?e.http_status(), "{}", hint);
            if !ctx.json_output {
                eprintln!("{}", Style::new().yellow().apply_to(hint));
            }
        }
        bail!("check-in was not accepted: {}", e);
    }
    Ok(())
}

/// Next step to suggest after a failed check-in.
fn rejection_hint(err: &CheckinError) -> Option<&'static str> {
    if err.is_auth_error() {
        Some("The checkpoint API rejected the access token; log in again and retry.")
    } else if err.is_server_error() {
        Some("The checkpoint API failed on its side; try again later.")
    } else {
        None
    }
}

fn print_outcome(ctx: &Context, outcome: &CheckinOutcome) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    let point = outcome.point();
    let dim = Style::new().dim();
    println!();
    println!(
        "Generated random point for attendance: (Lat: {}, Long: {})",
        style(checkin_client::GeoPoint::format_coordinate(point.latitude)).cyan(),
        style(checkin_client::GeoPoint::format_coordinate(point.longitude)).cyan()
    );
    println!();

    match outcome {
        CheckinOutcome::Accepted { body, .. } => {
            println!("{} Check-in successful!", style("SUCCESS:").green().bold());
            println!("{}", dim.apply_to(body));
        }
        CheckinOutcome::Rejected { status, body, .. } => {
            println!("{} Status Code {}", style("FAILED:").red().bold(), status);
            println!("{}", body);
        }
        CheckinOutcome::TransportError { message, .. } => {
            print_error(ctx, &format!("Request error: {}", message));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_hint() {
        let rejected = |status| CheckinError::Rejected {
            status,
            body: String::new(),
        };
        assert!(rejection_hint(&rejected(401)).unwrap().contains("access token"));
        assert!(rejection_hint(&rejected(503)).unwrap().contains("try again later"));
        assert_eq!(rejection_hint(&rejected(422)), None);
        assert_eq!(
            rejection_hint(&CheckinError::Transport("refused".to_string())),
            None
        );
    }
}
