//! Config command - inspect the layered configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use serde_json::json;

use checkin_config::env::ENV_VARS;
use checkin_config::{CheckinConfig, LoadedConfig, mask_secret};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration and whether it is complete
    Show,

    /// Show which config sources are consulted and their precedence
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    match args.command {
        ConfigCommand::Show => cmd_show(&loaded, ctx),
        ConfigCommand::Path => cmd_path(&loaded, ctx),
    }
}

fn cmd_show(loaded: &LoadedConfig, ctx: &Context) -> Result<()> {
    let config = masked(&loaded.config);
    let validation = loaded.config.resolve();

    if ctx.json_output {
        let output = json!({
            "config": config,
            "complete": validation.is_ok(),
            "error": validation.as_ref().err().map(|e| e.to_string()),
            "env_overrides": loaded.env_overrides,
            "warnings": loaded.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}\n", style("# Check-in Configuration").bold());

    let loaded_from = loaded.loaded_from();
    if loaded_from.is_empty() {
        println!("No config files loaded\n");
    } else {
        println!("Loaded from:");
        for path in loaded_from {
            println!("  {}", path.display());
        }
        println!();
    }

    if !loaded.env_overrides.is_empty() {
        println!("Environment overrides:");
        for var in &loaded.env_overrides {
            println!("  {}", style(var).cyan());
        }
        println!();
    }

    print_warnings(&loaded.warnings);

    match validation {
        Ok(_) => println!("{} Configuration is complete\n", style("✓").green().bold()),
        Err(e) => println!("{} {}\n", style("✗ Incomplete:").red().bold(), e),
    }

    println!("---\nMerged config:\n");
    println!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_path(loaded: &LoadedConfig, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        let sources: Vec<_> = loaded
            .sources
            .iter()
            .map(|s| json!({ "path": s.path, "loaded": s.loaded }))
            .collect();
        let output = json!({
            "sources": sources,
            "env_vars": env_var_status(loaded),
            "warnings": loaded.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("Config search order (later overrides earlier):\n");
    for source in &loaded.sources {
        let status = if source.loaded {
            style("✓").green().to_string()
        } else {
            dim.apply_to("-").to_string()
        };
        println!("  {} {}", status, source.path.display());
    }
    println!();

    println!("Environment variables (override files):\n");
    for (var, applied) in env_var_status(loaded) {
        let status = if applied {
            style("✓").green().to_string()
        } else {
            dim.apply_to("-").to_string()
        };
        println!("  {} {}", status, var);
    }
    println!();

    print_warnings(&loaded.warnings);
    Ok(())
}

/// Every recognised variable with whether it was applied.
fn env_var_status(loaded: &LoadedConfig) -> Vec<(&'static str, bool)> {
    ENV_VARS
        .iter()
        .map(|var| (*var, loaded.env_overrides.contains(var)))
        .collect()
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("Warnings:");
    for w in warnings {
        println!("  {} {}", style("⚠").yellow(), w);
    }
    println!();
}

/// Copy of `config` safe to print.
fn masked(config: &CheckinConfig) -> CheckinConfig {
    let mut config = config.clone();
    if let Some(secret) = config.oauth.as_mut().and_then(|o| o.client_secret.as_mut()) {
        *secret = mask_secret(secret);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_secret_only() {
        let config = CheckinConfig::from_toml(
            "[oauth]\nclient_id = \"client-1\"\nclient_secret = \"a-long-client-secret\"\n",
        )
        .unwrap();

        let shown = masked(&config);
        let oauth = shown.oauth.as_ref().unwrap();
        assert_eq!(oauth.client_id.as_deref(), Some("client-1"));
        assert_eq!(oauth.client_secret.as_deref(), Some("a-...et"));
        assert!(!shown.to_toml().unwrap().contains("a-long-client-secret"));
    }

    #[test]
    fn test_env_var_status_marks_applied() {
        let loaded = LoadedConfig {
            config: CheckinConfig::new(),
            sources: Vec::new(),
            env_overrides: vec!["QR_CODE_VALUE"],
            warnings: Vec::new(),
        };
        let status = env_var_status(&loaded);
        assert_eq!(status.len(), ENV_VARS.len());
        assert!(status.contains(&("QR_CODE_VALUE", true)));
        assert!(status.contains(&("SIMASTER_CLIENT_ID", false)));
    }

    #[test]
    fn test_masked_without_oauth_section() {
        assert_eq!(masked(&CheckinConfig::new()), CheckinConfig::new());
    }
}
