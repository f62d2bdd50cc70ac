//! Config command - inspect and edit the rcpt configuration file.
//!
//! Every subcommand works on the file named by the global `--config` flag,
//! falling back to the per-user default location.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use rcpt_core::RcptConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default keyword rules
    Init {
        /// Destination (default: the active config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value, addressed by a dotted key such as "remote.model"
    Get { key: String },

    /// Change one value; the result is validated before it is written
    Set { key: String, value: String },

    /// Print the active configuration file path
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let file = config_file(config_path);

    match args.command {
        ConfigCommand::Show => {
            if !file.exists() {
                eprintln!("{} {} not found, showing defaults", style("ℹ").blue(), file.display());
            }
            println!("{}", serde_json::to_string_pretty(&load_config(config_path)?)?);
        }
        ConfigCommand::Init { output, force } => {
            init_config(&output.unwrap_or(file), force)?;
        }
        ConfigCommand::Get { key } => {
            let tree = serde_json::to_value(load_config(config_path)?)?;
            let value = lookup(&tree, &key)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => {
            let parsed = set_config(&file, &key, &value)?;
            println!("{} {} = {} ({})", style("✓").green(), key, parsed, file.display());
        }
        ConfigCommand::Path => {
            let status = if file.exists() {
                style("exists").green()
            } else {
                style("not created, run 'rcpt config init'").yellow()
            };
            println!("{} [{}]", file.display(), status);
        }
    }

    Ok(())
}

/// Per-user config location, e.g. `~/.config/rcpt/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("config.json")
}

/// File the config commands read and write.
fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the explicit config file, else the default one if present, else defaults.
///
/// An explicit path must exist; the default one is optional.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RcptConfig> {
    let file = config_file(config_path);

    if config_path.is_none() && !file.exists() {
        return Ok(RcptConfig::default());
    }

    debug!("Loading config from {}", file.display());
    Ok(RcptConfig::from_file(&file)?)
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists. Use --force to overwrite.", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    RcptConfig::default().save(path)?;
    println!("{} Wrote default configuration to {}", style("✓").green(), path.display());

    Ok(())
}

/// Apply `key = value` to the file at `path`, creating it from defaults when missing.
fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<Value> {
    let current = if path.exists() {
        RcptConfig::from_file(path)?
    } else {
        RcptConfig::default()
    };

    // Bare words such as `llama3` are taken as strings.
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut tree = serde_json::to_value(&current)?;
    assign(&mut tree, key, parsed.clone())?;

    let updated: RcptConfig = serde_json::from_value(tree)?;
    updated.validate()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    updated.save(path)?;

    Ok(parsed)
}

fn lookup<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(tree, |node, part| node.get(part))
}

/// Replace an existing leaf; unknown keys are rejected rather than added.
fn assign(tree: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let slot = key
        .split('.')
        .try_fold(tree, |node, part| node.get_mut(part))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    *slot = value;
    Ok(())
}
