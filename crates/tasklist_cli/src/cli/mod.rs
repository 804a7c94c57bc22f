use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tasklist_core::config::{ConfigOverrides, canonical_log_level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Buy milk"
    Add { text: Option<String> },
    /// List pending tasks
    ///
    /// Example: tasklist list
    List,
    /// Mark a pending task as completed
    ///
    /// Example: tasklist done 1
    Done { position: usize },
    /// Delete a pending task
    ///
    /// Example: tasklist delete 1
    Delete { position: usize },
    /// Show or manage completed tasks
    ///
    /// Example: tasklist completed
    /// Example: tasklist completed delete 1
    Completed {
        #[command(subcommand)]
        action: Option<CompletedCommand>,
    },
    /// Switch the interactive view
    ///
    /// Example: view completed
    View { target: ViewTarget },
}

#[derive(Subcommand, Debug)]
pub enum CompletedCommand {
    /// List completed tasks
    ///
    /// Example: tasklist completed list
    List,
    /// Delete a completed task
    ///
    /// Example: tasklist completed delete 1
    Delete { position: usize },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTarget {
    Main,
    Completed,
}

/// Converts a 1-based display position into a list index.
pub fn position_to_index(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "positions start at 1".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    StorePath,
    LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    match field.as_str() {
        "store_path" | "store" => {
            if value.is_empty() {
                Err("store_path override cannot be empty".to_string())
            } else {
                Ok(ParsedConfigOverride {
                    target: ConfigOverrideTarget::StorePath,
                    value,
                })
            }
        }
        "log_level" | "log" => {
            let level = canonical_log_level(&value)
                .ok_or_else(|| format!("unknown log level '{value}'"))?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::LogLevel,
                value: level,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds every raw override into a single set, later values winning.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value));
            }
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
