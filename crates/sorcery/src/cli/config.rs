//! The `sorcery config` command for configuration management.

use clap::{Args, Subcommand};
use sorcery_core::config::generate_documentation;
use sorcery_core::overrides::parse_value;
use sorcery_core::{ActionStatus, ConfigRequest, ConfigTool, TelemetryGate, TomlStore};

use super::{print_json, Context};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the whole configuration, or one value by dot-path
    Get {
        /// Dot-path such as `detection.confidence_threshold`
        key: Option<String>,
    },

    /// Change a value for this invocation, or write it to the file
    Set {
        key: String,

        /// TOML literal (`21`, `0.8`, `true`, `[0,0,255]`); anything else is a string
        value: String,

        /// Persist to the configuration file
        #[arg(long)]
        persist: bool,
    },

    /// Drop runtime overrides and show the persisted configuration
    Reset,

    /// List every configuration key with its description
    Keys {
        /// Print type and constraints for each key as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs, context: &Context) -> anyhow::Result<()> {
    let request = match args.command {
        ConfigCommand::Get { key } => ConfigRequest::get(key.as_deref()),
        ConfigCommand::Set {
            key,
            value,
            persist,
        } => ConfigRequest::set(&key, parse_value(&value), persist),
        ConfigCommand::Reset => ConfigRequest::reset(),

        ConfigCommand::Keys { json } => {
            if json {
                let manager = context.manager()?;
                let info: serde_json::Map<String, serde_json::Value> = manager
                    .with(|m| m.schema_info())
                    .into_iter()
                    .map(|(key, info)| serde_json::to_value(info).map(|value| (key, value)))
                    .collect::<serde_json::Result<_>>()?;
                print_json(&serde_json::Value::Object(info))?;
            } else {
                println!("{}", generate_documentation());
            }
            return Ok(());
        }

        ConfigCommand::Path => {
            println!("{}", context.config_path().display());
            return Ok(());
        }

        ConfigCommand::Init { force } => {
            let path = context.config_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            TomlStore::new(path).write_defaults()?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
            return Ok(());
        }
    };

    let manager = context.manager()?;
    let telemetry = TelemetryGate::from_config(&manager.config(), context.config_path().parent());
    let action = request.action;
    let result = ConfigTool::new(manager).run(request);
    print_json(&result)?;

    if let Some(error) = result.get("error").and_then(|e| e.as_str()) {
        telemetry.record("tool_call", &format!("config_{action}"), ActionStatus::Failed);
        anyhow::bail!("{error}");
    }
    telemetry.record("tool_call", &format!("config_{action}"), ActionStatus::Success);
    Ok(())
}
