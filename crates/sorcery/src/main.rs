//! Sorcery CLI - image tools with runtime-tunable configuration.
//!
//! Every image command takes its default arguments (blur strength, drawing
//! colour, interpolation, ...) from the configuration file, which can be
//! inspected and changed with `sorcery config`.
//!
//! # Usage
//!
//! ```bash
//! # Show the whole configuration
//! sorcery config get
//!
//! # Change a value for good
//! sorcery config set blur.strength 21 --persist
//!
//! # Override a value for a single run
//! sorcery --set blur.strength=31 blur photo.png --area 10,10,200,120
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Sorcery - image tools with runtime-tunable configuration.
#[derive(Parser, Debug)]
#[command(name = "sorcery")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file to use
    #[arg(long, global = true, env = "SORCERY_CONFIG")]
    config: Option<String>,

    /// Runtime override for this invocation (repeatable)
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// View and manage configuration
    Config(cli::config::ConfigArgs),

    #[command(flatten)]
    Image(cli::image::ImageCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    tracing::debug!("Sorcery v{}", sorcery_core::VERSION);

    let context = cli::Context::new(cli.config.as_deref(), cli.overrides);
    match cli.command {
        Commands::Config(args) => cli::config::execute(args, &context).await,
        Commands::Image(command) => cli::image::execute(command, &context).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "sorcery",
            "--set",
            "blur.strength=21",
            "--set",
            "drawing.thickness=2",
            "config",
            "get",
        ])
        .unwrap();
        assert_eq!(cli.overrides, ["blur.strength=21", "drawing.thickness=2"]);
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn test_image_command_parses() {
        let cli =
            Cli::try_parse_from(["sorcery", "blur", "in.png", "--area", "0,0,10,10"]).unwrap();
        assert!(matches!(cli.command, Commands::Image(_)));
    }
}
