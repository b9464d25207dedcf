//! NSX plugin CLI (nsxctl)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use nsx_config::PluginConfig;
use nsx_plugin::OperationRegistry;
use nsxctl::commands::{Action, LifecycleCommand, TypesCommand, ValidateCommand};

#[derive(Parser)]
#[command(name = "nsxctl")]
#[command(about = "NSX provisioning plugin CLI")]
#[command(version)]
#[command(long_about = "
NSX provisioning plugin CLI

Runs node lifecycle operations against an NSX manager. The node context
file holds the node id, type, properties and runtime properties; it is
updated in place after every operation.

Examples:
  nsxctl types                                   # List node types
  nsxctl validate -n bgp.json                    # Check node properties
  nsxctl create -n bgp.json                      # Create the NSX object
  nsxctl create -n bgp.json -i inputs.yaml       # Override properties
  nsxctl delete -n bgp.json                      # Delete the NSX object
  nsxctl link -n group.json -t vm.json           # Add a group member
")]
struct Cli {
    /// Enable verbose output
    #[arg(short = 'V', long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Plugin configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported node types
    Types,

    /// Validate node properties without contacting NSX
    Validate {
        /// Node context file
        #[arg(short, long)]
        node: PathBuf,

        /// Operation inputs (YAML or JSON)
        #[arg(short, long)]
        inputs: Option<PathBuf>,
    },

    /// Create the NSX object of a node
    Create {
        #[arg(short, long)]
        node: PathBuf,

        #[arg(short, long)]
        inputs: Option<PathBuf>,
    },

    /// Delete the NSX object of a node
    Delete {
        #[arg(short, long)]
        node: PathBuf,

        #[arg(short, long)]
        inputs: Option<PathBuf>,
    },

    /// Establish a relationship towards a target node
    Link {
        #[arg(short, long)]
        node: PathBuf,

        /// Target node context file
        #[arg(short, long)]
        target: PathBuf,

        #[arg(short, long)]
        inputs: Option<PathBuf>,
    },

    /// Remove a relationship towards a target node
    Unlink {
        #[arg(short, long)]
        node: PathBuf,

        #[arg(short, long)]
        target: PathBuf,

        #[arg(short, long)]
        inputs: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<PluginConfig> {
    let config = match path {
        Some(path) => PluginConfig::load_from_file(path),
        None => PluginConfig::load_with_defaults(),
    };
    config.context("Failed to load plugin configuration")
}

async fn run_lifecycle(
    config: Option<&PathBuf>,
    action: Action,
    node: &Path,
    inputs: Option<&Path>,
    target: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    LifecycleCommand::new(config)
        .execute(action, node, inputs, target)
        .await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = cli.config.as_ref();
    let result = match cli.command {
        Commands::Types => TypesCommand::new(OperationRegistry::new()).execute(),

        Commands::Validate { node, inputs } => {
            ValidateCommand::new(OperationRegistry::new()).execute(&node, inputs.as_deref())
        }

        Commands::Create { node, inputs } => {
            run_lifecycle(config, Action::Create, &node, inputs.as_deref(), None).await
        }

        Commands::Delete { node, inputs } => {
            run_lifecycle(config, Action::Delete, &node, inputs.as_deref(), None).await
        }

        Commands::Link {
            node,
            target,
            inputs,
        } => {
            run_lifecycle(
                config,
                Action::Link,
                &node,
                inputs.as_deref(),
                Some(target.as_path()),
            )
            .await
        }

        Commands::Unlink {
            node,
            target,
            inputs,
        } => {
            run_lifecycle(
                config,
                Action::Unlink,
                &node,
                inputs.as_deref(),
                Some(target.as_path()),
            )
            .await
        }
    };

    match result {
        Ok(()) => {
            if !cli.quiet {
                log::info!("Command completed successfully");
            }
            std::process::exit(0);
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);

                if cli.verbose || cli.debug {
                    for cause in e.chain().skip(1) {
                        eprintln!("  Caused by: {}", cause);
                    }
                }
            }
            std::process::exit(1);
        }
    }
}
