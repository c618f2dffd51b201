// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use redis_operator::controller::EventKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "redis-operator")]
#[command(about = "Reconciliation controller for a Redis workload on Kubernetes")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON lines
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    /// Print only the final unit status
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (default: discovered in the current directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new redis-operator.yml settings file
    Init {
        /// Application name
        #[arg(short, long)]
        app: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Handle one lifecycle event, replaying deferred events first
    Handle {
        /// Event name, e.g. start, config-changed, update-status
        event: EventKind,

        /// Read workload configuration from a file instead of config-get
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the hook tools (default: PATH)
        #[arg(long)]
        tools_dir: Option<PathBuf>,
    },

    /// Render the pod spec and resources without submitting them
    Render {
        /// Image reference
        #[arg(short, long)]
        image: String,

        /// Application name (default: from settings)
        #[arg(short, long)]
        app: Option<String>,

        /// Expected peer unit, e.g. redis/0 (repeatable)
        #[arg(short, long = "peer")]
        peers: Vec<String>,
    },

    /// Show the persisted controller state
    State,
}
