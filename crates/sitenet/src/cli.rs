//! Clap derive structures for the `sitenet` CLI.
//!
//! Defines the complete command tree, global flags, and shared types. Only
//! depends on clap so `build.rs` can include it to render man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sitenet -- device inventory and topology for site networks
#[derive(Debug, Parser)]
#[command(
    name = "sitenet",
    version,
    about = "Reconcile gateway snapshots and lay out site network topology",
    long_about = "Keeps one canonical record per physical device on a site.\n\n\
        Gateway discovery snapshots are merged into a JSON state file, devices\n\
        that stop reporting are marked offline, and saved topology layouts are\n\
        laid out as a tree rooted at the backbone switch.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Project code (0-255); falls back to `default_project` from config
    #[arg(long, short = 'p', env = "SITENET_PROJECT", global = true)]
    pub project: Option<u8>,

    /// State file holding projects, devices and placements
    #[arg(long, short = 's', env = "SITENET_STATE", global = true)]
    pub state: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "SITENET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format; falls back to `defaults.output` from config
    #[arg(long, short = 'o', env = "SITENET_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output; falls back to `defaults.color` from config
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply a gateway discovery snapshot to the state file
    Sync(SyncArgs),

    /// Inspect and edit the device inventory
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage projects known to the state file
    #[command(alias = "proj")]
    Projects(ProjectsArgs),

    /// Lay out a saved topology as a tree
    #[command(alias = "topo")]
    Topology(TopologyArgs),

    /// Run a single field normalizer
    Normalize(NormalizeArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sync ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Snapshot JSON file as posted by a gateway
    pub snapshot: PathBuf,

    /// Override the per-snapshot deadline, in seconds
    #[arg(long)]
    pub deadline: Option<u64>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices in the project
    #[command(alias = "ls")]
    List {
        /// Only devices of this type (camera, nvr, bridge, switch, ...)
        #[arg(long = "type", short = 't')]
        device_type: Option<String>,

        /// Only devices with this status (online, offline, warning, unknown)
        #[arg(long)]
        status: Option<String>,

        /// Include hidden devices
        #[arg(long, short = 'a', conflicts_with = "hidden")]
        all: bool,

        /// Only hidden devices
        #[arg(long)]
        hidden: bool,
    },

    /// Show one device
    Get {
        /// Device ID or MAC address
        device: String,
    },

    /// Register a device by hand (merges into an existing record when one matches)
    Add {
        /// Device type
        #[arg(long = "type", short = 't')]
        device_type: String,

        /// Display name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Hardware model
        #[arg(long)]
        model: Option<String>,

        /// MAC address, any common notation
        #[arg(long)]
        mac: Option<String>,

        /// IPv4 address
        #[arg(long)]
        ip: Option<String>,
    },

    /// Rename, retype or re-address a device
    Edit {
        /// Device ID or MAC address
        device: String,

        #[arg(long, short = 'n')]
        name: Option<String>,

        #[arg(long = "type", short = 't')]
        device_type: Option<String>,

        #[arg(long)]
        mac: Option<String>,

        #[arg(long)]
        ip: Option<String>,
    },

    /// Hide a device from sweeps and placement listings
    Hide {
        /// Device ID or MAC address
        device: String,
    },

    /// Make a hidden device visible again
    Show {
        /// Device ID or MAC address
        device: String,
    },

    /// Delete devices (refused if any is placed in a layout)
    #[command(alias = "rm")]
    Remove {
        /// Device IDs or MAC addresses
        #[arg(required = true)]
        devices: Vec<String>,
    },

    /// List visible devices not yet placed in a layout
    Available,

    /// Mark a device as placed in a layout
    Place {
        /// Device ID or MAC address
        device: String,
    },

    /// Remove a device's placement
    Unplace {
        /// Device ID or MAC address
        device: String,
    },
}

// ── Projects ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List projects
    #[command(alias = "ls")]
    List,

    /// Add a project
    Add {
        /// Numeric code gateways use to address the project
        #[arg(long)]
        code: u8,

        /// Display name
        #[arg(long, short = 'n')]
        name: String,

        /// Lifecycle status (active, suspended, archived)
        #[arg(long, default_value = "active")]
        status: String,
    },

    /// Change a project's lifecycle status
    SetStatus {
        /// Project code
        code: u8,

        /// New status (active, suspended, archived)
        status: String,
    },
}

// ── Topology ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TopologyArgs {
    /// Saved layout JSON file (elements + connections)
    pub layout: PathBuf,

    /// Name fragment identifying backbone switches
    #[arg(long)]
    pub root_marker: Option<String>,
}

// ── Normalize ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Which field normalizer to run
    pub field: NormalizeField,

    /// Raw value
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormalizeField {
    Mac,
    Ip,
    Type,
    Timestamp,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
