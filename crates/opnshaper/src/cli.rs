//! Clap derive structures for the `opnshaper` CLI.
//!
//! Defines the command tree, global flags and shared argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// opnshaper -- manage OPNsense traffic shaper pipes, queues and rules
#[derive(Debug, Parser)]
#[command(
    name = "opnshaper",
    version,
    about = "Manage the OPNsense traffic shaper from the command line",
    long_about = "Create, inspect, update and delete traffic shaper pipes, queues and\n\
        rules on an OPNsense firewall through its REST API.\n\n\
        Every mutation is staged and then applied with one service\n\
        reconfigure, unless --no-reconfigure is given.",
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
    /// Firewall profile to use
    #[arg(long, short = 'p', env = "OPNSHAPER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Firewall URL (overrides profile)
    #[arg(long, short = 'u', env = "OPNSHAPER_URL", global = true)]
    pub url: Option<String>,

    /// API key
    #[arg(long, env = "OPNSHAPER_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// API secret
    #[arg(long, env = "OPNSHAPER_API_SECRET", global = true, hide_env = true)]
    pub api_secret: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "OPNSHAPER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "OPNSHAPER_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "OPNSHAPER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Stage changes without applying them; run `opnshaper reconfigure` afterwards
    #[arg(long, global = true)]
    pub no_reconfigure: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
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
    /// Manage pipes (bandwidth-limited channels)
    #[command(alias = "pipe")]
    Pipes(EntityArgs),

    /// Manage queues (weighted sub-channels of a pipe)
    #[command(alias = "queue")]
    Queues(EntityArgs),

    /// Manage rules (traffic classifiers)
    #[command(alias = "rule")]
    Rules(EntityArgs),

    /// List interfaces that rules may refer to
    #[command(alias = "ifaces")]
    Interfaces,

    /// Apply all staged shaper changes
    Reconfigure,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shaper entities ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub command: EntityCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntityCommand {
    /// List all entries
    #[command(alias = "ls")]
    List,

    /// Show one entry as the firewall stores it
    Get {
        /// Entry UUID
        id: String,
    },

    /// Create an entry from a JSON, YAML or TOML document
    Create {
        /// Document path (`-` reads JSON from stdin)
        #[arg(long, short = 'F', value_name = "FILE")]
        from_file: PathBuf,
    },

    /// Replace an entry with a JSON, YAML or TOML document
    Update {
        /// Entry UUID
        id: String,

        /// Document path (`-` reads JSON from stdin)
        #[arg(long, short = 'F', value_name = "FILE")]
        from_file: PathBuf,
    },

    /// Delete an entry (succeeds if it is already gone)
    #[command(alias = "rm")]
    Delete {
        /// Entry UUID
        id: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display the current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Key: url, api_key, api_key_env, api_secret_env, ca_cert, insecure, timeout
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the API key and secret in the system keyring
    SetSecret {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
