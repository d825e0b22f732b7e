//! Clap derive structures for the `playvault` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// playvault -- talk to a PlayVault game backend from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "playvault",
    version,
    about = "Query and manage PlayVault game backend data from the command line",
    long_about = "A CLI over the PlayVault client SDK.\n\n\
        Signs in as a player, reads news, leaderboards and remote config,\n\
        and manages cloud save slots using the same retry and host\n\
        selection rules as the game client.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "PLAYVAULT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile hosts, skips probing)
    #[arg(long, short = 'H', env = "PLAYVAULT_HOST", global = true)]
    pub host: Option<String>,

    /// Game API key
    #[arg(long, env = "PLAYVAULT_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Session token (overrides the one stored by `auth`)
    #[arg(long, env = "PLAYVAULT_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PLAYVAULT_OUTPUT",
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

    /// Request timeout in seconds
    #[arg(long, env = "PLAYVAULT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Plain text, one value per line (scripting)
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
    /// Show the selected host and the services that came up
    Status,

    /// Sign in or out
    Auth(AuthArgs),

    /// Latest news posts
    News,

    /// Leaderboards
    #[command(alias = "lb")]
    Leaderboard(LeaderboardArgs),

    /// Read remote config values
    #[command(alias = "rc")]
    RemoteConfig(RemoteConfigArgs),

    /// Manage cloud save slots
    Save(SaveArgs),

    /// Redeem a gift code
    Redeem {
        /// The code as printed on the card or mail
        code: String,
    },

    /// Send feedback to the game team
    Feedback(FeedbackArgs),

    /// Send a remote log entry
    Log(LogArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in anonymously
    Guest {
        /// Device identifier (a random one is generated if omitted)
        #[arg(long)]
        device_id: Option<String>,
    },

    /// Sign in with email and password (prompts for the password)
    Login {
        email: String,
    },

    /// Create an account and sign in
    Register {
        email: String,

        #[arg(long)]
        display_name: String,
    },

    /// End the session and forget the stored token
    Logout,
}

// ── Leaderboard ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LeaderboardArgs {
    #[command(subcommand)]
    pub command: LeaderboardCommand,
}

#[derive(Debug, Subcommand)]
pub enum LeaderboardCommand {
    /// Top entries of a board
    Top {
        board: String,

        /// Number of entries (1-100)
        #[arg(long, short = 'l', default_value = "10")]
        limit: u32,
    },

    /// Submit a score (requires sign-in)
    Submit {
        board: String,

        #[arg(allow_negative_numbers = true)]
        score: i64,
    },

    /// Your rank on a board (requires sign-in)
    Rank {
        board: String,
    },
}

// ── Remote config ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RemoteConfigArgs {
    /// Print only this key
    pub key: Option<String>,
}

// ── Cloud saves ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SaveArgs {
    #[command(subcommand)]
    pub command: SaveCommand,
}

#[derive(Debug, Subcommand)]
pub enum SaveCommand {
    /// List save slots
    #[command(alias = "ls")]
    List,

    /// Upload a file into a slot
    Put {
        slot: String,

        /// File to upload
        file: PathBuf,
    },

    /// Download a slot
    Get {
        slot: String,

        /// Write to this file instead of stdout
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,
    },

    /// Delete a slot
    #[command(alias = "rm")]
    Delete {
        slot: String,
    },
}

// ── Feedback & logs ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    /// bug, suggestion, payment or other
    #[arg(long, short = 'c', default_value = "other")]
    pub category: String,

    pub message: String,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// debug, info, warning or error
    #[arg(long, short = 'l', default_value = "info")]
    pub level: String,

    pub message: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the current configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Add or replace a profile
    AddProfile {
        name: String,

        /// Candidate base URL (repeat for fallbacks, probed in order)
        #[arg(long = "url", required = true)]
        hosts: Vec<String>,

        /// Environment variable that holds the API key
        #[arg(long)]
        api_key_env: Option<String>,

        /// Use the first host without health probing
        #[arg(long)]
        fixed_host: bool,
    },

    /// Set the default profile
    Use {
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
