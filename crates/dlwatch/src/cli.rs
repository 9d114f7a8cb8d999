//! Clap derive structures for the `dlwatch` CLI.
//!
//! Units, actions and durations are taken as strings here and parsed by
//! the command handlers, so this file depends on nothing but clap and
//! can be compiled by `build.rs` for man page generation.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dlwatch -- download ETA calculator and low-speed auto-exit monitor
#[derive(Debug, Parser)]
#[command(
    name = "dlwatch",
    version,
    about = "Estimate download times and shut down when downloads stall",
    long_about = "Estimate how long a download will take, watch live network throughput,\n\
        and run a power action (shutdown, restart, hibernate, sleep) once the\n\
        download speed has stayed below a threshold for long enough.",
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
    /// Output format
    #[arg(long, short = 'o', env = "DLWATCH_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
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
    /// Estimate download duration and finish time
    #[command(alias = "c")]
    Calc(CalcArgs),

    /// Print live network throughput samples
    #[command(alias = "s")]
    Stats(StatsArgs),

    /// List network adapters and their cumulative counters
    #[command(alias = "a")]
    Adapters,

    /// Run the low-speed auto-exit monitor
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CALC
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CalcArgs {
    /// File size (e.g. 4.7)
    #[arg(allow_negative_numbers = true)]
    pub size: f64,

    /// Link speed (e.g. 100)
    #[arg(allow_negative_numbers = true)]
    pub speed: f64,

    /// Size unit: B, KB, MB, GB, TB (default from config, else GB)
    #[arg(long, short = 's')]
    pub size_unit: Option<String>,

    /// Speed unit: bps, Kbps, Mbps, Gbps, MB/s (default from config, else Mbps)
    #[arg(long, short = 'u')]
    pub speed_unit: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Only count this adapter (default: all adapters)
    #[arg(long, short = 'a')]
    pub adapter: Option<String>,

    /// Number of one-second samples to print
    #[arg(long, short = 'n', default_value = "5")]
    pub count: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Speed threshold; slower downloads count as stalled
    #[arg(long, short = 't')]
    pub threshold: Option<f64>,

    /// Threshold unit: KB/s or MB/s
    #[arg(long)]
    pub threshold_unit: Option<String>,

    /// How long the speed must stay low (seconds, or e.g. "5m", "1h 30m")
    #[arg(long, short = 'd')]
    pub duration: Option<String>,

    /// Power action: shutdown, restart, hibernate, sleep
    #[arg(long)]
    pub action: Option<String>,

    /// Only watch this adapter
    #[arg(long, short = 'a')]
    pub adapter: Option<String>,

    /// Log the power action instead of performing it
    #[arg(long)]
    pub dry_run: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Config key (dot-separated path, e.g., "monitor.threshold")
        key: String,

        /// Value to set (empty string clears optional keys)
        value: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
