//! Clap derive structures for the `netops` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netops -- network operations console for telecom sites
#[derive(Debug, Parser)]
#[command(
    name = "netops",
    version,
    about = "Track breakdowns, energy and alerts across telecom sites",
    long_about = "An operations console for telecom network sites.\n\n\
        Reports and walks breakdowns through their lifecycle, records energy\n\
        consumption, watches critical alerts and exports reports, all against\n\
        a PostgREST-compatible backend.",
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
    #[arg(long, short = 'p', env = "NETOPS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, env = "NETOPS_URL", global = true)]
    pub url: Option<String>,

    /// Backend API key (overrides profile)
    #[arg(long, env = "NETOPS_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// User access token sent as the bearer credential
    #[arg(long, env = "NETOPS_ACCESS_TOKEN", global = true, hide_env = true)]
    pub access_token: Option<String>,

    /// Profile id of the operator issuing role-gated commands
    #[arg(long, env = "NETOPS_ACTING_USER", global = true)]
    pub acting_user: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETOPS_OUTPUT",
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
    #[arg(long, short = 'k', env = "NETOPS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NETOPS_TIMEOUT", global = true)]
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
    /// Overview cards: sites, equipment, alerts, breakdowns, energy
    #[command(alias = "dash")]
    Dashboard,

    /// Report and manage breakdowns (incidents)
    #[command(alias = "bd")]
    Breakdowns(BreakdownsArgs),

    /// Record and analyse energy consumption
    #[command(alias = "en")]
    Energy(EnergyArgs),

    /// View sites
    Sites(SitesArgs),

    /// View equipment
    #[command(alias = "eq")]
    Equipment(EquipmentArgs),

    /// View and watch alerts
    Alerts(AlertsArgs),

    /// Manage user profiles (admin / manager)
    Users(UsersArgs),

    /// View or edit your own profile (the acting user)
    #[command(alias = "me")]
    Profile(ProfileArgs),

    /// Network-wide reports and exports
    Reports(ReportsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Breakdowns ───────────────────────────────────────────────────────

pub const BREAKDOWN_STATUSES: [&str; 5] =
    ["open", "investigating", "in_progress", "resolved", "closed"];
pub const BREAKDOWN_TYPES: [&str; 6] = [
    "power_outage",
    "equipment_failure",
    "network_issue",
    "connectivity_loss",
    "software_malfunction",
    "hardware_defect",
];
pub const SEVERITIES: [&str; 3] = ["minor", "major", "critical"];
pub const PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

#[derive(Debug, Args)]
pub struct BreakdownsArgs {
    #[command(subcommand)]
    pub command: BreakdownsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BreakdownsCommand {
    /// List breakdowns, newest first
    #[command(alias = "ls")]
    List {
        /// Only this status
        #[arg(long, value_parser = BREAKDOWN_STATUSES)]
        status: Option<String>,

        /// Only this severity
        #[arg(long, value_parser = SEVERITIES)]
        severity: Option<String>,

        /// Only this site id
        #[arg(long)]
        site: Option<String>,

        /// Only open, investigating or in-progress breakdowns
        #[arg(long, conflicts_with = "status")]
        active: bool,

        /// Max rows
        #[arg(long, short = 'l')]
        limit: Option<u32>,
    },

    /// Show one breakdown
    Get {
        /// Breakdown id
        id: String,
    },

    /// Report a new breakdown
    Report(BreakdownReportArgs),

    /// Acknowledge: open -> investigating
    Ack {
        /// Breakdown id
        id: String,
    },

    /// Start work: investigating -> in_progress
    Start {
        /// Breakdown id
        id: String,
    },

    /// Resolve: investigating / in_progress -> resolved
    Resolve {
        /// Breakdown id
        id: String,
    },

    /// Close: resolved -> closed
    Close {
        /// Breakdown id
        id: String,
    },

    /// Move a breakdown to any allowed next status
    Transition {
        /// Breakdown id
        id: String,

        /// Target status
        #[arg(long, value_parser = BREAKDOWN_STATUSES)]
        to: String,
    },

    /// Edit breakdown fields (status changes may skip forward)
    Edit(BreakdownEditArgs),

    /// Delete a breakdown
    #[command(alias = "rm")]
    Delete {
        /// Breakdown id
        id: String,
    },

    /// Status counts, critical share and average resolution time
    Stats,
}

#[derive(Debug, Args)]
pub struct BreakdownReportArgs {
    /// Short title
    #[arg(long)]
    pub title: String,

    /// Breakdown type
    #[arg(long = "type", value_parser = BREAKDOWN_TYPES)]
    pub breakdown_type: String,

    /// Severity
    #[arg(long, value_parser = SEVERITIES)]
    pub severity: String,

    /// Site id
    #[arg(long)]
    pub site: String,

    /// Equipment id (must be installed at the site)
    #[arg(long)]
    pub equipment: Option<String>,

    /// Priority (default: medium)
    #[arg(long, value_parser = PRIORITIES)]
    pub priority: Option<String>,

    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,

    /// Number of affected users
    #[arg(long)]
    pub impact_users: Option<u32>,

    /// Estimated fix time in hours (e.g. 4 or 2.5)
    #[arg(long)]
    pub estimated_fix: Option<f64>,

    /// Assignee profile id
    #[arg(long)]
    pub assign: Option<String>,
}

#[derive(Debug, Args)]
pub struct BreakdownEditArgs {
    /// Breakdown id
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long = "type", value_parser = BREAKDOWN_TYPES)]
    pub breakdown_type: Option<String>,

    #[arg(long, value_parser = SEVERITIES)]
    pub severity: Option<String>,

    #[arg(long, value_parser = PRIORITIES)]
    pub priority: Option<String>,

    /// New status; intermediate lifecycle steps are stamped too
    #[arg(long, value_parser = BREAKDOWN_STATUSES)]
    pub status: Option<String>,

    /// Move to another site (clears equipment unless --equipment is given)
    #[arg(long)]
    pub site: Option<String>,

    #[arg(long, conflicts_with = "clear_equipment")]
    pub equipment: Option<String>,

    /// Detach the equipment
    #[arg(long)]
    pub clear_equipment: bool,

    #[arg(long, conflicts_with = "unassign")]
    pub assign: Option<String>,

    /// Remove the assignee
    #[arg(long)]
    pub unassign: bool,

    #[arg(long)]
    pub impact_users: Option<u32>,

    /// Estimated fix time in hours
    #[arg(long)]
    pub estimated_fix: Option<f64>,

    /// Downtime end (RFC 3339 or YYYY-MM-DD HH:MM)
    #[arg(long)]
    pub downtime_end: Option<String>,

    #[arg(long)]
    pub root_cause: Option<String>,

    #[arg(long)]
    pub resolution_notes: Option<String>,
}

// ── Energy ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EnergyArgs {
    #[command(subcommand)]
    pub command: EnergyCommand,
}

#[derive(Debug, Subcommand)]
pub enum EnergyCommand {
    /// List energy records, newest first
    #[command(alias = "ls")]
    List {
        /// Only this site id
        #[arg(long)]
        site: Option<String>,

        /// Max rows
        #[arg(long, short = 'l')]
        limit: Option<u32>,
    },

    /// Record a consumption reading
    Record {
        /// Site id
        #[arg(long)]
        site: String,

        /// Equipment id (must be installed at the site)
        #[arg(long)]
        equipment: Option<String>,

        /// Consumption in kWh
        #[arg(long)]
        kwh: f64,

        /// Cost (default: kWh x tariff)
        #[arg(long)]
        cost: Option<f64>,

        /// Period start (RFC 3339 or YYYY-MM-DD HH:MM)
        #[arg(long)]
        start: String,

        /// Period end (must be after start)
        #[arg(long)]
        end: String,
    },

    /// Edit an energy record
    Edit {
        /// Record id
        id: String,

        #[arg(long)]
        site: Option<String>,

        #[arg(long, conflicts_with = "clear_equipment")]
        equipment: Option<String>,

        /// Detach the equipment
        #[arg(long)]
        clear_equipment: bool,

        #[arg(long)]
        kwh: Option<f64>,

        #[arg(long)]
        cost: Option<f64>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },

    /// Delete an energy record
    #[command(alias = "rm")]
    Delete {
        /// Record id
        id: String,
    },

    /// Totals and average consumption
    Stats,

    /// Six-month consumption trend
    Trend,

    /// Top sites by consumption
    BySite {
        /// Number of sites
        #[arg(long, short = 'l', default_value = "10")]
        limit: usize,
    },
}

// ── Sites & Equipment ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites
    #[command(alias = "ls")]
    List,

    /// Site status counts
    Stats,
}

#[derive(Debug, Args)]
pub struct EquipmentArgs {
    #[command(subcommand)]
    pub command: EquipmentCommand,
}

#[derive(Debug, Subcommand)]
pub enum EquipmentCommand {
    /// List equipment
    #[command(alias = "ls")]
    List {
        /// Only equipment installed at this site id
        #[arg(long)]
        site: Option<String>,
    },
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts, newest first
    #[command(alias = "ls")]
    List {
        /// Only active alerts
        #[arg(long)]
        active: bool,

        /// Max rows
        #[arg(long, short = 'l', default_value = "50")]
        limit: u32,
    },

    /// Poll active alerts, redraw the list and ring on each new critical one
    Watch {
        /// Poll interval, e.g. "10s" or "1m" (default: profile's live interval)
        #[arg(long, short = 'i')]
        interval: Option<String>,
    },

    /// Stay in the background and only ring on new critical alerts
    Notify {
        /// Poll interval (default: profile's background alert interval)
        #[arg(long, short = 'i')]
        interval: Option<String>,
    },
}

// ── Users ────────────────────────────────────────────────────────────

pub const ROLES: [&str; 4] = ["admin", "manager", "engineer", "technician"];

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List user profiles
    #[command(alias = "ls")]
    List,

    /// Edit a user profile (admin only)
    Edit {
        /// Profile id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = ROLES)]
        role: Option<String>,

        #[arg(long)]
        region: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        department: Option<String>,
    },

    /// Delete a user profile (admin only)
    #[command(alias = "rm")]
    Delete {
        /// Profile id
        id: String,
    },

    /// Role counts and today's activity
    Stats,
}

// ── Own profile ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the acting user's profile
    Show,

    /// Update your name and contact details. An empty value clears a field.
    Edit {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        region: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        department: Option<String>,
    },
}

// ── Reports ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportCollection {
    Sites,
    Equipment,
    Interventions,
    Alerts,
    Breakdowns,
    Energy,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// Network-wide summary
    Overview,

    /// Categorical and monthly chart data
    Charts,

    /// Export one collection as CSV
    ExportCsv {
        /// Collection to export
        collection: ExportCollection,

        /// Directory to write into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Export the full report bundle as JSON
    ExportJson {
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
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
    /// Interactive configuration wizard
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Set a profile value
    Set {
        /// Config key (e.g. "url", "timeout", "energy_tariff")
        key: String,

        /// Value to set
        value: String,
    },

    /// Store the API key (or access token) in the system keyring
    SetKey {
        /// Profile to store it for (default: active profile)
        #[arg(long)]
        profile: Option<String>,

        /// Store the user access token instead of the API key
        #[arg(long)]
        access_token: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
