//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fieldsched",
    version,
    about = "Field inspection scheduling client",
    long_about = "Detect which company an inspection export belongs to, manage company\n\
                  profiles, and hand exports and route requests to the scheduling services."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include header text from customer files in logs.
    #[arg(long = "log-headers", global = true)]
    pub log_headers: bool,

    /// Config file (default: config.toml in the platform config folder).
    #[arg(long = "config", value_name = "PATH", global = true, env = "FIELDSCHED_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Detect which company profile each export belongs to.
    Detect(DetectArgs),

    /// Print the header row of an export.
    Headers(HeadersArgs),

    /// List or edit company profiles.
    #[command(subcommand)]
    Profiles(ProfilesCommand),

    /// Send an export to the ingestion workflow.
    Ingest(IngestArgs),

    /// Request an optimized route for a service date.
    Route(RouteArgs),

    /// Sign in to the hosted backend.
    Login(LoginArgs),

    /// Sign out and forget the stored session.
    Logout,

    /// Subscription status and billing portal.
    #[command(subcommand)]
    Subscription(SubscriptionCommand),
}

#[derive(Args)]
pub struct DetectArgs {
    /// Export files, or folders to scan for exports.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Read profiles from the hosted store instead of the local catalog.
    #[arg(long = "remote")]
    pub remote: bool,

    /// Minimum share of a fingerprint that must be present (0-1].
    #[arg(long = "threshold", value_name = "RATIO")]
    pub threshold: Option<f64>,

    /// Pick the highest-scoring confident profile instead of the first.
    #[arg(long = "best-ratio")]
    pub best_ratio: bool,

    /// Show every profile's score and the matched profile's mappings.
    #[arg(long = "explain")]
    pub explain: bool,
}

#[derive(Args)]
pub struct HeadersArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Subcommand)]
pub enum ProfilesCommand {
    /// List active profiles in catalog order.
    List(ListArgs),

    /// Create or replace a profile, keyed on its code.
    Upsert(UpsertArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Read from the hosted store instead of the local catalog.
    #[arg(long = "remote")]
    pub remote: bool,
}

#[derive(Args)]
pub struct UpsertArgs {
    /// Company code, 1-8 letters or digits (stored uppercase).
    #[arg(long = "code")]
    pub code: String,

    /// Display name.
    #[arg(long = "name")]
    pub name: String,

    /// Take the fingerprint from this export's header row.
    #[arg(long = "fingerprint-from", value_name = "FILE", conflicts_with = "fingerprint")]
    pub fingerprint_from: Option<PathBuf>,

    /// Expected header; repeat for each one.
    #[arg(long = "fingerprint", value_name = "HEADER")]
    pub fingerprint: Vec<String>,

    /// Column mapping as SOURCE=FIELD; repeat for each one.
    #[arg(long = "map", value_name = "SOURCE=FIELD")]
    pub mappings: Vec<String>,

    #[arg(long = "standard-minutes", value_name = "MINUTES", default_value_t = 30)]
    pub standard_minutes: u32,

    #[arg(long = "high-value-minutes", value_name = "MINUTES", default_value_t = 60)]
    pub high_value_minutes: u32,

    /// none, call-ahead, date-only or date-and-time.
    #[arg(long = "appointment-type", value_name = "TYPE", default_value = "none")]
    pub appointment_type: String,

    /// Write to the hosted store instead of the local catalog.
    #[arg(long = "remote")]
    pub remote: bool,
}

#[derive(Args)]
pub struct IngestArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Company code to send as the hint, skipping detection.
    #[arg(long = "company", value_name = "CODE")]
    pub company: Option<String>,

    /// Send without a company hint.
    #[arg(long = "no-detect", conflicts_with = "company")]
    pub no_detect: bool,

    /// Detect against the hosted store instead of the local catalog.
    #[arg(long = "remote")]
    pub remote: bool,
}

#[derive(Args)]
pub struct RouteArgs {
    /// Service date (YYYY-MM-DD).
    #[arg(long = "date", value_name = "DATE")]
    pub date: NaiveDate,

    /// Starting address for the route.
    #[arg(long = "start", value_name = "ADDRESS")]
    pub start: Option<String>,

    /// Restrict the route to these inspections; repeat for each one.
    #[arg(long = "inspection", value_name = "ID")]
    pub inspections: Vec<String>,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Account email. The password is read from FIELDSCHED_PASSWORD or stdin.
    #[arg(long = "email")]
    pub email: String,
}

#[derive(Subcommand)]
pub enum SubscriptionCommand {
    /// Show the current subscription.
    Status,

    /// Open a billing portal session and print its URL.
    Portal(PortalArgs),
}

#[derive(Args)]
pub struct PortalArgs {
    /// Where the portal sends the user afterwards.
    #[arg(long = "return-url", value_name = "URL")]
    pub return_url: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
