use chrono::NaiveDate;
use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

use crate::data_fetcher::cache::CachePartition;
use crate::error::AppError;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Returns true when the invocation only manages configuration and should
/// not query any feeds
pub fn is_config_operation(args: &Args) -> bool {
    args.new_api_key.is_some()
        || args.new_log_file_path.is_some()
        || args.clear_log_file_path
        || args.list_config
}

/// MLB scores from the SportsData feeds
///
/// Lists every game scheduled on the requested dates with its score, status,
/// innings and location. Feed fragments are cached per partition, so repeated
/// queries inside one run reuse what has already been fetched.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(styles = get_styles())]
pub struct Args {
    /// Date to list games for, in YYYY-MM-DD format. Repeat for several
    /// dates. Defaults to today.
    #[arg(long = "date", short = 'd', help_heading = "Query")]
    pub dates: Vec<String>,

    /// Cache partition key for fetched fragments. Defaults to today's date.
    #[arg(long = "partition", short = 'p', help_heading = "Query")]
    pub partition: Option<String>,

    /// Only show games where this team abbreviation plays (e.g. SEA)
    #[arg(long = "team", short = 't', help_heading = "Query")]
    pub team: Option<String>,

    /// Print game summaries as JSON instead of score lines
    #[arg(long = "json", help_heading = "Output")]
    pub json: bool,

    /// Store the SportsData API key in config
    #[arg(long = "config", help_heading = "Configuration", value_name = "API_KEY")]
    pub new_api_key: Option<String>,

    /// Update log file path in config. This sets a persistent custom log file location.
    #[arg(long = "set-log-file", help_heading = "Configuration")]
    pub new_log_file_path: Option<String>,

    /// Clear the custom log file path from config
    #[arg(long = "clear-log-file", help_heading = "Configuration")]
    pub clear_log_file_path: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Show version information
    #[arg(short = 'V', long = "version", help_heading = "Info")]
    pub version: bool,

    /// Also write logs to stdout
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}

impl Args {
    /// Requested dates, or today when none were given
    pub fn query_dates(&self) -> Result<Vec<NaiveDate>, AppError> {
        if self.dates.is_empty() {
            return Ok(vec![chrono::Local::now().date_naive()]);
        }

        self.dates
            .iter()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                    AppError::datetime_parse_error(format!(
                        "Invalid date '{raw}', expected YYYY-MM-DD: {e}"
                    ))
                })
            })
            .collect()
    }

    pub fn cache_partition(&self) -> CachePartition {
        self.partition
            .as_deref()
            .map(CachePartition::from)
            .unwrap_or_default()
    }
}
