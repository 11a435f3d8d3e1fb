use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

/// Seiza - staking explorer state tool
///
/// Inspect, share and restore the persisted state of the staking screens.
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug)]
#[command(name = "seiza")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Staking explorer state tool", long_about = None)]
pub struct CliArgs {
    /// TOML file with default settings
    #[arg(long, env = "SEIZA_CONFIG")]
    pub config: Option<PathBuf>,

    /// GraphQL endpoint URL
    #[arg(long, env = "GRAPHQL_URL")]
    pub graphql_url: Option<String>,

    /// Path to SQLite database holding persisted screen state
    #[arg(long, env = "STORE_PATH")]
    pub store_path: Option<String>,

    /// Rows per table page (1-500)
    #[arg(long, env = "ROWS_PER_PAGE")]
    pub rows_per_page: Option<usize>,

    /// Pixels moved per scroll tick while an arrow is held (1-500)
    #[arg(long, env = "SCROLL_STEP_PX")]
    pub scroll_step_px: Option<u32>,

    /// Milliseconds between scroll ticks (5-1000)
    #[arg(long, env = "SCROLL_INTERVAL_MS")]
    pub scroll_interval_ms: Option<u64>,

    /// Debounce for arrow/overlay recomputation on scroll and resize (0-2000)
    #[arg(long, env = "OVERLAY_DEBOUNCE_MS")]
    pub overlay_debounce_ms: Option<u64>,

    /// Debounce for the ADA amount and search inputs (0-5000)
    #[arg(long, env = "INPUT_DEBOUNCE_MS")]
    pub input_debounce_ms: Option<u64>,

    /// Viewport width below which the mobile layout is used (200-4000)
    #[arg(long, env = "MOBILE_BREAKPOINT_PX")]
    pub mobile_breakpoint_px: Option<u32>,

    /// GraphQL request timeout in milliseconds (1000-60000)
    #[arg(long, env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Adopt URL state into storage when a screen opens with a differing query
    #[arg(long, env = "AUTO_SYNC")]
    pub auto_sync: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the shareable query rebuilt from stored state
    Query,
    /// Open the staking list with a URL query, applying the auto-sync policy
    Open {
        /// Query string, with or without the leading '?'
        query: String,
    },
    /// Overwrite stored state from a query string
    Adopt { query: String },
    /// Fetch the pool list and print one page using stored sort and search
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Write the selected pools to an export file
    Export {
        /// Output path (defaults to seiza-pools-<date>.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the selected pools from an export file
    Import { file: PathBuf },
    /// Clear every stored field
    Reset,
    /// Print the resolved configuration
    Config,
}

/// Settings accepted from the config file. Every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub graphql_url: Option<String>,
    pub store_path: Option<String>,
    pub rows_per_page: Option<usize>,
    pub scroll_step_px: Option<u32>,
    pub scroll_interval_ms: Option<u64>,
    pub overlay_debounce_ms: Option<u64>,
    pub input_debounce_ms: Option<u64>,
    pub mobile_breakpoint_px: Option<u32>,
    pub request_timeout_ms: Option<u64>,
    pub auto_sync: Option<bool>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| anyhow!("invalid config file: {e}"))
    }

    pub fn read(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub graphql_url: String,
    pub store_path: String,
    pub rows_per_page: usize,
    pub scroll_step_px: u32,
    pub scroll_interval_ms: u64,
    pub overlay_debounce_ms: u64,
    pub input_debounce_ms: u64,
    pub mobile_breakpoint_px: u32,
    pub request_timeout_ms: u64,
    pub auto_sync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graphql_url: "https://explorer.example/graphql".to_string(),
            store_path: "./seiza_state.db".to_string(),
            rows_per_page: 10,
            scroll_step_px: 14,
            scroll_interval_ms: 16,
            overlay_debounce_ms: 100,
            input_debounce_ms: 1000,
            mobile_breakpoint_px: 960,
            request_timeout_ms: 8000,
            auto_sync: true,
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

/// Merge parsed args over file settings over defaults, then validate.
pub fn resolve(args: &CliArgs, file: FileConfig) -> Result<Config> {
    let d = Config::default();

    let graphql_url = args
        .graphql_url
        .clone()
        .or(file.graphql_url)
        .unwrap_or(d.graphql_url);
    validate_url(&graphql_url, "GRAPHQL_URL")?;

    let store_path = args
        .store_path
        .clone()
        .or(file.store_path)
        .unwrap_or(d.store_path);
    if store_path.trim().is_empty() {
        return Err(anyhow!("STORE_PATH cannot be empty"));
    }

    let rows_per_page = args.rows_per_page.or(file.rows_per_page).unwrap_or(d.rows_per_page);
    let rows_per_page = validate_in_range(rows_per_page, 1, 500, "ROWS_PER_PAGE")?;

    let scroll_step_px = args.scroll_step_px.or(file.scroll_step_px).unwrap_or(d.scroll_step_px);
    let scroll_step_px = validate_in_range(scroll_step_px, 1, 500, "SCROLL_STEP_PX")?;

    let scroll_interval_ms = args
        .scroll_interval_ms
        .or(file.scroll_interval_ms)
        .unwrap_or(d.scroll_interval_ms);
    let scroll_interval_ms = validate_in_range(scroll_interval_ms, 5, 1000, "SCROLL_INTERVAL_MS")?;

    let overlay_debounce_ms = args
        .overlay_debounce_ms
        .or(file.overlay_debounce_ms)
        .unwrap_or(d.overlay_debounce_ms);
    let overlay_debounce_ms =
        validate_in_range(overlay_debounce_ms, 0, 2000, "OVERLAY_DEBOUNCE_MS")?;

    let input_debounce_ms = args
        .input_debounce_ms
        .or(file.input_debounce_ms)
        .unwrap_or(d.input_debounce_ms);
    let input_debounce_ms = validate_in_range(input_debounce_ms, 0, 5000, "INPUT_DEBOUNCE_MS")?;

    let mobile_breakpoint_px = args
        .mobile_breakpoint_px
        .or(file.mobile_breakpoint_px)
        .unwrap_or(d.mobile_breakpoint_px);
    let mobile_breakpoint_px =
        validate_in_range(mobile_breakpoint_px, 200, 4000, "MOBILE_BREAKPOINT_PX")?;

    let request_timeout_ms = args
        .request_timeout_ms
        .or(file.request_timeout_ms)
        .unwrap_or(d.request_timeout_ms);
    let request_timeout_ms =
        validate_in_range(request_timeout_ms, 1000, 60000, "REQUEST_TIMEOUT_MS")?;

    Ok(Config {
        graphql_url,
        store_path,
        rows_per_page,
        scroll_step_px,
        scroll_interval_ms,
        overlay_debounce_ms,
        input_debounce_ms,
        mobile_breakpoint_px,
        request_timeout_ms,
        auto_sync: args.auto_sync.or(file.auto_sync).unwrap_or(d.auto_sync),
    })
}

/// Load configuration from CLI args, environment variables and the config file.
/// Priority: CLI args > Environment variables > Config file > Defaults
pub fn load() -> Result<(Config, Command)> {
    let args = CliArgs::parse();
    let file = match &args.config {
        Some(path) => FileConfig::read(path)?,
        None => FileConfig::default(),
    };
    let config = resolve(&args, file)?;
    Ok((config, args.command.clone().unwrap_or(Command::Query)))
}

/// Print current configuration (useful for debugging)
impl Config {
    pub fn print_summary(&self) {
        eprintln!("Seiza Configuration:");
        eprintln!("  GraphQL URL: {}", self.graphql_url);
        eprintln!("  Store: {}", self.store_path);
        eprintln!("  Rows Per Page: {}", self.rows_per_page);
        eprintln!(
            "  Scroll: {}px every {}ms (overlay debounce {}ms)",
            self.scroll_step_px, self.scroll_interval_ms, self.overlay_debounce_ms
        );
        eprintln!("  Input Debounce: {}ms", self.input_debounce_ms);
        eprintln!("  Mobile Breakpoint: {}px", self.mobile_breakpoint_px);
        eprintln!("  Request Timeout: {}ms", self.request_timeout_ms);
        eprintln!("  Auto Sync: {}", self.auto_sync);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["seiza"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_when_nothing_given() {
        let cfg = resolve(&args(&[]), FileConfig::default()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn cli_beats_file() {
        let file = FileConfig::parse("rows_per_page = 25\nauto_sync = false\n").unwrap();
        let cfg = resolve(&args(&["--rows-per-page", "50"]), file).unwrap();
        assert_eq!(cfg.rows_per_page, 50);
        assert!(!cfg.auto_sync);
    }

    #[test]
    fn rejects_out_of_range_and_bad_urls() {
        let err = resolve(&args(&["--rows-per-page", "0"]), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("ROWS_PER_PAGE"));

        let err = resolve(&args(&["--graphql-url", "ftp://x"]), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("GRAPHQL_URL"));
    }

    #[test]
    fn unknown_file_keys_rejected() {
        assert!(FileConfig::parse("rows = 3").is_err());
    }

    #[test]
    fn subcommands_parse() {
        let a = args(&["adopt", "?sortBy=x"]);
        assert_eq!(a.command, Some(Command::Adopt { query: "?sortBy=x".into() }));
        let a = args(&["list", "--page", "3"]);
        assert_eq!(a.command, Some(Command::List { page: 3 }));
    }
}
