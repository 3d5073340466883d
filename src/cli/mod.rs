//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Credential input and encoding mode
//! - Terminal, direction and gate/counter selection
//! - Endpoint family selection (fixed or discovery)
//! - Output format, verbosity and refresh interval

use anyhow::{anyhow, Result};
use chrono::{FixedOffset, NaiveDate, Utc};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{parse_directions, validate_page_size, validate_timeout, ApiSettings, AppConfig};
use crate::constants::PROVIDER_UTC_OFFSET_SECS;
use crate::endpoints::EndpointSelection;
use crate::filter::{CounterRangeRule, FilterSet};
use crate::logging::Verbosity;
use crate::models::{ConfigError, Direction, QueryConfig, Terminal};

/// Raw command-line values, before merging with the configuration file
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub key: Option<String>,
    pub raw_key: bool,
    pub terminals: Vec<String>,
    pub gates: Vec<String>,
    pub direction: Option<String>,
    pub date: Option<String>,
    pub family: Option<String>,
    pub counter_codes: bool,
    pub parallel: bool,
    pub timeout: Option<u64>,
    pub page_size: Option<u32>,
    pub base_url: Option<String>,
    pub watch: Option<u64>,
    pub links: bool,
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

impl CliArgs {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Everything the binary needs for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub query: QueryConfig,
    pub api: ApiSettings,
    pub counter_rule: Option<CounterRangeRule>,
    /// `--date` was given; otherwise each cycle uses the current provider date
    pub fixed_date: bool,
    pub watch: Option<Duration>,
    pub links_only: bool,
    pub json_output: bool,
    pub quiet_mode: bool,
}

fn build_command() -> Command {
    Command::new("gatewatch")
        .version(env!("GATEWATCH_VERSION"))
        .about("Flight board for the airport passenger-flight API")
        .long_about("Queries departures and arrivals per terminal, filters them by gate or check-in counter, and prints them in schedule order.")
        .arg(
            Arg::new("key")
                .short('k')
                .long("key")
                .value_name("KEY")
                .help("Service key, percent-encoded or decoded")
        )
        .arg(
            Arg::new("raw-key")
                .long("raw-key")
                .help("Send the key exactly as given, without decode/encode")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("terminal")
                .short('t')
                .long("terminal")
                .value_name("LABEL")
                .help("Terminal to query: T1, CONCOURSE or T2 (default: all)")
                .action(ArgAction::Append)
        )
        .arg(
            Arg::new("gate")
                .short('g')
                .long("gate")
                .value_name("LIST")
                .help("Comma-separated gates or counters to show (default: all)")
                .action(ArgAction::Append)
        )
        .arg(
            Arg::new("direction")
                .short('d')
                .long("direction")
                .value_name("DIR")
                .help("departure, arrival or both (default: departure)")
        )
        .arg(
            Arg::new("date")
                .long("date")
                .value_name("YYYYMMDD")
                .help("Provider-local date (default: today)")
        )
        .arg(
            Arg::new("family")
                .long("family")
                .value_name("NAME")
                .help("Use one endpoint family instead of probing all")
        )
        .arg(
            Arg::new("counter-codes")
                .long("counter-codes")
                .help("Also match counter ranges by island code (H05-H18 -> H1)")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .help("Issue independent calls concurrently")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Per-request timeout in seconds (1-10)")
                .value_parser(value_parser!(u64))
        )
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_name("N")
                .help("Rows requested per call (1-300)")
                .value_parser(value_parser!(u32))
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Provider base URL")
        )
        .arg(
            Arg::new("watch")
                .short('w')
                .long("watch")
                .value_name("SECS")
                .help("Refresh the board every SECS seconds until interrupted")
                .value_parser(value_parser!(u64).range(1..))
        )
        .arg(
            Arg::new("links")
                .long("links")
                .help("Print one probe URL per endpoint family and exit")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress diagnostics and log output")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every request")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file (TOML)")
                .value_parser(value_parser!(PathBuf))
        )
}

fn args_from_matches(matches: &ArgMatches) -> CliArgs {
    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };

    CliArgs {
        key: matches.get_one::<String>("key").cloned(),
        raw_key: matches.get_flag("raw-key"),
        terminals: strings("terminal"),
        gates: strings("gate"),
        direction: matches.get_one::<String>("direction").cloned(),
        date: matches.get_one::<String>("date").cloned(),
        family: matches.get_one::<String>("family").cloned(),
        counter_codes: matches.get_flag("counter-codes"),
        parallel: matches.get_flag("parallel"),
        timeout: matches.get_one::<u64>("timeout").copied(),
        page_size: matches.get_one::<u32>("rows").copied(),
        base_url: matches.get_one::<String>("base-url").cloned(),
        watch: matches.get_one::<u64>("watch").copied(),
        links: matches.get_flag("links"),
        json: matches.get_flag("json"),
        quiet: matches.get_flag("quiet"),
        verbose: matches.get_flag("verbose"),
        config: matches.get_one::<PathBuf>("config").cloned(),
    }
}

/// Parse process arguments; exits with usage on error
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_command().get_matches())
}

/// Parse an explicit argument list
pub fn parse_from<I, T>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command()
        .try_get_matches_from(args)
        .map_err(|e| anyhow!("{}", e))?;
    Ok(args_from_matches(&matches))
}

/// Today's date in provider-local time
pub fn provider_today() -> NaiveDate {
    let now = Utc::now();
    match FixedOffset::east_opt(PROVIDER_UTC_OFFSET_SECS) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d")
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

fn parse_terminals(labels: &[String]) -> Result<Vec<Terminal>, ConfigError> {
    if labels.is_empty() {
        return Ok(Terminal::ALL.to_vec());
    }
    let mut terminals = Vec::new();
    for label in labels.iter().flat_map(|l| l.split(',')).filter(|l| !l.trim().is_empty()) {
        let terminal: Terminal = label.parse()?;
        if !terminals.contains(&terminal) {
            terminals.push(terminal);
        }
    }
    Ok(terminals)
}

/// Merge command-line values over the configuration file.
///
/// The credential comes from `--key`, then the file, then the environment.
/// A missing credential is left empty here and rejected by the query
/// engine before any request is made.
pub fn build_run_config(args: &CliArgs, file: &AppConfig, today: NaiveDate) -> Result<RunConfig> {
    let mut api = file.api.clone();
    if let Some(timeout) = args.timeout {
        validate_timeout(timeout)?;
        api.timeout_secs = timeout;
    }
    if let Some(rows) = args.page_size {
        validate_page_size(rows)?;
        api.page_size = rows;
    }
    if let Some(base_url) = &args.base_url {
        api.base_url = base_url.clone();
    }
    api.parallel |= args.parallel;

    let credential = args
        .key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| file.service_key())
        .unwrap_or_default();

    let terminal_inputs = if args.terminals.is_empty() {
        &file.query.terminals
    } else {
        &args.terminals
    };
    let terminals = parse_terminals(terminal_inputs)?;

    let directions = match args.direction.as_deref().or(file.query.direction.as_deref()) {
        Some(value) => parse_directions(value)?,
        None => vec![Direction::Departure],
    };

    let filters = if args.gates.is_empty() {
        FilterSet::from_inputs(&file.query.gates)
    } else {
        FilterSet::from_inputs(&args.gates)
    };

    let as_of_date = match &args.date {
        Some(value) => parse_date(value)?,
        None => today,
    };

    let family = args.family.as_deref().or(file.query.family.as_deref());
    let endpoints = EndpointSelection::from_name(family, file.families())?;

    let counter_rule = (args.counter_codes || file.counter_codes.enabled)
        .then(|| CounterRangeRule::new(file.counter_codes.threshold));

    Ok(RunConfig {
        query: QueryConfig {
            credential,
            endpoints,
            terminals,
            directions,
            filters,
            as_of_date,
            use_alternate_encoding: args.raw_key || file.credential.verbatim,
        },
        api,
        counter_rule,
        fixed_date: args.date.is_some(),
        watch: args.watch.map(Duration::from_secs),
        links_only: args.links,
        json_output: args.json,
        quiet_mode: args.quiet,
    })
}
