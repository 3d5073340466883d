//! Data models module
//!
//! Defines core data structures:
//! - Terminal / Direction: what a single remote call is scoped to
//! - FlightRecord: one normalized provider row
//! - Diagnostic: why a remote call did not contribute data
//! - QueryResult: the aggregate output of one query cycle
//! - QueryConfig: everything a query cycle needs, passed by value

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::endpoints::EndpointSelection;
use crate::filter::FilterSet;

/// Which board a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Departure,
    Arrival,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Departure, Direction::Arrival];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Departure => "departure",
            Direction::Arrival => "arrival",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "departure" | "departures" | "dep" => Ok(Direction::Departure),
            "arrival" | "arrivals" | "arr" => Ok(Direction::Arrival),
            _ => Err(ConfigError::UnknownDirection(s.to_string())),
        }
    }
}

/// Passenger terminals known to the provider.
///
/// The label is what users type; the code is what goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terminal {
    #[serde(rename = "T1")]
    T1,
    #[serde(rename = "CONCOURSE")]
    Concourse,
    #[serde(rename = "T2")]
    T2,
}

impl Terminal {
    pub const ALL: [Terminal; 3] = [Terminal::T1, Terminal::Concourse, Terminal::T2];

    pub fn label(&self) -> &'static str {
        match self {
            Terminal::T1 => "T1",
            Terminal::Concourse => "CONCOURSE",
            Terminal::T2 => "T2",
        }
    }

    /// Provider-specific terminal identifier
    pub fn code(&self) -> &'static str {
        match self {
            Terminal::T1 => "P01",
            Terminal::Concourse => "P02",
            Terminal::T2 => "P03",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Terminal {
    type Err = ConfigError;

    /// Accepts either the label ("T1") or the provider code ("P01")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Terminal::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted) || t.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownTerminal(s.to_string()))
    }
}

/// One provider row after normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub direction: Direction,
    pub terminal: Terminal,
    /// Boarding gate (departures) or arrival gate
    pub gate: String,
    /// Check-in counter range such as "H05-H18"; departures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<String>,
    /// Scheduled time, `YYYYMMDDHHMM`
    pub scheduled: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated: Option<String>,
    pub flight: String,
    pub airline: String,
    /// Destination for departures, origin for arrivals
    pub airport: String,
    pub remark: String,
}

/// Why a single remote call did not contribute data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Timeout, refused or reset connection
    Transport { message: String },
    /// HTTP status other than 200
    Protocol { status: u16, excerpt: String },
    /// 200 but the body is not the expected JSON envelope
    Envelope { reason: String, excerpt: String },
    /// The provider's own JSON error header
    Provider { code: String, message: String },
}

/// A non-fatal record describing a failed or anomalous remote call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Endpoint family the call was made against
    pub family: String,
    pub terminal: Terminal,
    pub direction: Direction,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}: ", self.family, self.terminal, self.direction)?;
        match &self.kind {
            DiagnosticKind::Transport { message } => write!(f, "transport error: {}", message),
            DiagnosticKind::Protocol { status, excerpt } => {
                write!(f, "HTTP {}", status)?;
                if !excerpt.is_empty() {
                    write!(f, " ({})", excerpt)?;
                }
                Ok(())
            }
            DiagnosticKind::Envelope { reason, excerpt } => write!(f, "{}: {}", reason, excerpt),
            DiagnosticKind::Provider { code, message } => {
                write!(f, "provider error {}: {}", code, message)
            }
        }
    }
}

/// Aggregate output of one query cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Admitted records, ascending by scheduled time
    pub records: Vec<FlightRecord>,
    /// One entry per failed or anomalous remote call
    pub diagnostics: Vec<Diagnostic>,
    /// Endpoint family that answered with a valid envelope, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Number of remote calls issued
    pub calls: usize,
}

impl QueryResult {
    /// True when some records were returned even though other calls failed
    pub fn is_partial(&self) -> bool {
        !self.records.is_empty() && !self.diagnostics.is_empty()
    }
}

/// Summary statistics for the board output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySummary {
    /// Provider-local date the cycle was scoped to, `YYYYMMDD`
    pub as_of_date: String,
    pub terminals: Vec<Terminal>,
    /// Number of records on the board
    pub matched: usize,
    /// Number of calls that did not contribute data
    pub failed: usize,
    pub calls: usize,
    /// Duration of the cycle in milliseconds
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

/// Complete output structure for JSON serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightBoardOutput {
    pub records: Vec<FlightRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: QuerySummary,
}

/// Everything a query cycle needs. Built once per cycle and passed by value.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Credential as supplied by the user, encoded or not
    pub credential: String,
    pub endpoints: EndpointSelection,
    pub terminals: Vec<Terminal>,
    pub directions: Vec<Direction>,
    pub filters: FilterSet,
    pub as_of_date: NaiveDate,
    /// Send the credential verbatim instead of decode-then-encode
    pub use_alternate_encoding: bool,
}

/// Configuration errors reported before any network call
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Missing credential: pass --key or set the service key in the configuration")]
    MissingCredential,
    #[error("No endpoint families configured")]
    NoEndpointFamilies,
}

/// Invalid configuration values
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Note: bounds must match MIN_TIMEOUT_SECS/MAX_TIMEOUT_SECS in constants.rs
    #[error("Invalid timeout: {0}s. Must be between 1 and 10 seconds")]
    InvalidTimeout(u64),
    /// Note: bound must match MAX_PAGE_SIZE in constants.rs
    #[error("Invalid page size: {0}. Must be between 1 and 300 rows")]
    InvalidPageSize(u32),
    #[error("Unknown terminal '{0}'. Expected one of T1, CONCOURSE, T2")]
    UnknownTerminal(String),
    #[error("Unknown direction '{0}'. Expected departure, arrival or both")]
    UnknownDirection(String),
    #[error("Unknown endpoint family '{0}'")]
    UnknownFamily(String),
    #[error("Invalid date '{0}'. Expected YYYYMMDD")]
    InvalidDate(String),
    #[error("Invalid endpoint family '{name}': {reason}")]
    InvalidFamily { name: String, reason: String },
}
