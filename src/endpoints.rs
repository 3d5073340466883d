//! Endpoint families and request construction
//!
//! The provider exposes several service groupings with overlapping purposes
//! and slightly different parameter contracts. Each one is described by an
//! `EndpointFamily` so that the differences live in a table, not in code.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{FIRST_PAGE, PROBE_LINK_ROWS, REDACTED, RESPONSE_FORMAT_JSON};
use crate::credential::Credential;
use crate::models::{ConfigError, Direction, Terminal};

/// Query parameter names shared by every operation of a family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamNames {
    pub credential: String,
    pub format: String,
    pub rows: String,
    pub page: String,
    pub date: String,
}

impl Default for ParamNames {
    fn default() -> Self {
        Self {
            credential: "serviceKey".to_string(),
            format: "type".to_string(),
            rows: "numOfRows".to_string(),
            page: "pageNo".to_string(),
            date: "searchDate".to_string(),
        }
    }
}

/// One logical remote operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub direction: Direction,
    /// Service path below the provider base URL
    pub base_path: String,
    pub operation: String,
    /// Name of the parameter carrying the terminal code
    #[serde(default = "default_terminal_param")]
    pub terminal_param: String,
    #[serde(default)]
    pub requires_date: bool,
}

fn default_terminal_param() -> String {
    "terminalId".to_string()
}

impl EndpointSpec {
    pub fn new(direction: Direction, base_path: &str, operation: &str) -> Self {
        Self {
            direction,
            base_path: base_path.to_string(),
            operation: operation.to_string(),
            terminal_param: default_terminal_param(),
            requires_date: false,
        }
    }

    pub fn with_terminal_param(mut self, name: &str) -> Self {
        self.terminal_param = name.to_string();
        self
    }

    pub fn with_date(mut self) -> Self {
        self.requires_date = true;
        self
    }

    /// Path relative to the provider base URL
    pub fn path(&self) -> String {
        format!(
            "{}/{}",
            self.base_path.trim_matches('/'),
            self.operation.trim_matches('/')
        )
    }
}

/// A departure/arrival endpoint pair from one service grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointFamily {
    pub name: String,
    pub departure: EndpointSpec,
    pub arrival: EndpointSpec,
    #[serde(default)]
    pub params: ParamNames,
}

impl EndpointFamily {
    pub fn endpoint(&self, direction: Direction) -> &EndpointSpec {
        match direction {
            Direction::Departure => &self.departure,
            Direction::Arrival => &self.arrival,
        }
    }

    /// Reject families whose departure/arrival slots are swapped or empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidFamily {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.departure.direction != Direction::Departure {
            return Err(invalid("departure endpoint must have direction 'departure'"));
        }
        if self.arrival.direction != Direction::Arrival {
            return Err(invalid("arrival endpoint must have direction 'arrival'"));
        }
        for spec in [&self.departure, &self.arrival] {
            if spec.base_path.trim().is_empty() || spec.operation.trim().is_empty() {
                return Err(invalid("base_path and operation are required"));
            }
            if spec.terminal_param.trim().is_empty() {
                return Err(invalid("terminal_param is required"));
            }
        }
        Ok(())
    }
}

/// Built-in families in probing priority order
pub fn builtin_families() -> Vec<EndpointFamily> {
    vec![
        EndpointFamily {
            name: "odp".to_string(),
            departure: EndpointSpec::new(
                Direction::Departure,
                "StatusOfPassengerFlightsOdp",
                "getPassengerDeparturesOdp",
            ),
            arrival: EndpointSpec::new(
                Direction::Arrival,
                "StatusOfPassengerFlightsOdp",
                "getPassengerArrivalsOdp",
            ),
            params: ParamNames::default(),
        },
        EndpointFamily {
            name: "standard".to_string(),
            departure: EndpointSpec::new(
                Direction::Departure,
                "StatusOfPassengerFlights",
                "getPassengerDepartures",
            ),
            arrival: EndpointSpec::new(
                Direction::Arrival,
                "StatusOfPassengerFlights",
                "getPassengerArrivals",
            ),
            params: ParamNames::default(),
        },
        EndpointFamily {
            name: "dsodp".to_string(),
            departure: EndpointSpec::new(
                Direction::Departure,
                "StatusOfPassengerFlightsDSOdp",
                "getPassengerDeparturesDSOdp",
            )
            .with_terminal_param("searchTerminalId")
            .with_date(),
            arrival: EndpointSpec::new(
                Direction::Arrival,
                "StatusOfPassengerFlightsDSOdp",
                "getPassengerArrivalsDSOdp",
            )
            .with_terminal_param("searchTerminalId")
            .with_date(),
            params: ParamNames::default(),
        },
    ]
}

/// Merge configured families into the built-in table.
///
/// A configured family replaces the built-in one with the same name;
/// new names are appended after the built-ins.
pub fn merge_families(mut base: Vec<EndpointFamily>, extra: &[EndpointFamily]) -> Vec<EndpointFamily> {
    for family in extra {
        match base.iter_mut().find(|f| f.name == family.name) {
            Some(existing) => *existing = family.clone(),
            None => base.push(family.clone()),
        }
    }
    base
}

/// Which families a cycle may use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSelection {
    /// Probe candidates in order and commit to the first that answers
    Discover(Vec<EndpointFamily>),
    /// Use a single pre-selected family
    Fixed(EndpointFamily),
}

impl EndpointSelection {
    pub fn candidates(&self) -> &[EndpointFamily] {
        match self {
            EndpointSelection::Discover(families) => families,
            EndpointSelection::Fixed(family) => std::slice::from_ref(family),
        }
    }

    /// Pick `name` from `families`, or discover over all of them
    pub fn from_name(name: Option<&str>, families: Vec<EndpointFamily>) -> Result<Self, ConfigError> {
        match name {
            None => Ok(EndpointSelection::Discover(families)),
            Some(wanted) => families
                .into_iter()
                .find(|f| f.name.eq_ignore_ascii_case(wanted))
                .map(EndpointSelection::Fixed)
                .ok_or_else(|| ConfigError::UnknownFamily(wanted.to_string())),
        }
    }
}

/// A fully built request URL plus a copy that is safe to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    pub url: String,
    pub redacted: String,
}

/// Per-call request inputs
#[derive(Debug, Clone, Copy)]
pub struct RequestParams<'a> {
    pub base_url: &'a str,
    pub family: &'a EndpointFamily,
    pub direction: Direction,
    pub terminal: Terminal,
    pub rows: u32,
    pub date: NaiveDate,
}

/// Build the GET URL for one (terminal, direction) call.
///
/// The credential is encoded by `Credential::query_value`; every other value
/// is percent-encoded here. The date parameter is only sent when the
/// endpoint declares it.
pub fn build_request_url(params: &RequestParams<'_>, credential: &Credential) -> RequestUrl {
    let spec = params.family.endpoint(params.direction);
    let names = &params.family.params;

    let mut pairs: Vec<(&str, String)> = vec![
        (names.format.as_str(), RESPONSE_FORMAT_JSON.to_string()),
        (spec.terminal_param.as_str(), params.terminal.code().to_string()),
        (names.rows.as_str(), params.rows.to_string()),
        (names.page.as_str(), FIRST_PAGE.to_string()),
    ];
    if spec.requires_date {
        pairs.push((names.date.as_str(), params.date.format("%Y%m%d").to_string()));
    }

    let rest: String = pairs
        .iter()
        .map(|(k, v)| format!("&{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    let prefix = format!(
        "{}/{}?{}=",
        params.base_url.trim_end_matches('/'),
        spec.path(),
        urlencoding::encode(&names.credential)
    );

    RequestUrl {
        url: format!("{}{}{}", prefix, credential.query_value(), rest),
        redacted: format!("{}{}{}", prefix, REDACTED, rest),
    }
}

/// Departure URLs for terminal T1, one per family, for checking a key by hand
pub fn probe_links(
    base_url: &str,
    families: &[EndpointFamily],
    credential: &Credential,
    date: NaiveDate,
) -> Vec<(String, String)> {
    families
        .iter()
        .map(|family| {
            let request = build_request_url(
                &RequestParams {
                    base_url,
                    family,
                    direction: Direction::Departure,
                    terminal: Terminal::T1,
                    rows: PROBE_LINK_ROWS,
                    date,
                },
                credential,
            );
            (family.name.clone(), request.url)
        })
        .collect()
}
