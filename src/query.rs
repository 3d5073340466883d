//! Flight query engine
//!
//! One query cycle issues one GET per (terminal, direction) pair against the
//! active endpoint family, normalizes whatever comes back and returns the
//! admitted records in schedule order together with a diagnostic log.
//! No per-call failure aborts the cycle.

use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::credential::{Credential, CredentialEncoding};
use crate::endpoints::{build_request_url, EndpointFamily, RequestParams};
use crate::envelope::{self, EnvelopeError};
use crate::filter::{admits_with, FilterSet, ShortCodeRule};
use crate::models::{
    Diagnostic, DiagnosticKind, Direction, FlightRecord, QueryConfig, QueryError, QueryResult,
    Terminal,
};
use crate::transport::Transport;

/// Outcome of a single remote call
#[derive(Debug)]
struct CallOutcome {
    /// The response carried `response.body.items`
    envelope_found: bool,
    records: Vec<FlightRecord>,
    diagnostic: Option<Diagnostic>,
}

impl CallOutcome {
    fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            envelope_found: false,
            records: Vec::new(),
            diagnostic: Some(diagnostic),
        }
    }
}

/// Per-cycle inputs shared by every call
struct Cycle<'a> {
    credential: &'a Credential,
    filters: &'a FilterSet,
    date: NaiveDate,
}

/// Runs query cycles against a transport
pub struct QueryEngine<T: Transport> {
    transport: T,
    base_url: String,
    page_size: u32,
    parallel: bool,
    short_code: Option<Box<dyn ShortCodeRule>>,
}

impl<T: Transport> QueryEngine<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            parallel: false,
            short_code: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Rows requested per call, clamped to 1..=MAX_PAGE_SIZE
    pub fn with_page_size(mut self, rows: u32) -> Self {
        self.page_size = rows.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Issue the calls of a family concurrently. Output order is unchanged.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Secondary key derived from counter ranges when filtering
    pub fn with_short_code_rule(mut self, rule: impl ShortCodeRule + 'static) -> Self {
        self.short_code = Some(Box::new(rule));
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Run one query cycle.
    ///
    /// Returns `Err` only for configuration problems detected before any
    /// network call. Every per-call failure ends up in `diagnostics`.
    pub fn query(&self, config: QueryConfig) -> Result<QueryResult, QueryError> {
        let encoding = if config.use_alternate_encoding {
            CredentialEncoding::Verbatim
        } else {
            CredentialEncoding::Decoded
        };
        let credential = Credential::resolve(&config.credential, encoding)?;

        if config.terminals.is_empty() || config.directions.is_empty() {
            info!("No terminals selected; nothing to query");
            return Ok(QueryResult::default());
        }

        let candidates = config.endpoints.candidates();
        if candidates.is_empty() {
            return Err(QueryError::NoEndpointFamilies);
        }

        let pairs = call_pairs(&config.terminals, &config.directions);
        let cycle = Cycle {
            credential: &credential,
            filters: &config.filters,
            date: config.as_of_date,
        };

        let mut result = QueryResult::default();
        for family in candidates {
            let outcomes = self.run_family(family, &pairs, &cycle);
            let found = outcomes.iter().any(|o| o.envelope_found);

            for outcome in outcomes {
                result.calls += 1;
                result.records.extend(outcome.records);
                if let Some(diagnostic) = outcome.diagnostic {
                    warn!("{}", diagnostic);
                    result.diagnostics.push(diagnostic);
                }
            }

            if found {
                debug!("Committed to endpoint family '{}'", family.name);
                result.family = Some(family.name.clone());
                break;
            }
            if candidates.len() > 1 {
                info!("Endpoint family '{}' returned no valid envelope", family.name);
            }
        }

        // Vec::sort_by is stable; equal timestamps keep arrival order
        result.records.sort_by(|a, b| a.scheduled.cmp(&b.scheduled));

        info!(
            "Query cycle finished: {} records, {} diagnostics, {} calls",
            result.records.len(),
            result.diagnostics.len(),
            result.calls
        );
        Ok(result)
    }

    fn run_family(
        &self,
        family: &EndpointFamily,
        pairs: &[(Terminal, Direction)],
        cycle: &Cycle<'_>,
    ) -> Vec<CallOutcome> {
        if self.parallel {
            pairs
                .par_iter()
                .map(|&(terminal, direction)| self.fetch(family, terminal, direction, cycle))
                .collect()
        } else {
            pairs
                .iter()
                .map(|&(terminal, direction)| self.fetch(family, terminal, direction, cycle))
                .collect()
        }
    }

    fn fetch(
        &self,
        family: &EndpointFamily,
        terminal: Terminal,
        direction: Direction,
        cycle: &Cycle<'_>,
    ) -> CallOutcome {
        let request = build_request_url(
            &RequestParams {
                base_url: &self.base_url,
                family,
                direction,
                terminal,
                rows: self.page_size,
                date: cycle.date,
            },
            cycle.credential,
        );
        debug!("GET {}", request.redacted);

        let diagnostic = |kind| Diagnostic {
            family: family.name.clone(),
            terminal,
            direction,
            kind,
        };

        let response = match self.transport.get(&request.url) {
            Ok(response) => response,
            Err(err) => {
                return CallOutcome::failed(diagnostic(DiagnosticKind::Transport {
                    message: err.to_string(),
                }))
            }
        };

        if response.status != 200 {
            return CallOutcome::failed(diagnostic(DiagnosticKind::Protocol {
                status: response.status,
                excerpt: envelope::excerpt(&response.body),
            }));
        }

        let items = match envelope::extract_items(&response.body) {
            Ok(items) => items,
            Err(EnvelopeError::Provider { code, message }) => {
                return CallOutcome::failed(diagnostic(DiagnosticKind::Provider { code, message }))
            }
            Err(err) => {
                return CallOutcome::failed(diagnostic(DiagnosticKind::Envelope {
                    reason: err.to_string(),
                    excerpt: envelope::excerpt(&response.body),
                }))
            }
        };

        let rule = self.short_code.as_deref();
        let records: Vec<FlightRecord> = items
            .iter()
            .filter_map(|item| envelope::to_record(item, direction, terminal))
            .filter(|record| admits_with(record, cycle.filters, rule))
            .collect();
        debug!(
            "{} {} via '{}': {} items, {} admitted",
            terminal,
            direction,
            family.name,
            items.len(),
            records.len()
        );

        CallOutcome {
            envelope_found: true,
            records,
            diagnostic: None,
        }
    }
}

/// Every (terminal, direction) pair once, in selection order
fn call_pairs(terminals: &[Terminal], directions: &[Direction]) -> Vec<(Terminal, Direction)> {
    let mut pairs = Vec::with_capacity(terminals.len() * directions.len());
    for &terminal in terminals {
        for &direction in directions {
            if !pairs.contains(&(terminal, direction)) {
                pairs.push((terminal, direction));
            }
        }
    }
    pairs
}
