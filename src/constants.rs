//! Global constants for gatewatch
//!
//! Centralized location for provider defaults and request bounds

/// Base URL of the passenger-flight service provider
pub const DEFAULT_BASE_URL: &str = "http://apis.data.go.kr/B551177";

/// Value of the response-format parameter; the provider answers XML otherwise
pub const RESPONSE_FORMAT_JSON: &str = "json";

/// Rows requested per call when nothing else is configured
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Upper bound on rows per call. Larger requests are rejected upstream.
pub const MAX_PAGE_SIZE: u32 = 300;

/// Only the first page is ever requested
pub const FIRST_PAGE: u32 = 1;

/// Per-request timeout bounds in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 10;

/// Characters of a rejected response body kept in a diagnostic entry
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Provider-local UTC offset (KST) used to pick "today"
pub const PROVIDER_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// Result code the provider reports in `response.header` on success
pub const PROVIDER_OK_CODE: &str = "00";

/// Environment variable consulted for the credential
pub const ENV_SERVICE_KEY: &str = "GATEWATCH_SERVICE_KEY";

/// Rows requested by generated probe links
pub const PROBE_LINK_ROWS: u32 = 5;

/// Counter-range number at or below which the H1 short code applies
pub const DEFAULT_COUNTER_THRESHOLD: u32 = 18;

/// Replacement text for the credential in logged URLs
pub const REDACTED: &str = "***";
