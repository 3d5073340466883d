//! Output formatting module
//!
//! Handles:
//! - Human-readable flight board, one line per record
//! - JSON output of the complete board
//! - Summary statistics and the diagnostics section
//! - Probe link listing

use anyhow::Result;
use std::time::Duration;

use crate::models::{
    Direction, FlightBoardOutput, FlightRecord, QueryConfig, QueryResult, QuerySummary,
};

/// Coarse status derived from the provider's free-text remark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    Scheduled,
    Boarding,
    FinalCall,
    Departed,
    Arrived,
    Delayed,
    Cancelled,
    GateChange,
}

impl FlightStatus {
    pub fn tag(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "SCHEDULED",
            FlightStatus::Boarding => "BOARDING",
            FlightStatus::FinalCall => "FINAL CALL",
            FlightStatus::Departed => "DEPARTED",
            FlightStatus::Arrived => "ARRIVED",
            FlightStatus::Delayed => "DELAYED",
            FlightStatus::Cancelled => "CANCELLED",
            FlightStatus::GateChange => "GATE CHANGE",
        }
    }
}

/// Classify a remark. Korean and English provider wording are recognized;
/// anything else is `Scheduled`.
pub fn classify_remark(remark: &str) -> FlightStatus {
    let upper = remark.trim().to_uppercase();
    let has = |needles: &[&str]| needles.iter().any(|n| upper.contains(n));

    if has(&["결항", "CANCEL"]) {
        FlightStatus::Cancelled
    } else if has(&["지연", "DELAY"]) {
        FlightStatus::Delayed
    } else if has(&["게이트변경", "게이트 변경", "GATE CHANGE"]) {
        FlightStatus::GateChange
    } else if has(&["마감", "FINAL"]) {
        FlightStatus::FinalCall
    } else if has(&["탑승", "BOARDING"]) {
        FlightStatus::Boarding
    } else if has(&["출발", "DEPARTED"]) {
        FlightStatus::Departed
    } else if has(&["도착", "ARRIVED", "LANDED"]) {
        FlightStatus::Arrived
    } else {
        FlightStatus::Scheduled
    }
}

/// "202602081030" -> "10:30"; other shapes are shown as-is
pub fn clock(timestamp: &str) -> String {
    if timestamp.len() == 12 && timestamp.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}:{}", &timestamp[8..10], &timestamp[10..12])
    } else {
        timestamp.to_string()
    }
}

/// Wrap a cycle result with its summary
pub fn board_output(result: QueryResult, config: &QueryConfig, elapsed: Duration) -> FlightBoardOutput {
    let summary = QuerySummary {
        as_of_date: config.as_of_date.format("%Y%m%d").to_string(),
        terminals: config.terminals.clone(),
        matched: result.records.len(),
        failed: result.diagnostics.len(),
        calls: result.calls,
        duration_ms: elapsed.as_millis() as u64,
        family: result.family,
    };
    FlightBoardOutput {
        records: result.records,
        diagnostics: result.diagnostics,
        summary,
    }
}

fn format_record(record: &FlightRecord) -> String {
    let mut time = clock(&record.scheduled);
    if let Some(estimated) = record.estimated.as_deref().filter(|e| *e != record.scheduled) {
        time.push_str(&format!(" ({})", clock(estimated)));
    }
    let direction = match record.direction {
        Direction::Departure => "DEP",
        Direction::Arrival => "ARR",
    };
    let gate = if record.gate.is_empty() { "-" } else { record.gate.as_str() };

    let mut line = format!(
        "{:<13} {} {:<9} gate {:<4} {:<8} {:<24} {:<24} [{}]",
        time,
        direction,
        record.terminal.label(),
        gate,
        record.flight,
        record.airline,
        record.airport,
        classify_remark(&record.remark).tag(),
    );
    if let Some(counter) = &record.counter {
        line.push_str(&format!(" counters {}", counter));
    }
    if !record.remark.is_empty() {
        line.push_str(&format!(" {}", record.remark));
    }
    line
}

/// Render the board as text. Diagnostics are left out in quiet mode.
pub fn render_human(output: &FlightBoardOutput, quiet: bool) -> String {
    let mut out = String::new();

    if output.records.is_empty() {
        out.push_str("No flights found.\n");
    } else {
        out.push_str(&format!("Found {} flights:\n\n", output.records.len()));
        for record in &output.records {
            out.push_str(&format_record(record));
            out.push('\n');
        }
    }

    let summary = &output.summary;
    out.push_str("\nQuery Summary:\n");
    out.push_str(&format!("  Date: {}\n", summary.as_of_date));
    out.push_str(&format!("  Matched: {} flights\n", summary.matched));
    out.push_str(&format!("  Calls: {}\n", summary.calls));
    if let Some(family) = &summary.family {
        out.push_str(&format!("  Endpoint family: {}\n", family));
    }
    if summary.failed > 0 {
        out.push_str(&format!("  Failed calls: {}\n", summary.failed));
    }

    let duration_sec = summary.duration_ms as f64 / 1000.0;
    if duration_sec < 1.0 {
        out.push_str(&format!("  Duration: {}ms\n", summary.duration_ms));
    } else {
        out.push_str(&format!("  Duration: {:.2}s\n", duration_sec));
    }

    if !quiet && !output.diagnostics.is_empty() {
        out.push_str("\nDiagnostics:\n");
        for diagnostic in &output.diagnostics {
            out.push_str(&format!("  {}\n", diagnostic));
        }
    }

    out
}

/// Print the board in human-readable format
pub fn format_human(output: &FlightBoardOutput, quiet: bool) -> Result<()> {
    print!("{}", render_human(output, quiet));
    Ok(())
}

/// Print the board as pretty JSON
pub fn format_json(output: &FlightBoardOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

/// Print probe links, one family per block
pub fn format_links(links: &[(String, String)]) {
    for (name, url) in links {
        println!("[{}]", name);
        println!("  {}", url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnostic, DiagnosticKind, Direction, Terminal};

    fn record(gate: &str, scheduled: &str, remark: &str) -> FlightRecord {
        FlightRecord {
            direction: Direction::Departure,
            terminal: Terminal::T1,
            gate: gate.to_string(),
            counter: Some("H05-H18".to_string()),
            scheduled: scheduled.to_string(),
            estimated: Some("202602081045".to_string()),
            flight: "KE703".to_string(),
            airline: "Korean Air".to_string(),
            airport: "Tokyo/Narita".to_string(),
            remark: remark.to_string(),
        }
    }

    fn output(records: Vec<FlightRecord>, diagnostics: Vec<Diagnostic>) -> FlightBoardOutput {
        FlightBoardOutput {
            summary: QuerySummary {
                as_of_date: "20260208".to_string(),
                terminals: vec![Terminal::T1],
                matched: records.len(),
                failed: diagnostics.len(),
                calls: 2,
                duration_ms: 120,
                family: Some("odp".to_string()),
            },
            records,
            diagnostics,
        }
    }

    #[test]
    fn test_classify_remark() {
        assert_eq!(classify_remark("결항"), FlightStatus::Cancelled);
        assert_eq!(classify_remark("지연"), FlightStatus::Delayed);
        assert_eq!(classify_remark("탑승중"), FlightStatus::Boarding);
        assert_eq!(classify_remark("탑승마감"), FlightStatus::FinalCall);
        assert_eq!(classify_remark("출발"), FlightStatus::Departed);
        assert_eq!(classify_remark("Landed"), FlightStatus::Arrived);
        assert_eq!(classify_remark(""), FlightStatus::Scheduled);
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock("202602081030"), "10:30");
        assert_eq!(clock("10:30"), "10:30");
        assert_eq!(clock(""), "");
    }

    #[test]
    fn test_render_board_line() {
        let text = render_human(&output(vec![record("12", "202602081030", "탑승중")], vec![]), false);
        assert!(text.contains("Found 1 flights"));
        assert!(text.contains("10:30 (10:45)"));
        assert!(text.contains("gate 12"));
        assert!(text.contains("[BOARDING]"));
        assert!(text.contains("counters H05-H18"));
        assert!(text.contains("Endpoint family: odp"));
        assert!(!text.contains("Diagnostics:"));
    }

    #[test]
    fn test_render_empty_with_diagnostics() {
        let diagnostic = Diagnostic {
            family: "odp".to_string(),
            terminal: Terminal::T2,
            direction: Direction::Arrival,
            kind: DiagnosticKind::Protocol {
                status: 500,
                excerpt: String::new(),
            },
        };
        let board = output(vec![], vec![diagnostic]);

        let text = render_human(&board, false);
        assert!(text.contains("No flights found."));
        assert!(text.contains("Failed calls: 1"));
        assert!(text.contains("[odp] T2 arrival: HTTP 500"));

        let quiet = render_human(&board, true);
        assert!(!quiet.contains("Diagnostics:"));
    }

    #[test]
    fn test_json_shape() {
        let board = output(vec![record("12", "202602081030", "")], vec![]);
        let json: serde_json::Value = serde_json::to_value(&board).unwrap();
        assert_eq!(json["records"][0]["gate"], "12");
        assert_eq!(json["records"][0]["terminal"], "T1");
        assert_eq!(json["records"][0]["direction"], "departure");
        assert_eq!(json["summary"]["family"], "odp");
    }
}
