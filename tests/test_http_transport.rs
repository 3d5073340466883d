//! Query cycles over real HTTP against a local one-shot server

use chrono::NaiveDate;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use gatewatch::endpoints::{builtin_families, EndpointSelection};
use gatewatch::filter::FilterSet;
use gatewatch::models::{DiagnosticKind, Direction, QueryConfig, Terminal};
use gatewatch::query::QueryEngine;
use gatewatch::transport::HttpTransport;

/// Serve `responses` in order, one connection each. Returns the base URL and
/// a handle yielding the request lines received.
fn serve(responses: Vec<(u16, String)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/B551177", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut request_lines = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            request_lines.push(line.trim_end().to_string());
            // Drain headers
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
        request_lines
    });

    (base, handle)
}

fn config(terminals: Vec<Terminal>) -> QueryConfig {
    QueryConfig {
        credential: "k%2By".to_string(),
        endpoints: EndpointSelection::Fixed(builtin_families()[0].clone()),
        terminals,
        directions: vec![Direction::Departure],
        filters: FilterSet::default(),
        as_of_date: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
        use_alternate_encoding: false,
    }
}

#[test]
fn test_cycle_over_http() {
    let body = r#"{"response":{"header":{"resultCode":"00"},"body":{"items":{"gatenumber":"15","flightId":"KE5","scheduleDateTime":"202602081500"}}}}"#;
    let (base, server) = serve(vec![
        (200, body.to_string()),
        (503, "Service Unavailable".to_string()),
    ]);

    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let result = QueryEngine::new(transport)
        .with_base_url(base)
        .query(config(vec![Terminal::T1, Terminal::T2]))
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].flight, "KE5");
    assert_eq!(result.diagnostics.len(), 1);
    assert!(matches!(
        result.diagnostics[0].kind,
        DiagnosticKind::Protocol { status: 503, .. }
    ));

    let lines = server.join().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(
        "GET /B551177/StatusOfPassengerFlightsOdp/getPassengerDeparturesOdp?serviceKey=k%2By&type=json&terminalId=P01"
    ));
    assert!(lines[1].contains("terminalId=P03"));
}

#[test]
fn test_connection_refused_becomes_diagnostic() {
    // Bind then drop to get a port with nothing listening
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
    let result = QueryEngine::new(transport)
        .with_base_url(format!("http://127.0.0.1:{}", port))
        .query(config(vec![Terminal::T1]))
        .unwrap();

    assert!(result.records.is_empty());
    assert_eq!(result.diagnostics.len(), 1);
    assert!(matches!(result.diagnostics[0].kind, DiagnosticKind::Transport { .. }));
}
