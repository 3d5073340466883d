#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gatewatch::cli::{self, RunConfig};
use gatewatch::config::AppConfig;
use gatewatch::credential::{Credential, CredentialEncoding};
use gatewatch::endpoints::probe_links;
use gatewatch::logging;
use gatewatch::output;
use gatewatch::query::QueryEngine;
use gatewatch::transport::HttpTransport;

fn main() -> Result<()> {
    let args = cli::parse_args();
    logging::init_logger(args.verbosity())?;

    let file_config = AppConfig::load(args.config.as_deref())?;
    let mut run = cli::build_run_config(&args, &file_config, cli::provider_today())?;

    if run.links_only {
        return print_links(&run);
    }

    let transport = HttpTransport::new(Duration::from_secs(run.api.timeout_secs))
        .context("Failed to create HTTP client")?;
    let mut engine = QueryEngine::new(transport)
        .with_base_url(run.api.base_url.clone())
        .with_page_size(run.api.page_size)
        .with_parallel(run.api.parallel);
    if let Some(rule) = run.counter_rule {
        engine = engine.with_short_code_rule(rule);
    }

    // Set up interrupt handling for --watch
    let interrupted = Arc::new(AtomicBool::new(false));
    let _ = signal_hook::flag::register(signal_hook::consts::SIGINT, interrupted.clone());
    let _ = signal_hook::flag::register(signal_hook::consts::SIGTERM, interrupted.clone());

    loop {
        if !run.fixed_date {
            run.query.as_of_date = cli::provider_today();
        }

        let start_time = Instant::now();
        let result = engine.query(run.query.clone())?;
        let board = output::board_output(result, &run.query, start_time.elapsed());

        if run.json_output {
            output::format_json(&board)?;
        } else {
            output::format_human(&board, run.quiet_mode)?;
        }

        let Some(interval) = run.watch else { break };
        if !wait_unless_interrupted(interval, &interrupted) {
            break;
        }
        info!("Refreshing board");
    }

    Ok(())
}

fn print_links(run: &RunConfig) -> Result<()> {
    let encoding = if run.query.use_alternate_encoding {
        CredentialEncoding::Verbatim
    } else {
        CredentialEncoding::Decoded
    };
    let credential = Credential::resolve(&run.query.credential, encoding)?;
    let links = probe_links(
        &run.api.base_url,
        run.query.endpoints.candidates(),
        &credential,
        run.query.as_of_date,
    );
    output::format_links(&links);
    Ok(())
}

/// Sleep for `interval`, returning false as soon as an interrupt arrives
fn wait_unless_interrupted(interval: Duration, interrupted: &AtomicBool) -> bool {
    let step = Duration::from_millis(100);
    let deadline = Instant::now() + interval;
    while Instant::now() < deadline {
        if interrupted.load(Ordering::Relaxed) {
            return false;
        }
        std::thread::sleep(step);
    }
    !interrupted.load(Ordering::Relaxed)
}
