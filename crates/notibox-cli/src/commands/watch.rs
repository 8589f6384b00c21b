//! The long-lived watch context.
//!
//! Runs the clock for the whole system: fires snooze wakes, flushes
//! debounced writes, polls for writes from interactive invocations,
//! and periodically re-fetches the remote inbox. Committed events go
//! to stdout as JSON lines; diagnostics go to stderr.

use std::thread;
use std::time::{Duration, Instant};

use notibox_core::now_ms;
use notibox_core::remote::{GitHubRemote, RemoteInbox};
use notibox_core::storage::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn run(interval_secs: Option<u64>, once: bool) -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::load_or_default();
    let fetch_interval =
        Duration::from_secs(interval_secs.unwrap_or(config.sync.fetch_interval_secs));
    let poll_interval = Duration::from_millis(config.watch.poll_interval_ms);

    let mut store = super::open_store()?;
    store.reconcile_on_startup();

    let remote = match GitHubRemote::new() {
        Ok(mut r) if r.is_authenticated() => {
            r.set_page_size(config.sync.page_size);
            Some(r)
        }
        _ => {
            warn!("no GitHub credentials; watching local state only");
            None
        }
    };

    info!(
        fetch_interval_secs = fetch_interval.as_secs(),
        poll_interval_ms = config.watch.poll_interval_ms,
        "watch loop started"
    );

    let mut last_fetch: Option<Instant> = None;

    loop {
        if let Some(remote) = &remote {
            let fetch_due = last_fetch.map_or(true, |t| t.elapsed() >= fetch_interval);
            if fetch_due {
                match remote.fetch() {
                    Ok(items) => {
                        info!(count = items.len(), "fetched remote inbox");
                        store.ingest(items);
                    }
                    Err(e) => {
                        warn!(error = %e, "remote fetch failed");
                        store.note_remote_failure("fetch", &e.to_string());
                    }
                }
                last_fetch = Some(Instant::now());
            }
        }

        match store.poll_external() {
            Ok(true) => info!(version = store.version(), "adopted external state"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "external state poll failed"),
        }

        for event in store.tick(now_ms()) {
            println!("{}", serde_json::to_string(&event)?);
        }

        if once {
            store.flush()?;
            for event in store.take_events() {
                println!("{}", serde_json::to_string(&event)?);
            }
            return Ok(());
        }

        thread::sleep(poll_interval);
    }
}

fn init_logging() {
    let debug_enabled = std::env::var("NOTIBOX_DEBUG_LOG")
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
