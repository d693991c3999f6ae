//! ctxlog demo
//!
//! Builds a logger from configuration and writes a few records the way a
//! request handler would.

use std::sync::Arc;

use ctxlog::{factory, Context, Field, Metadata, Output, Store, StoreConfig, TraceParent};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    let config = StoreConfig::load().unwrap_or_else(|e| {
        eprintln!("Note: Using default logging configuration ({e})");
        StoreConfig::default()
    });

    // The tracing output needs a subscriber to land anywhere
    if config.output == Output::Tracing {
        init_subscriber()?;
    }

    let store = Store::new(config).map_err(|e| anyhow::anyhow!("Log store error: {}", e))?;
    factory::init_global(store.logger())?;

    let logger = factory::global()
        .ok_or_else(|| anyhow::anyhow!("Global logger missing after init"))?
        .with(vec![Field::string("service", env!("CARGO_PKG_NAME"))]);

    logger.info(
        "Starting demo",
        vec![Field::string("version", env!("CARGO_PKG_VERSION"))],
    );

    // Simulate an inbound request carrying W3C trace headers
    let incoming = Metadata::from_pairs([
        (
            TraceParent::HEADER,
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
        ),
        ("userId", "u-42"),
    ]);
    let mut ctx = Context::new().with_value("userId", "u-42");
    if let Some(span) = TraceParent::from_metadata(&incoming) {
        ctx = ctx.with_span(Arc::new(span));
    }
    let ctx = ctx.with_incoming_metadata(incoming);

    let request_logger = logger.ctx(Some(&ctx));
    request_logger.info("Request accepted", vec![Field::i64("amount", 1200)]);
    request_logger.warn("Slow upstream", vec![Field::f64("latency_ms", 812.5)]);
    request_logger.error("Upstream rejected request", vec![Field::u64("status", 503)]);

    logger.engine().sync();
    Ok(())
}

/// JSON subscriber filtered by RUST_LOG, defaulting to `ctxlog=info`.
fn init_subscriber() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ctxlog=info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Subscriber error: {}", e))
}
