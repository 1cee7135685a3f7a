use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pathwire::app::{Blinds, STORE_SIZE};
use pathwire::config::Config;
use pathwire::device::{ByteStore, FileStore, MemoryStore, SntpClock, TimeSource};
use pathwire::http::dispatcher::Dispatcher;
use pathwire::http::parser::RequestParser;
use pathwire::http::registry::HandlerRegistry;
use pathwire::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load().context("loading configuration")?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    anyhow::ensure!(
        cfg.store.size >= STORE_SIZE,
        "store.size must be at least {STORE_SIZE} bytes"
    );
    let store: Box<dyn ByteStore + Send> = match &cfg.store.path {
        Some(path) => Box::new(
            FileStore::open(path, cfg.store.size)
                .with_context(|| format!("opening store {}", path.display()))?,
        ),
        None => Box::new(MemoryStore::new(cfg.store.size)),
    };
    let blinds = Blinds::new(store);

    let mut registry = HandlerRegistry::with_capacity(cfg.handler.max_routes);
    blinds
        .register_routes(&mut registry)
        .context("registering routes")?;

    if cfg.clock.enabled {
        let clock = SntpClock::new(&cfg.clock.server, cfg.clock.timeout());
        match clock.now().await {
            Ok(now) => {
                info!(server = %cfg.clock.server, "clock synced");
                if let Err(e) = blinds.record_sync(now) {
                    warn!(error = %e, "could not store sync time");
                }
            }
            Err(e) => warn!(server = %cfg.clock.server, error = %e, "clock sync failed"),
        }
    }

    let dispatcher = Dispatcher::new(Arc::new(registry))
        .with_parser(RequestParser::new(cfg.handler.max_request_bytes))
        .with_read_timeout(cfg.handler.read_timeout());

    tokio::select! {
        res = server::listener::run(&cfg.listen_addr, Arc::new(dispatcher)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
