// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use model_controller::config::{ConfigDocument, Settings};
use model_controller::engine::Graph;
use model_controller::observability::init_tracing;
use model_controller::observability::messages::config::{ControllerStarted, ControllerStopped, SettingsLoaded};
use model_controller::observability::messages::StructuredLog;

fn load_settings(path: Option<&String>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path).with_context(|| format!("loading settings from {}", path)),
        None => Ok(Settings::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 || args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!("Usage: {} [settings.yaml|settings.toml]", args[0]);
        std::process::exit(1);
    }

    let settings = load_settings(args.get(1))?;
    init_tracing(&settings.log_filter);
    if let Some(path) = args.get(1) {
        SettingsLoaded {
            path: Path::new(path),
            document_path: &settings.document_path,
            tick_interval_ms: settings.tick_interval_ms,
        }
        .log();
    }

    let document = ConfigDocument::load(&settings.document_path)
        .with_context(|| format!("loading {}", settings.document_path.display()))?;
    let graph = Graph::builder(settings.clone()).with_document(document).build();
    graph.populate();

    ControllerStarted {
        edge_name: &settings.edge_name,
        node_count: graph.node_count(),
        tick_interval_ms: settings.tick_interval_ms,
    }
    .log();

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let started = Instant::now();
    let mut interval = tokio::time::interval(Duration::from_millis(settings.tick_interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                graph.tick(started.elapsed().as_millis() as u64);
                ticks += 1;
            }
        }
    }

    graph
        .store()
        .save()
        .with_context(|| format!("saving {}", settings.document_path.display()))?;
    ControllerStopped {
        edge_name: &settings.edge_name,
        ticks,
    }
    .log();
    Ok(())
}
