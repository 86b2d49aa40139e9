//! cxapi CLI - turn completion aggregator events into xAPI statements.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cxapi_core::EventPayload;
use cxapi_transform::{TransformConfig, XApiProcessor};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cxapi")]
#[command(about = "Map completion and progress events to xAPI statements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform JSON-lines events into JSON-lines statements
    Transform {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,
        /// JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Platform root URL, overrides the settings file
        #[arg(long)]
        platform_url: Option<String>,
    },
    /// List the registered event types
    EventTypes {
        /// Print the transformer definitions as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            input,
            config,
            platform_url,
        } => {
            let mut settings = match &config {
                Some(path) => TransformConfig::from_file(path)
                    .with_context(|| format!("Failed to load settings from {}", path.display()))?,
                None => TransformConfig::default(),
            };
            if let Some(url) = platform_url {
                settings = settings.with_platform_url(url);
            }
            settings.validate()?;

            let processor = XApiProcessor::new().with_config(settings);
            let reader: Box<dyn BufRead> = match &input {
                Some(path) => Box::new(BufReader::new(
                    std::fs::File::open(path)
                        .with_context(|| format!("Failed to open {}", path.display()))?,
                )),
                None => Box::new(BufReader::new(std::io::stdin().lock())),
            };

            let (events, unreadable) = read_events(reader)?;
            let outcome = processor.transform_batch(&events);

            let mut out = BufWriter::new(std::io::stdout().lock());
            for statement in &outcome.statements {
                serde_json::to_writer(&mut out, statement)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;

            info!(
                "Transformed {} events: {} statements, {} skipped, {} failed, {} unreadable",
                events.len() + unreadable,
                outcome.statements.len(),
                outcome.skipped,
                outcome.failures.len(),
                unreadable
            );

            if !outcome.is_clean() || unreadable > 0 {
                anyhow::bail!(
                    "{} events could not be transformed",
                    outcome.failures.len() + unreadable
                );
            }
        }
        Commands::EventTypes { json } => {
            let processor = XApiProcessor::new();
            let registry = processor.registry();

            if json {
                let defs: serde_json::Map<String, serde_json::Value> = registry
                    .event_types()
                    .into_iter()
                    .filter_map(|key| {
                        let def = registry.get(key)?;
                        Some((key.to_string(), serde_json::to_value(def).ok()?))
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&defs)?);
            } else {
                println!("Event types ({})", registry.len());
                for key in registry.event_types() {
                    if let Some(def) = registry.get(key) {
                        println!("  {} | {}", key, def.verb().display());
                    }
                }
            }
        }
    }

    Ok(())
}

/// Parse one event per non-blank line. Lines that are not JSON are logged
/// and counted, not fatal.
fn read_events(reader: impl BufRead) -> Result<(Vec<EventPayload>, usize)> {
    let mut events = Vec::new();
    let mut unreadable = 0;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        match EventPayload::from_json(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!("Line {}: {}", lineno + 1, e);
                unreadable += 1;
            }
        }
    }

    Ok((events, unreadable))
}
