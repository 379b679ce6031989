use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use triage::console::{Console, ConsoleResolver};
use triage::tree::scenario;
use triage::{DecisionGraph, NavigationEngine};

const USAGE: &str = "\
Usage: triage [path-to-graph.json]

Without a path the built-in TV support tree is used.

Controls: type an option's hotkey, #N for the Nth option, or one of
  <enter>/repeat   repeat the question
  back             undo the last answer
  reset            start over
  quit             leave

Logging: set RUST_LOG=debug for verbose output";

fn main() -> Result<()> {
    // Control verbosity with RUST_LOG:
    //   RUST_LOG=info   cargo run            # transitions, resets, articles
    //   RUST_LOG=debug  cargo run            # + graph loading and repeats
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();

    let graph = match args.get(1).map(String::as_str) {
        Some("-h") | Some("--help") => {
            println!("{USAGE}");
            return Ok(());
        }
        Some(path) => DecisionGraph::from_path(Path::new(path))
            .with_context(|| format!("failed to load decision graph from {path}"))?,
        None => scenario::tv_support_scenario().context("built-in scenario is invalid")?,
    };

    info!(
        "Decision graph ready: {} nodes, start '{}'",
        graph.len(),
        graph.start_node_id()
    );

    let mut engine = NavigationEngine::new(Arc::new(graph));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), ConsoleResolver);
    console.run(&mut engine)
}
