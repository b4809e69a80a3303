// ABOUTME: Main entry point for the slidedown program.
// ABOUTME: Builds the deck once, serves the output directory and rebuilds on change.

use anyhow::Context;
use clap::Parser;
use log::info;
use std::env;

/// Build a deck.js slideshow from slides.md and serve it, rebuilding on every change.
///
/// Settings are read from slidedown.json in the current directory.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {}

fn run() -> anyhow::Result<()> {
    let project_root = env::current_dir().context("Failed to determine the current directory")?;

    let settings = slidedown::resolve(&project_root).context("Failed to resolve settings")?;
    info!(
        "Presentation {:?} from {:?} using template {:?}",
        settings.title, settings.source, settings.template
    );

    slidedown::bootstrap_output(&settings).context("Failed to prepare the output directory")?;

    // Baseline and watch must exist before the working state is loaded
    let tracked = slidedown::TrackedFiles::capture(&settings);
    let stream = slidedown::ChangeStream::watch(&tracked.watch_dirs())
        .context("Failed to watch slide sources")?;

    let assembler = slidedown::Assembler::new(settings).context("Failed to load slide sources")?;
    assembler.regenerate_all().context("Initial build failed")?;

    let settings = assembler.settings();
    let _server = slidedown::AssetServer::bind(settings.output_root.clone(), settings.port)
        .context("Failed to start the HTTP server")?
        .spawn();

    let mut dispatcher = slidedown::WatchDispatcher::with_tracked(assembler, tracked);
    println!("Watching for changes (Press Ctrl+C to stop)");
    dispatcher.run(stream.iter());

    Ok(())
}

fn main() {
    let _ = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
