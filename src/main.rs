mod config;
mod error;
mod logging;
mod progress;
mod scanner;
mod sink;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use indicatif::MultiProgress;
use tracing::{debug, error, info, warn};

use config::{Config, OutputFormat};
use error::Error;
use scanner::{event_loop, AddressList, Dispatcher, DnsLookupResolver, LoopExit, Subnet};

#[derive(Parser)]
#[command(name = "cidr-rdns")]
#[command(about = "Reverse-resolve every address in a CIDR block")]
#[command(version)]
struct Cli {
    /// CIDR block to resolve (e.g., 127.0.0.0/24)
    cidr: String,

    /// File to append results to
    output: PathBuf,

    /// Maximum lookups in flight at once
    #[arg(
        short,
        long,
        default_value_t = scanner::DEFAULT_WINDOW as u32,
        value_parser = clap::value_parser!(u32).range(1..=4096)
    )]
    window: u32,

    /// Output line format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Hide the progress line
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let console = progress::console();
    logging::init(cli.verbose, console.clone());

    let config = Config {
        window: cli.window as usize,
        format: cli.format,
        show_progress: !cli.quiet,
        ..Config::default()
    };

    info!("CIDR Reverse DNS");
    debug!(window = config.window, format = %config.format, "configured");
    run(&cli.cidr, &cli.output, &config, &console).await
}

async fn run(cidr: &str, output: &Path, config: &Config, console: &MultiProgress) -> Result<()> {
    let mut resolver =
        DnsLookupResolver::new(config.poll_interval).context("could not start resolver")?;

    let subnet = Subnet::parse(cidr)
        .map_err(Error::from)
        .with_context(|| format!("invalid range {cidr:?}"))?;

    debug!(
        prefix = subnet.prefix(),
        mask = %subnet.mask(),
        "computed {subnet}"
    );

    if subnet.total() > config.max_addresses {
        return Err(Error::RangeTooLarge {
            total: subnet.total(),
            limit: config.max_addresses,
        }
        .into());
    }

    let (start, end) = subnet.bounds();
    let mut dispatcher = Dispatcher::new(AddressList::build(start, end), config.window);
    dispatcher.submit_initial_window(&mut resolver);

    info!(
        "Resolving {} to {} ({})",
        subnet.start(),
        subnet.end(),
        subnet.total()
    );
    info!("Starting...");

    let progress = progress::status_line(console, subnet.total(), config.show_progress);
    let exit = event_loop::run(&mut dispatcher, &mut resolver, &progress, shutdown_signal()).await;
    // Leave the count as reached; an interrupted run must not show the full total
    progress.abandon();
    drop(resolver);

    match exit {
        LoopExit::Drained => info!("Finished..."),
        LoopExit::Interrupted { cancelled } => {
            warn!("Stopped early, {cancelled} lookups abandoned")
        }
    }

    match sink::dump(dispatcher.list(), output, config.format) {
        Ok(written) => info!("Wrote {written} entries to {}", output.display()),
        Err(e) => error!("{e}"),
    }

    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
