// main.rs - Command-line front end for the Game of Life engine
//
// Commands:
// - run:  evolve `<images>/<w>x<h>.pgm` for N turns into `<out>/<w>x<h>x<turns>.pgm`
// - seed: write an initial image from a named pattern or a random fill

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gol::patterns::{self, apply_pattern, apply_random_pattern};
use gol::{Cell, EngineConfig, Event, Grid, GridStore, Params, PgmStore};

#[derive(Parser)]
#[command(name = "gol")]
#[command(version)]
#[command(about = "Parallel Game of Life on a toroidal grid")]
struct Cli {
    /// Directory holding input images
    #[arg(long, env = "GOL_IMAGES", default_value = "images", global = true)]
    images: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation
    Run {
        /// Grid width
        #[arg(long = "width", short = 'w', env = "GOL_WIDTH", default_value = "512")]
        width: usize,

        /// Grid height
        #[arg(long = "height", env = "GOL_HEIGHT", default_value = "512")]
        height: usize,

        /// Number of turns to compute
        #[arg(long, short = 't', env = "GOL_TURNS", default_value = "100")]
        turns: usize,

        /// Number of worker tasks
        #[arg(long, short = 'n', env = "GOL_THREADS", default_value = "8")]
        threads: usize,

        /// Directory for the final image
        #[arg(long, env = "GOL_OUT", default_value = "out")]
        out: PathBuf,

        /// Milliseconds between alive-cell reports
        #[arg(long, default_value = "2000")]
        interval_ms: u64,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Write an initial image
    Seed {
        /// Grid width
        #[arg(long = "width", short = 'w', default_value = "16")]
        width: usize,

        /// Grid height
        #[arg(long = "height", default_value = "16")]
        height: usize,

        /// Pattern name (glider, blinker, block, toad, beacon, pulsar, gosper-glider-gun)
        #[arg(long, conflicts_with = "random")]
        pattern: Option<String>,

        /// Top-left corner of the pattern as X,Y
        #[arg(long, value_delimiter = ',', default_values_t = [0usize, 0])]
        at: Vec<usize>,

        /// Seed for a random fill
        #[arg(long)]
        random: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { width, height, turns, threads, out, interval_ms, json } => {
            let params = Params { image_width: width, image_height: height, turns, threads };
            let config = EngineConfig { report_interval: Duration::from_millis(interval_ms) };
            run(params, config, PgmStore::new(cli.images, out), json).await
        }
        Commands::Seed { width, height, pattern, at, random } => {
            seed(cli.images, width, height, pattern.as_deref(), &at, random)
        }
    }
}

async fn run(params: Params, config: EngineConfig, store: PgmStore, json: bool) -> Result<()> {
    params.validate().context("invalid run parameters")?;
    let (tx, mut rx) = mpsc::channel(256);

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!("unprintable event: {e}"),
                }
            } else if !matches!(event, Event::TurnComplete { .. }) {
                println!("Completed Turns {:<8} {event}", event.completed_turns());
            }
        }
    });

    let (grid, store) = gol::run(params, config, store, tx)
        .await
        .with_context(|| format!("run {} failed", params.output_name()))?;
    printer.await.context("event printer panicked")?;

    info!(
        path = %store.output_path(&params.output_name()).display(),
        alive = grid.count_alive(),
        "final image written"
    );
    Ok(())
}

fn seed(
    images  : PathBuf,
    width   : usize,
    height  : usize,
    pattern : Option<&str>,
    at      : &[usize],
    random  : Option<u64>,
) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("grid must be at least 1x1");
    }
    let mut grid = Grid::new(width, height);

    match (pattern, random) {
        (Some(name), _) => {
            let Some(pattern) = patterns::find(name) else {
                let known: Vec<_> = patterns::PATTERNS.iter().map(|p| p.name).collect();
                bail!("unknown pattern {name:?}, expected one of: {}", known.join(", "));
            };
            let corner = Cell::new(at.first().copied().unwrap_or(0), at.get(1).copied().unwrap_or(0));
            apply_pattern(&mut grid, pattern, corner);
        }
        (None, Some(seed_value)) => apply_random_pattern(&mut grid, seed_value),
        (None, None) => bail!("pass --pattern NAME or --random SEED"),
    }

    let name = format!("{width}x{height}");
    let mut store = PgmStore::new(images.clone(), images);
    // Seeds are inputs, so they are written next to the other input images
    store.save(&name, width, height, grid.as_bytes()).context("writing seed image")?;
    info!(path = %store.input_path(&name).display(), alive = grid.count_alive(), "seed written");
    Ok(())
}
