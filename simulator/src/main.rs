use anyhow::Context;
use clap::Parser;
use parlor_execution::{Arcade, Config, Headless, Journal};
use parlor_simulator::{Driver, Flow};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::{path::PathBuf, str::FromStr};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{sleep_until, Duration, Instant},
};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration; built-in tables are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where the coin balance is kept between runs.
    #[arg(short, long, default_value = "parlor.journal")]
    store: PathBuf,

    /// Overrides the configured log level.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Seed for reproducible rounds.
    #[arg(long)]
    seed: Option<u64>,
}

fn print(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let level = match &args.log_level {
        Some(level) => Level::from_str(level).context("invalid log level")?,
        None => config.log_level()?,
    };

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Open balance
    let store = Journal::open(&args.store)
        .with_context(|| format!("failed to open store {}", args.store.display()))?;

    // Create arcade
    let mut seed = [0u8; 32];
    match args.seed {
        Some(value) => StdRng::seed_from_u64(value).fill_bytes(&mut seed),
        None => rand::thread_rng().fill_bytes(&mut seed),
    }
    let default_game = config.default_game;
    let mut arcade = Arcade::new(config, store, Headless, seed);
    for (game, err) in arcade.register_all() {
        warn!(game = %game, error = %err, "game disabled");
    }
    if let Err(err) = arcade.switch_to(default_game) {
        warn!(game = %default_game, error = %err, "failed to mount default game");
    }
    let mut driver = Driver::new(arcade);
    info!(store = %args.store.display(), "arcade ready");
    println!("type `help` for commands");
    print(driver.drain());

    // Drive the scheduler in real time
    let started = Instant::now();
    let elapsed = || started.elapsed().as_millis() as u64;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = driver
            .next_deadline()
            .map(|due| started + Duration::from_millis(due));
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    // Input closed; let running rounds finish.
                    print(driver.finish()?);
                    break;
                };
                print(driver.advance_to(elapsed())?);
                let (flow, output) = driver.handle_line(&line);
                print(output);
                if flow == Flow::Quit {
                    break;
                }
            }
            _ = async {
                match deadline {
                    Some(deadline) => sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            } => {
                print(driver.advance_to(elapsed())?);
            }
        }
    }

    info!(balance = driver.arcade().balance(), "exiting");
    Ok(())
}
