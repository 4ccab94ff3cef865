use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use parking_garage::domain::garage::coordinator::ParkingCoordinator;
use parking_garage::domain::simulator::simulator::{SharedSimulator, Simulator};
use parking_garage::domain::traffic::TrafficGenerator;
use parking_garage::domain::utils::statistics::StatsCollector;
use parking_garage::shell::{self, Shell};
use parking_garage::{load_config, load_events, logger, run_events};

#[derive(Parser, Debug)]
#[command(name = "parking_garage", version, about = "Single-gate stack garage with a FIFO waiting lane")]
struct Cli {
    /// Garage configuration (JSON). Defaults to ten spaces at 5.00 per hour.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive command shell on stdin.
    Shell {
        /// Start the shell clock at this epoch second instead of the wall clock.
        #[arg(long)]
        start: Option<i64>,
    },

    /// Runs a CSV event script (`action,plate,category,time`).
    Replay {
        events: PathBuf,

        /// Write one statistics row per event to this file.
        #[arg(long)]
        stats: Option<PathBuf>,
    },

    /// Plays the course data set.
    Demo,

    /// Generates and runs random traffic.
    Simulate {
        #[arg(short, long, default_value_t = 100)]
        events: usize,

        #[arg(long)]
        seed: Option<u64>,

        /// Write statistics rows to this file instead of stdout.
        #[arg(long)]
        stats: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init();

    let config = load_config(cli.config.as_ref()).context("could not load the garage configuration")?;

    match cli.command {
        Commands::Shell { start } => {
            let clock = match start {
                Some(start) => Simulator::simulated(start),
                None => Simulator::wall_clock(),
            };
            let mut shell = Shell::new(config, SharedSimulator(Arc::new(clock)));
            shell.run(io::stdin().lock(), &mut io::stdout().lock())?;
        }
        Commands::Replay { events, stats } => {
            let events = load_events(&events).with_context(|| format!("could not read events from '{}'", events.display()))?;
            let mut coordinator = ParkingCoordinator::new(config);
            let mut collector = stats.map(|path| StatsCollector::init(Some(path))).transpose()?;

            let outcomes = run_events(&mut coordinator, &events, collector.as_mut())?;
            for (event, outcome) in events.iter().zip(outcomes.iter()) {
                println!("{}", shell::render_outcome(event, outcome));
            }
            print!("{}", coordinator.report());
        }
        Commands::Demo => {
            let mut coordinator = ParkingCoordinator::new(config);
            shell::run_demo(&mut coordinator, &mut io::stdout().lock())?;
        }
        Commands::Simulate { events, seed, stats } => {
            let mut generator = TrafficGenerator::new(seed, 0);
            let traffic = generator.generate(events);
            let mut coordinator = ParkingCoordinator::new(config);
            let mut collector = StatsCollector::init(stats)?;

            run_events(&mut coordinator, &traffic, Some(&mut collector))?;
            log::info!("Simulation with seed {} wrote {} statistics rows.", generator.seed(), collector.events_written());
            eprint!("{}", coordinator.status());
            eprintln!();
        }
    }

    Ok(())
}
