mod app;
mod braille;
mod colors;
mod config;
mod globe;
mod help;
mod logging;
mod node;
mod settings;
mod snapshot;
mod surface;
mod terminal;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{GlobeConfig, Overrides};
use node::{NodeFilter, NodeKind};
use rand::prelude::*;
use settings::Settings;
use std::io;
use std::path::PathBuf;
use terminal::Terminal;

#[derive(Parser)]
#[command(name = "civiglobe")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "civiglobe: rotating terminal globe of need/help reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Need,
    Help,
}

impl From<KindArg> for NodeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Need => NodeKind::Need,
            KindArg::Help => NodeKind::Help,
        }
    }
}

/// Options shared by every subcommand
#[derive(Args)]
struct NodeArgs {
    /// JSON file of reports (defaults to the built-in sample set)
    #[arg(short, long)]
    nodes: Option<PathBuf>,

    /// Device pixels per logical pixel
    #[arg(long)]
    density: Option<f32>,

    /// Only show needs or only help offers
    #[arg(short, long, value_enum)]
    kind: Option<KindArg>,

    /// Only show one category (exact match)
    #[arg(short, long)]
    category: Option<String>,

    /// Hide reports below this urgency (0-100)
    #[arg(short = 'u', long)]
    min_urgency: Option<u8>,
}

impl NodeArgs {
    fn overrides(self) -> Overrides {
        Overrides {
            nodes: self.nodes,
            density: self.density,
            filter: NodeFilter {
                kind: self.kind.map(NodeKind::from),
                category: self.category,
                min_urgency: self.min_urgency,
            },
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive globe (hover and click reports with the mouse)
    Run {
        #[command(flatten)]
        nodes: NodeArgs,

        /// Seconds per frame
        #[arg(short, long)]
        time: Option<f32>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Append logs to this file
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Render frames off-screen and print the last one with ANSI colors
    Snapshot {
        #[command(flatten)]
        nodes: NodeArgs,

        /// Width in terminal cells
        #[arg(short = 'W', long, default_value = "80")]
        width: u16,

        /// Height in terminal cells
        #[arg(short = 'H', long, default_value = "24")]
        height: u16,

        /// Frames to render before printing
        #[arg(short, long, default_value = "1")]
        frames: u32,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print projected screen positions for each report
    Project {
        #[command(flatten)]
        nodes: NodeArgs,

        /// Globe rotation in radians
        #[arg(short, long, default_value = "0")]
        rotation: f32,

        /// Width in terminal cells
        #[arg(short = 'W', long, default_value = "80")]
        width: u16,

        /// Height in terminal cells
        #[arg(short = 'H', long, default_value = "24")]
        height: u16,
    },
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::Run { nodes, time, seed, log } => {
            let overrides = Overrides {
                time_step: time,
                seed,
                log_file: log,
                ..nodes.overrides()
            };
            let config = GlobeConfig::resolve(&settings.globe, overrides);
            logging::init_file(config.log_file.as_deref())?;

            let mut rng = make_rng(config.seed);
            let mut term = Terminal::new(true)?;
            app::run(&mut term, &config, &mut rng)?;
        }
        Commands::Snapshot { nodes, width, height, frames, seed } => {
            logging::init_stderr();
            let overrides = Overrides { seed, ..nodes.overrides() };
            let config = GlobeConfig::resolve(&settings.globe, overrides);
            let mut rng = make_rng(config.seed);
            snapshot::snapshot(&config, width, height, frames, app::now_ms(), &mut rng)?;
        }
        Commands::Project { nodes, rotation, width, height } => {
            logging::init_stderr();
            let config = GlobeConfig::resolve(&settings.globe, nodes.overrides());
            snapshot::project_nodes(&config, width, height, rotation)?;
        }
    }

    Ok(())
}
