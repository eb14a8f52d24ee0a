use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use bifurcation::{
    DiagramConfig, Duffing, Gauss, Henon, Logistic, Map, Setup, SimulationEngine,
    plot_bifurcation_diagram, viewer,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MapKind {
    Logistic,
    Gauss,
    Henon,
    Duffing,
}

#[derive(Debug, Parser)]
#[command(name = "bifurcation", about = "Bifurcation diagrams of discrete-time maps")]
struct Cli {
    #[arg(value_enum, default_value_t = MapKind::Gauss)]
    map: MapKind,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    iterations: Option<usize>,

    #[arg(long)]
    last_num: Option<usize>,

    /// Grid points per parameter
    #[arg(long)]
    resolution: Option<usize>,

    /// Animation frames per sweep
    #[arg(long)]
    frames: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DiagramConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DiagramConfig::default(),
    };
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(last_num) = cli.last_num {
        config.last_num = last_num;
    }
    if let Some(resolution) = cli.resolution {
        config.resolution = resolution;
    }
    if let Some(frames) = cli.frames {
        config.animation.frames = frames;
    }
    config.validate()?;

    println!("*** Bifurcation diagrams ***");

    let n = config.resolution;
    match cli.map {
        MapKind::Logistic => show(Logistic::preset(n)?, &config),
        MapKind::Gauss => show(Gauss::preset(n)?, &config),
        MapKind::Henon => show(Henon::preset(n)?, &config),
        MapKind::Duffing => show(Duffing::preset(n)?, &config),
    }
}

fn show<M: Map>(setup: Setup<M>, config: &DiagramConfig) -> Result<()> {
    let mut engine = SimulationEngine::from_setup(setup)?;
    info!(map = engine.name(), iterations = config.iterations, "simulating");
    let figure = plot_bifurcation_diagram(&mut engine, config)?;
    viewer::run(figure, &config.window)?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
