mod config;

use anyhow::Context;
use clap::Parser;
use config::SimulationConfig;
use event_sampler::MapDatasetEventSampler;
use gammasim_common::MC_ID_BACKGROUND;
use itertools::Itertools;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Path to the simulation configuration JSON file
    config: PathBuf,

    /// Overrides the seed declared in the configuration
    #[clap(long)]
    seed: Option<u64>,

    /// Prints the sampled event list as JSON on stdout
    #[clap(long)]
    dump_events: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    let config: SimulationConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", cli.config.display()))?;

    let seed = cli.seed.unwrap_or(config.seed);
    let (dataset, observation) = config.build()?;

    let mut sampler = MapDatasetEventSampler::new(seed);
    let events = sampler.run(&dataset, &observation)?;

    let per_model = events.table.mc_id.iter().copied().counts();
    let background = per_model.get(&MC_ID_BACKGROUND).copied().unwrap_or(0);
    info!(
        seed,
        events = events.table.len() as u64,
        background = background as u64,
        sources = (events.table.len() - background) as u64,
        "sampling finished"
    );
    for (mc_id, count) in per_model.into_iter().sorted() {
        info!(mc_id, count = count as u64, "component yield");
    }

    if cli.dump_events {
        println!("{}", serde_json::to_string_pretty(&events)?);
    }
    Ok(())
}
