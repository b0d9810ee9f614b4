//! rxngraph-inspect - look inside a packed reaction dataset
//!
//! Loads one dataset split and prints per-slot statistics, optionally the
//! layout of a single example. With `--synthetic N` it instead writes a
//! synthetic split of N examples where the loader would look for it.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rxngraph::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "rxngraph-inspect", version, about = "Inspect packed reaction graph datasets")]
struct Args {
    /// Directory holding the dataset artifacts
    #[arg(long, default_value = "./data")]
    root: std::path::PathBuf,

    /// Artifact file extension (empty for none)
    #[arg(long, default_value = "safetensors")]
    extension: String,

    /// Dataset id: 1 or 2 for production data, 3 for the held-out test set
    #[arg(short, long, default_value_t = 1)]
    dataset: u32,

    /// Split number
    #[arg(short, long, default_value_t = 0)]
    split: u32,

    /// Print the layout of this example
    #[arg(short, long)]
    index: Option<i64>,

    /// Write a synthetic split with this many examples instead of reading one
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,

    /// Seed for --synthetic
    #[arg(long)]
    seed: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")
}

fn write_synthetic(args: &Args, id: DatasetId, examples: usize) -> Result<()> {
    let config = DataConfig::default()
        .root(&args.root)
        .extension(&args.extension);
    let mut synth = SyntheticConfig::default().examples(examples);
    if let Some(seed) = args.seed {
        synth = synth.seed(seed);
    }

    let ds = synthetic_dataset(&synth)?;
    std::fs::create_dir_all(&config.root)
        .with_context(|| format!("creating {}", config.root.display()))?;
    let path = config.resolver().path_for(&id.artifact_name(args.split));
    ds.to_artifact()?.save(&path)?;
    info!(path = %path.display(), examples, "wrote synthetic dataset");
    Ok(())
}

fn run(args: Args) -> Result<()> {
    setup_logging(args.verbose, args.quiet)?;
    let id = DatasetId::from_code(args.dataset)?;

    if let Some(examples) = args.synthetic {
        return write_synthetic(&args, id, examples);
    }

    let config = DataConfig::default()
        .root(&args.root)
        .extension(&args.extension);
    let ds = ReactionDataset::load(&config.resolver(), id, args.split)
        .with_context(|| format!("loading {id} split {}", args.split))?;

    print!("{}", DatasetSummary::from_dataset(&ds));

    if let Some(index) = args.index {
        let sample = ds.get_signed(index)?;
        println!("\nexample {index}");
        if let Some(rsmi) = usize::try_from(index).ok().and_then(|i| ds.rsmi(i)) {
            println!("rsmi         {rsmi}");
        }
        print!("{}", describe_sample(&sample));
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
