use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use curve_prep::data::loader;
use curve_prep::{
    clean_curves, clean_curves_together, combinations, filter_by_group_definitions,
    AlignedDatasets, CleaningConfig, Label,
};

/// Clean learning-curve datasets before analysis.
#[derive(Parser)]
#[command(name = "curve-prep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean one curve file.
    Clean {
        input: PathBuf,
        #[command(flatten)]
        opts: CleanOpts,
    },

    /// Clean train / validation / test files together; a sample is kept only
    /// if its curve is valid in all three.
    CleanJoint {
        train: PathBuf,
        valid: PathBuf,
        test: PathBuf,
        #[command(flatten)]
        opts: CleanOpts,
    },

    /// Map learner labels onto groups, dropping ungrouped samples.
    Group {
        input: PathBuf,
        /// JSON object: label → learner name.
        #[arg(long)]
        registry: PathBuf,
        /// JSON object: group → list of learner names.
        #[arg(long)]
        groups: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List index combinations of 0..n.
    Pairs {
        n: usize,
        #[arg(short, long, default_value_t = 2)]
        r: usize,
    },
}

#[derive(Args)]
struct CleanOpts {
    /// JSON cleaning config; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    min_length: Option<i64>,
    #[arg(long)]
    remove_flat: bool,
    /// Only keep these labels; repeat the flag or separate with commas.
    #[arg(long, action = ArgAction::Append, value_delimiter = ',')]
    include: Vec<Label>,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl CleanOpts {
    fn config(&self) -> Result<CleaningConfig<Label>> {
        let mut cfg = match &self.config {
            Some(path) => CleaningConfig::from_json_file(path)?,
            None => CleaningConfig::default(),
        };
        if let Some(min) = self.min_length {
            cfg.minimum_length = min;
        }
        if self.remove_flat {
            cfg.remove_flat = true;
        }
        if !self.include.is_empty() {
            cfg = cfg.with_included_labels(self.include.iter().cloned());
        }
        Ok(cfg)
    }
}

fn emit<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            loader::write_json(path, value)?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(value).context("serializing result")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Clean { input, opts } => {
            let cfg = opts.config()?;
            let data = loader::load_file(&input)?;
            let cleaned = clean_curves(&data.curves, &data.labels, &cfg)?;
            log::info!("Kept {} of {} curves", cleaned.len(), data.len());
            emit(opts.output.as_deref(), &cleaned)
        }
        Command::CleanJoint {
            train,
            valid,
            test,
            opts,
        } => {
            let cfg = opts.config()?;
            let data = AlignedDatasets::from_datasets(
                loader::load_file(&train)?,
                loader::load_file(&valid)?,
                loader::load_file(&test)?,
            )?;
            let cleaned = clean_curves_together(&data, &cfg)?;
            log::info!("Kept {} of {} aligned samples", cleaned.len(), data.len());
            emit(opts.output.as_deref(), &cleaned)
        }
        Command::Group {
            input,
            registry,
            groups,
            output,
        } => {
            let data = loader::load_file(&input)?;
            let registry = loader::load_registry(&registry)?;
            let groups = loader::load_group_definitions(&groups)?;
            let grouped = filter_by_group_definitions(
                Some(data.curves.as_slice()),
                &data.labels,
                &groups,
                &registry,
            )?;
            log::info!(
                "{} of {} samples belong to a group",
                grouped.labels.len(),
                data.len()
            );
            emit(output.as_deref(), &grouped)
        }
        Command::Pairs { n, r } => {
            let all: Vec<Vec<usize>> = combinations(n, r).collect();
            emit(None, &all)
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
