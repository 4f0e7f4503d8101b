//! Climops - merge and regrid synthetic climate datasets from the command line.

mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use climops::regrid::{GridArea, RegridOptions};
use climops::synthetic::{experiment, global_grid, time_axis};
use climops::{Config, Dataset, ExperimentMerger, Regridder};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "climops")]
#[command(about = "Merge and conservatively regrid climate-model datasets", long_about = None)]
struct Args {
    /// Enable logging to specified file
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge two synthetic monthly experiments
    Merge {
        /// Time steps in the first experiment
        #[arg(long, default_value_t = 12)]
        left_steps: usize,
        /// Time steps in the second experiment
        #[arg(long, default_value_t = 12)]
        right_steps: usize,
        /// Distance between the last stamp of the first and the first stamp of the second
        #[arg(long, default_value_t = 1.0)]
        gap: f64,
        /// Name of the first experiment
        #[arg(long, default_value = "historical")]
        left_experiment: String,
        /// Name of the second experiment
        #[arg(long, default_value = "rcp85")]
        right_experiment: String,
        /// Grid as NLONxNLAT
        #[arg(long, default_value = "8x4", value_parser = parse_grid_size)]
        grid: (usize, usize),
        /// Store values in long-form tables instead of dense arrays
        #[arg(long)]
        tabular: bool,
        /// Pass the later experiment first
        #[arg(long)]
        swap: bool,
    },
    /// Regrid a synthetic global temperature field
    Regrid {
        /// Source grid as NLONxNLAT
        #[arg(long, default_value = "36x18", value_parser = parse_grid_size)]
        src: (usize, usize),
        /// Destination grid as NLONxNLAT
        #[arg(long, default_value = "24x12", value_parser = parse_grid_size)]
        dst: (usize, usize),
        /// Time steps to regrid
        #[arg(long, default_value_t = 3)]
        steps: usize,
        /// Store values in long-form tables instead of dense arrays
        #[arg(long)]
        tabular: bool,
    },
}

fn parse_grid_size(s: &str) -> std::result::Result<(usize, usize), String> {
    let (nlon, nlat) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected NLONxNLAT, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 2)
            .ok_or_else(|| format!("grid size must be an integer >= 2, got '{}'", v))
    };
    Ok((parse(nlon)?, parse(nlat)?))
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose, args.log.as_deref())?;
    tracing::debug!("starting climops");

    let config = Config::default().with_verbose(args.verbose > 0);
    match args.command {
        Command::Merge {
            left_steps,
            right_steps,
            gap,
            left_experiment,
            right_experiment,
            grid,
            tabular,
            swap,
        } => {
            let left_time = time_axis(0.0, 1.0, left_steps);
            let start = left_time.last().copied().unwrap_or(-1.0) + gap;
            let left = experiment(global_grid(grid.0, grid.1), &left_experiment, left_time, tabular);
            let right = experiment(
                global_grid(grid.0, grid.1),
                &right_experiment,
                time_axis(start, 1.0, right_steps),
                tabular,
            );
            let merger = ExperimentMerger::new(config.merge);
            let outcome = if swap {
                merger.merge(&right, &left)?
            } else {
                merger.merge(&left, &right)?
            };
            for diagnostic in &outcome.diagnostics {
                eprintln!("warning: {}", diagnostic);
            }
            print_summary(&outcome.value);
        }
        Command::Regrid {
            src,
            dst,
            steps,
            tabular,
        } => {
            let source = experiment(global_grid(src.0, src.1), "historical", time_axis(0.0, 1.0, steps), tabular);
            let target = global_grid(dst.0, dst.1);
            let area = GridArea::from_config(&config.regrid);
            let src_area = area.compute(&source.grid)?;
            let dst_area = area.compute(&target)?;

            let regridder = Regridder::new(config.regrid);
            let result = regridder.regrid(
                &source,
                &target,
                RegridOptions {
                    src_area: Some(&src_area),
                    dst_area: Some(&dst_area),
                    projection: None,
                },
            )?;

            println!("source grid: {}x{}", src.0, src.1);
            println!("destination grid: {}x{}", dst.0, dst.1);
            for t in 0..steps {
                let before = source.values.weighted_sum(&src_area, 0, t)?;
                let after = result.values.weighted_sum(&dst_area, 0, t)?;
                println!(
                    "step {}: source total {:.6e}, destination total {:.6e}, {}",
                    t,
                    before,
                    after,
                    describe_error(before, after)
                );
            }
            print_summary(&result);
        }
    }

    tracing::debug!("climops finished");
    Ok(())
}

/// Relative conservation error, or the absolute one when the source total is 0.
fn describe_error(before: f64, after: f64) -> String {
    if before == 0.0 {
        format!("absolute error {:.3e}", (after - before).abs())
    } else {
        format!("relative error {:.3e}", ((after - before) / before).abs())
    }
}

fn print_summary(ds: &Dataset) {
    let (nlon, nlat) = ds.grid.shape();
    println!("experiment: {}", ds.experiment);
    println!("variable: {} [{}]", ds.variable, ds.value_unit);
    println!("grid: {}x{}", nlon, nlat);
    match ds.time_range() {
        Some((first, last)) => println!("time steps: {} ({} .. {})", ds.time.len(), first, last),
        None => println!("time steps: 0"),
    }
    println!("files: {}", ds.files.join(", "));
    println!("provenance:");
    for entry in &ds.provenance {
        println!("  - {}", entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_source_total_reports_absolute_error() {
        assert_eq!(describe_error(0.0, 0.0), "absolute error 0.000e0");
        assert_eq!(describe_error(2.0, 3.0), "relative error 5.000e-1");
    }

    #[test]
    fn grid_size_parsing() {
        assert_eq!(parse_grid_size("36x18"), Ok((36, 18)));
        assert!(parse_grid_size("1x4").is_err());
        assert!(parse_grid_size("36").is_err());
    }
}
