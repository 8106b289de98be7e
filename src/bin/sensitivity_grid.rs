//! Sweep uniform growth and target P/E over the reference baseline
//!
//! Outputs one CSV row per (growth, P/E) cell for heat-map style comparison

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use index_projection::projection::REFERENCE_HORIZON_PERIODS;
use index_projection::scenario::{default_growth_axis, default_multiple_axis, stepped_range};
use index_projection::ScenarioRunner;

#[derive(Parser, Debug)]
#[command(name = "sensitivity_grid")]
#[command(about = "Projected index price across a grid of uniform growth and P/E assumptions")]
struct Args {
    /// Number of annual compounding periods
    #[arg(long, default_value_t = REFERENCE_HORIZON_PERIODS)]
    horizon: u32,

    /// Growth axis as MIN:MAX:STEP in percent (default -10:30:1)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_axis)]
    growth: Option<(f64, f64, f64)>,

    /// P/E axis as MIN:MAX:STEP (default 10:35:0.5)
    #[arg(long, value_parser = parse_axis)]
    pe: Option<(f64, f64, f64)>,

    #[arg(long, default_value = "sensitivity_grid.csv")]
    output: PathBuf,
}

fn parse_axis(s: &str) -> Result<(f64, f64, f64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [min, max, step] = parts.as_slice() else {
        return Err(format!("expected MIN:MAX:STEP, got {s:?}"));
    };
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("bad number {v:?}: {e}"));
    Ok((parse(*min)?, parse(*max)?, parse(*step)?))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let runner = ScenarioRunner::new();

    let growth_axis = match args.growth {
        Some((min, max, step)) => stepped_range(min, max, step)
            .context("invalid --growth axis")?
            .into_iter()
            .map(|g| g / 100.0)
            .collect(),
        None => default_growth_axis(),
    };
    let pe_axis = match args.pe {
        Some((min, max, step)) => stepped_range(min, max, step).context("invalid --pe axis")?,
        None => default_multiple_axis(),
    };

    println!(
        "Running {} x {} grid over {} periods...",
        growth_axis.len(),
        pe_axis.len(),
        args.horizon
    );
    let grid = runner.sensitivity_grid(&growth_axis, &pe_axis, args.horizon)?;
    log::info!("Grid complete in {:?}", start.elapsed());

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["AnnualGrowth", "TargetPE", "ProjectedPrice", "ProjectedEPS", "PriceChangePct"])?;

    let base_price = runner.baseline().base_index_price();
    for point in &grid {
        writer.write_record([
            format!("{:.4}", point.annual_growth_rate),
            format!("{:.2}", point.target_multiple),
            format!("{:.2}", point.projected_price),
            format!("{:.4}", point.projected_earnings),
            format!("{:.2}", (point.projected_price / base_price - 1.0) * 100.0),
        ])?;
    }
    writer.flush()?;

    println!("Output written to {}", args.output.display());

    if let (Some(low), Some(high)) = (grid.first(), grid.last()) {
        println!("\nGrid Summary:");
        println!(
            "  Lowest:  growth {:+.1}%, P/E {:.1}x -> {:.0}",
            low.annual_growth_rate * 100.0,
            low.target_multiple,
            low.projected_price
        );
        println!(
            "  Highest: growth {:+.1}%, P/E {:.1}x -> {:.0}",
            high.annual_growth_rate * 100.0,
            high.target_multiple,
            high.projected_price
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
