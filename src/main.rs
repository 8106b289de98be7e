//! Index Projection CLI
//!
//! Projects the index to the horizon from a baseline table and a set of
//! per-sector assumptions, printing sector contributions and headline figures.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use index_projection::{
    assumptions::loader::load_assumptions,
    baseline::loader::{load_baseline_from_csv, WeightHandling},
    baseline::{REFERENCE_BASE_PRICE, REFERENCE_MULTIPLE},
    projection::{writer::write_projection_csv, REFERENCE_HORIZON_PERIODS},
    load_baseline, AssumptionSet, Baseline, ProjectionConfig, ProjectionEngine,
};

#[derive(Parser, Debug)]
#[command(name = "index_projection")]
#[command(about = "Sector-weighted forward projection of index price, earnings, and P/E")]
struct Cli {
    /// Baseline table (Sector,Weight,CurrentPE); built-in reference table if omitted
    #[arg(long, value_name = "CSV")]
    baseline: Option<PathBuf>,

    /// Index level on the baseline date
    #[arg(long, default_value_t = REFERENCE_BASE_PRICE)]
    base_price: f64,

    /// Blended P/E used to back out index earnings from the base price
    #[arg(long, default_value_t = REFERENCE_MULTIPLE)]
    reference_multiple: f64,

    /// Rescale baseline weights that do not sum to 1.0
    #[arg(long)]
    normalize_weights: bool,

    /// Number of annual compounding periods
    #[arg(long, default_value_t = REFERENCE_HORIZON_PERIODS)]
    horizon: u32,

    /// Per-sector assumptions (Sector,AnnualGrowth,TargetPE)
    #[arg(long, value_name = "CSV", conflicts_with_all = ["global_growth", "global_pe"])]
    assumptions: Option<PathBuf>,

    /// Annual growth in percent applied to every sector
    #[arg(long, allow_hyphen_values = true, requires = "global_pe")]
    global_growth: Option<f64>,

    /// Target P/E applied to every sector
    #[arg(long, requires = "global_growth")]
    global_pe: Option<f64>,

    /// Annual growth in percent for every sector, each keeping its current P/E
    #[arg(
        long,
        default_value_t = 8.0,
        allow_hyphen_values = true,
        conflicts_with_all = ["assumptions", "global_growth", "global_pe"]
    )]
    growth: f64,

    /// Per-sector override, e.g. "Info Tech=12:29" (growth percent : target P/E)
    #[arg(long = "set", value_name = "SECTOR=GROWTH:PE", value_parser = parse_override)]
    overrides: Vec<(String, f64, f64)>,

    /// Write per-sector contributions to CSV
    #[arg(long, value_name = "CSV")]
    output: Option<PathBuf>,

    /// Print the full result as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_override(s: &str) -> Result<(String, f64, f64), String> {
    let (sector, values) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected SECTOR=GROWTH:PE, got {s:?}"))?;
    let (growth, pe) = values
        .split_once(':')
        .ok_or_else(|| format!("expected GROWTH:PE after '=', got {values:?}"))?;
    let growth: f64 = growth.trim().parse().map_err(|e| format!("bad growth {growth:?}: {e}"))?;
    let pe: f64 = pe.trim().parse().map_err(|e| format!("bad P/E {pe:?}: {e}"))?;
    Ok((sector.trim().to_string(), growth / 100.0, pe))
}

fn build_baseline(cli: &Cli) -> anyhow::Result<Baseline> {
    match &cli.baseline {
        Some(path) => {
            let weights = if cli.normalize_weights {
                WeightHandling::Normalize
            } else {
                WeightHandling::Strict
            };
            load_baseline_from_csv(path, cli.base_price, cli.reference_multiple, weights)
                .with_context(|| format!("loading baseline from {}", path.display()))
        }
        None => {
            if cli.base_price != REFERENCE_BASE_PRICE || cli.reference_multiple != REFERENCE_MULTIPLE {
                let reference = load_baseline();
                let mut baseline = Baseline::new(cli.base_price, cli.reference_multiple, reference.records().to_vec())?;
                if let Some(date) = reference.as_of() {
                    baseline = baseline.with_as_of(date);
                }
                Ok(baseline)
            } else {
                Ok(load_baseline())
            }
        }
    }
}

fn build_assumptions(cli: &Cli, baseline: &Baseline) -> anyhow::Result<AssumptionSet> {
    let mut set = if let Some(path) = &cli.assumptions {
        load_assumptions(path).with_context(|| format!("loading assumptions from {}", path.display()))?
    } else if let (Some(growth), Some(pe)) = (cli.global_growth, cli.global_pe) {
        AssumptionSet::uniform(baseline, growth / 100.0, pe)
    } else {
        AssumptionSet::hold_multiples(baseline, cli.growth / 100.0)
    };

    for (sector, growth, pe) in &cli.overrides {
        if !baseline.contains(sector) {
            bail!("--set names unknown sector {sector:?}");
        }
        set = set.with_override(sector.as_str(), *growth, *pe);
    }

    Ok(set)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let baseline = build_baseline(&cli)?;
    let assumptions = build_assumptions(&cli, &baseline)?;
    log::info!(
        "Projecting {} sectors over {} periods",
        baseline.len(),
        cli.horizon
    );

    let engine = ProjectionEngine::new(ProjectionConfig {
        horizon_periods: cli.horizon,
    });
    let result = engine.project(&baseline, &assumptions)?;
    let summary = result.summary();

    if let Some(path) = &cli.output {
        write_projection_csv(&result, path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Sector contributions written to {}", path.display());
    }

    if cli.json {
        let body = serde_json::json!({ "result": result, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match (baseline.as_of(), result.horizon_date) {
        (Some(from), Some(to)) => println!("Forward projection {} -> {} ({} periods)", from, to, result.horizon_periods),
        _ => println!("Forward projection ({} periods)", result.horizon_periods),
    }
    println!("{}", "=".repeat(40));
    println!(
        "Base price {:.2}, reference P/E {:.1}x, base EPS {:.2}\n",
        baseline.base_index_price(),
        baseline.reference_multiple(),
        baseline.base_index_earnings()
    );

    println!(
        "{:<14} {:>8} {:>7} {:>7} {:>10} {:>10} {:>10} {:>10}",
        "Sector", "Growth", "PE", "Tgt PE", "Base EPS", "Proj EPS", "Spot Px", "Proj Px"
    );
    println!("{}", "-".repeat(83));

    for (row, record) in result.per_sector.iter().zip(baseline.records()) {
        let Some(assumption) = assumptions.get(&row.sector_id) else {
            continue;
        };
        println!(
            "{:<14} {:>7.1}% {:>7.1} {:>7.1} {:>10.2} {:>10.2} {:>10.1} {:>10.1}",
            row.sector_id,
            assumption.annual_growth_rate * 100.0,
            record.current_multiple,
            assumption.target_multiple,
            row.base_earnings_contribution,
            row.projected_earnings_contribution,
            row.spot_price_contribution,
            row.projected_price_contribution,
        );
    }

    println!("\nSummary:");
    println!(
        "  Implied Price: {:>10.0}  ({:+.1}% total, {:+.2}% annualized)",
        summary.projected_price,
        summary.price_change_pct,
        summary.annualized_price_return * 100.0
    );
    println!(
        "  Implied EPS:   {:>10.2}  ({:+.1}% total)",
        summary.projected_earnings, summary.earnings_change_pct
    );
    println!("  Implied P/E:   {:>10.1}x", summary.implied_multiple);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("Info Tech=12:29").unwrap(),
            ("Info Tech".to_string(), 0.12, 29.0)
        );
        assert_eq!(
            parse_override("Energy = -5 : 11.5").unwrap(),
            ("Energy".to_string(), -0.05, 11.5)
        );
        assert!(parse_override("Energy").is_err());
        assert!(parse_override("Energy=5").is_err());
        assert!(parse_override("Energy=x:11").is_err());
    }

    #[test]
    fn test_cli_defaults_hold_multiples() {
        let cli = Cli::parse_from(["index_projection"]);
        let baseline = build_baseline(&cli).unwrap();
        let set = build_assumptions(&cli, &baseline).unwrap();

        assert_eq!(baseline, load_baseline());
        let tech = set.get("Info Tech").unwrap();
        assert_eq!(tech.annual_growth_rate, 0.08);
        assert_eq!(tech.target_multiple, 31.0);
    }

    #[test]
    fn test_cli_global_with_override() {
        let cli = Cli::parse_from([
            "index_projection",
            "--global-growth",
            "-5",
            "--global-pe",
            "20",
            "--set",
            "Energy=3:12",
        ]);
        let baseline = build_baseline(&cli).unwrap();
        let set = build_assumptions(&cli, &baseline).unwrap();

        assert_eq!(set.get("Materials").unwrap().annual_growth_rate, -0.05);
        assert_eq!(set.get("Energy").unwrap().target_multiple, 12.0);
    }

    #[test]
    fn test_cli_growth_conflicts_with_other_sources() {
        let global = ["index_projection", "--growth", "5", "--global-growth", "5", "--global-pe", "20"];
        assert!(Cli::try_parse_from(global).is_err());

        let from_csv = ["index_projection", "--growth", "5", "--assumptions", "data/assumptions.csv"];
        assert!(Cli::try_parse_from(from_csv).is_err());

        let alone = Cli::try_parse_from(["index_projection", "--growth", "5"]).unwrap();
        assert_eq!(alone.growth, 5.0);
    }

    #[test]
    fn test_cli_rejects_unknown_override() {
        let cli = Cli::parse_from(["index_projection", "--set", "Crypto=40:80"]);
        let baseline = build_baseline(&cli).unwrap();
        assert!(build_assumptions(&cli, &baseline).is_err());
    }
}
