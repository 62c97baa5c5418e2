//! Export investor payout schedules and a resident cost ledger as CSV
//!
//! Writes one `schedule_<tier>.csv` per share class and `resident_ledger.csv`
//! into the output directory, for the document exporter.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

use retirement_projection::resident::ResidentRequest;
use retirement_projection::units::to_lakh;
use retirement_projection::{Assumptions, InvestorInput, ScenarioRunner, ShareClass};

#[derive(Parser, Debug)]
#[command(name = "export_schedules", about = "Write schedules and ledgers as CSV")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "output")]
    out: PathBuf,

    /// Directory of assumption CSVs; the compiled table is used if omitted
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Shares per tier schedule
    #[arg(long, default_value_t = 1)]
    shares: u32,

    #[arg(long, default_value = "1bhk")]
    unit: String,
    #[arg(long, default_value_t = 2)]
    residents: u32,
    #[arg(long, default_value_t = 1)]
    cars: u32,
    #[arg(long, default_value_t = 5)]
    stay: u32,
}

#[derive(Serialize)]
struct ScheduleCsvRow {
    year: u32,
    dividend: f64,
    interest: f64,
    capital_return: f64,
    surplus_share: f64,
    total: f64,
    total_lakh: f64,
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let assumptions = match &args.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir)?,
        None => Assumptions::ca_reviewed(),
    };
    let runner = ScenarioRunner::new(assumptions)?;

    fs::create_dir_all(&args.out).with_context(|| format!("creating {}", args.out.display()))?;

    for class in ShareClass::ALL {
        let horizon = runner.assumptions().tiers.get(class)?.horizon_years;
        let projection = runner.investor(&InvestorInput::new(class, args.shares, horizon))?;

        let path = args.out.join(format!("schedule_{}.csv", class.as_str().to_ascii_lowercase()));
        let rows = projection.schedule.rows().map(|r| ScheduleCsvRow {
            year: r.year,
            dividend: r.dividend,
            interest: r.interest,
            capital_return: r.capital_return,
            surplus_share: r.surplus_share,
            total: r.total,
            total_lakh: to_lakh(r.total),
        });
        let count = write_rows(&path, rows)?;
        info!("Wrote {} rows to {}", count, path.display());
    }

    let request = ResidentRequest {
        unit_id: args.unit,
        residents: args.residents,
        cars: args.cars,
        stay_years: args.stay,
    };
    let calc = runner.resident(&request)?;
    let path = args.out.join("resident_ledger.csv");
    let count = write_rows(&path, &calc.ledger)?;
    info!("Wrote {} rows to {}", count, path.display());

    println!("Exported schedules to {}", args.out.display());
    Ok(())
}
