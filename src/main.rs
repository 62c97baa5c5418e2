//! Retirement Projection CLI
//!
//! Runs investor, pool, comparison, coverage and resident projections from the
//! command line. Every subcommand accepts --json for machine-readable output.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use retirement_projection::assumptions::Instrument;
use retirement_projection::resident::ResidentRequest;
use retirement_projection::scenario::CA_POOL;
use retirement_projection::units::{format_inr, format_inr_compact, format_percent, to_lakh};
use retirement_projection::{Assumptions, InvestorInput, RefundCoverageModel, RiskModel, ScenarioRunner, ShareClass};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliShareClass {
    Platinum,
    Gold,
    Silver,
}

impl From<CliShareClass> for ShareClass {
    fn from(value: CliShareClass) -> Self {
        match value {
            CliShareClass::Platinum => ShareClass::Platinum,
            CliShareClass::Gold => ShareClass::Gold,
            CliShareClass::Silver => ShareClass::Silver,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRiskModel {
    Aggressive,
    Moderate,
    Conservative,
}

impl From<CliRiskModel> for RiskModel {
    fn from(value: CliRiskModel) -> Self {
        match value {
            CliRiskModel::Aggressive => RiskModel::Aggressive,
            CliRiskModel::Moderate => RiskModel::Moderate,
            CliRiskModel::Conservative => RiskModel::Conservative,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "retirement_projection", version, about = "Investor and resident projections")]
struct Cli {
    /// Directory of assumption CSVs; the compiled CA-reviewed table is used if omitted
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Outcome and IRR for one investor position
    Investor {
        #[arg(long, value_enum, default_value_t = CliShareClass::Platinum)]
        tier: CliShareClass,
        #[arg(long, default_value_t = 1)]
        shares: u32,
        /// Also print the year-by-year payout schedule
        #[arg(long)]
        schedule: bool,
    },
    /// Totals for a pool of single-share positions
    Pool {
        #[arg(long, default_value_t = CA_POOL[0].1)]
        platinum: u32,
        #[arg(long, default_value_t = CA_POOL[1].1)]
        gold: u32,
        #[arg(long, default_value_t = CA_POOL[2].1)]
        silver: u32,
        #[arg(long, value_enum, default_value_t = CliRiskModel::Moderate)]
        risk: CliRiskModel,
    },
    /// Compounded comparison lines for the reference instruments
    Compare {
        #[arg(long, default_value_t = 3_000_000.0)]
        principal: f64,
        #[arg(long, default_value_t = 15)]
        horizon: u32,
        /// Conservative fund rate, e.g. 0.12
        #[arg(long)]
        conservative_rate: Option<f64>,
    },
    /// Refund coverage per allocation model
    Coverage {
        /// Limit to one model
        #[arg(long, value_enum)]
        risk: Option<CliRiskModel>,
        /// Shareholder capital for the shutdown scenario
        #[arg(long, default_value_t = 200_000_000.0)]
        capital: f64,
    },
    /// Cost of a resident stay net of the deposit refund
    Resident {
        #[arg(long, default_value = "1bhk")]
        unit: String,
        #[arg(long, default_value_t = 2)]
        residents: u32,
        #[arg(long, default_value_t = 1)]
        cars: u32,
        #[arg(long, default_value_t = 5)]
        stay: u32,
        /// Also print the cumulative cost ledger
        #[arg(long)]
        ledger: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_runner(path: Option<&PathBuf>) -> Result<ScenarioRunner> {
    let assumptions = match path {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => Assumptions::ca_reviewed(),
    };
    ScenarioRunner::new(assumptions).context("assumption table failed validation")
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let start = Instant::now();
    let runner = load_runner(cli.assumptions.as_ref())?;

    match cli.command {
        Command::Investor { tier, shares, schedule } => {
            let class = ShareClass::from(tier);
            let horizon = runner.assumptions().tiers.get(class)?.horizon_years;
            let projection = runner.investor(&InvestorInput::new(class, shares, horizon))?;

            if cli.json {
                return print_json(&projection);
            }

            let o = &projection.outcome;
            println!("{} x {} over {} years", o.share_class, o.number_of_shares, o.horizon_years);
            println!("  Invested:            {}", format_inr(o.total_invested));
            println!("  Dividends:           {}", format_inr(o.total_dividends));
            println!("  Interest:            {}", format_inr(o.total_interest));
            println!("  Cash in hand:        {}", format_inr(o.total_cash_in_hand_during_term));
            println!("  Surplus at horizon:  {}", format_inr(o.final_surplus));
            println!("  Net worth at horizon: {}", format_inr(o.final_net_worth_at_horizon));
            println!("  Total return:        {}", format_inr(o.total_return));
            println!("  IRR:                 {} ({:?})", format_percent(o.irr), o.irr_basis);
            println!("  Schedule IRR:        {}", format_percent(o.schedule_irr));

            if schedule {
                println!();
                println!("{:>4} {:>14} {:>14} {:>14} {:>14} {:>14}",
                    "Year", "Dividend", "Interest", "Capital", "Surplus", "Total");
                println!("{}", "-".repeat(80));
                for row in projection.schedule.rows() {
                    println!("{:>4} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
                        row.year, row.dividend, row.interest, row.capital_return, row.surplus_share, row.total);
                }
            }
        }

        Command::Pool { platinum, gold, silver, risk } => {
            let composition = [
                (ShareClass::Platinum, platinum),
                (ShareClass::Gold, gold),
                (ShareClass::Silver, silver),
            ];
            let report = runner.evaluate_pool(&composition, risk.into())?;

            if cli.json {
                return print_json(&report);
            }

            let t = &report.totals;
            println!("Pool: {} positions, {} shares ({} allocation)", t.positions, t.shares, report.risk_model);
            println!("  Total capital:       {}", format_inr_compact(t.total_capital));
            println!("  Distributed:         {}", format_inr_compact(t.total_distributed));
            println!("  Surplus at horizon:  {}", format_inr_compact(t.total_surplus));
            println!("  Shareholder worth:   {}", format_inr_compact(t.total_net_worth));
            println!("  Safety buffer:       {}", format_inr_compact(report.project.safety_buffer));
            println!("  {}", report.project.dividend_paid_label);
        }

        Command::Compare { principal, horizon, conservative_rate } => {
            let series = runner.compare(principal, horizon, conservative_rate);

            if cli.json {
                return print_json(&series);
            }

            println!("{:<26} {:>7} {:>14}", "Instrument", "Rate", "Final (lakh)");
            println!("{}", "-".repeat(50));
            for s in &series {
                println!("{:<26} {:>7} {:>14.2}", s.label, format_percent(s.rate), to_lakh(s.final_value()));
            }
            let fd = series.iter().find(|s| s.instrument == Instrument::FixedDeposit);
            if let Some(fd) = fd {
                println!("\nFixed deposit after {} years: {}", horizon, format_inr(fd.final_value()));
            }
        }

        Command::Coverage { risk, capital } => {
            let models: Vec<RiskModel> = match risk {
                Some(model) => vec![model.into()],
                None => RiskModel::ALL.to_vec(),
            };
            let coverage_model = RefundCoverageModel::from_assumptions(runner.assumptions());

            let mut rows = Vec::with_capacity(models.len());
            for model in models {
                let assessment = runner.coverage(model)?;
                let shutdown = coverage_model.shutdown_scenario(model, capital);
                rows.push((assessment, shutdown));
            }

            if cli.json {
                return print_json(&rows);
            }

            println!("{:<13} {:>6} {:>6} {:>6} {:>12} {:>12} {:>8} {:>9}",
                "Model", "FD", "MF", "Cash", "Assets", "Buffer", "Ratio", "Shortfall");
            println!("{}", "-".repeat(80));
            for (a, s) in &rows {
                println!("{:<13} {:>6.0} {:>6.0} {:>6.0} {:>12} {:>12} {:>8.3} {:>9}",
                    a.risk_model.to_string(),
                    a.split.fd * 100.0,
                    a.split.mf * 100.0,
                    a.split.cash * 100.0,
                    format_inr_compact(a.total_assets),
                    format_inr_compact(a.safety_buffer),
                    a.coverage_ratio,
                    if a.is_shortfall { "yes" } else { "no" },
                );
                println!("  shutdown: refund paid {}, residual {} ({:.3} per rupee)",
                    format_inr_compact(s.refund_paid),
                    format_inr_compact(s.residual),
                    s.residual_per_rupee,
                );
            }
        }

        Command::Resident { unit, residents, cars, stay, ledger } => {
            let request = ResidentRequest {
                unit_id: unit,
                residents,
                cars,
                stay_years: stay,
            };
            let calc = runner.resident(&request)?;

            if cli.json {
                return print_json(&calc);
            }

            println!("{} ({} sqft), {} resident(s), {} car(s), {} years",
                calc.unit.category, calc.unit.sqft, calc.residents, calc.cars, calc.stay_years);
            println!("  Upfront:             {}", format_inr(calc.upfront_cost));
            println!("  Deposit:             {}", format_inr(calc.deposit_amount));
            println!("  Annual cost:         {}", format_inr(calc.annual_cost));
            println!("  Total before refund: {}", format_inr(calc.total_cost_before_refund));
            println!("  Refund:              {} ({})", format_inr(calc.refund_amount), format_percent(calc.refund_percentage));
            println!("  Effective net cost:  {}", format_inr(calc.effective_net_cost));
            println!("  Per year:            {}", format_inr(calc.effective_annual_cost()));

            if ledger {
                println!();
                println!("{:>4} {:>14} {:>16} {:>12}", "Year", "Service", "Cumulative", "Lakh");
                for row in &calc.ledger {
                    println!("{:>4} {:>14.2} {:>16.2} {:>12.2}",
                        row.year, row.service_cost, row.cumulative_cost, row.cumulative_lakh);
                }
            }
        }
    }

    log::debug!("completed in {:?}", start.elapsed());
    Ok(())
}
