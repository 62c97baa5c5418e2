//! CA-reviewed reference figures, checked through the public API

use approx::{assert_abs_diff_eq, assert_relative_eq};

use retirement_projection::resident::ResidentRequest;
use retirement_projection::scenario::CA_POOL;
use retirement_projection::{
    EngineError, InvestorInput, IrrBasis, RiskModel, ScenarioRunner, Selection, ShareClass,
};

fn runner() -> ScenarioRunner {
    ScenarioRunner::ca_reviewed().unwrap()
}

#[test]
fn platinum_single_share() {
    let o = runner()
        .investor(&InvestorInput::new(ShareClass::Platinum, 1, 15))
        .unwrap()
        .outcome;

    assert_eq!(o.total_invested, 3_000_000.0);
    assert_abs_diff_eq!(o.total_dividends, 5_550_000.0, epsilon = 1.0);
    assert_abs_diff_eq!(o.total_interest, 400_000.0, epsilon = 1.0);
    assert_abs_diff_eq!(o.total_return, 11_018_023.0, epsilon = 1.0);
    assert_abs_diff_eq!(o.irr, 0.0906, epsilon = 5e-5);
    assert_eq!(o.irr_basis, IrrBasis::HorizonBullet);
}

#[test]
fn platinum_two_shares() {
    let o = runner()
        .investor(&InvestorInput::new(ShareClass::Platinum, 2, 15))
        .unwrap()
        .outcome;

    assert_eq!(o.total_invested, 6_000_000.0);
    assert_abs_diff_eq!(o.total_return, 22_036_046.0, epsilon = 1.0);
    assert_abs_diff_eq!(o.irr, 0.0906, epsilon = 5e-5);
}

#[test]
fn published_tier_irrs() {
    let runner = runner();
    for (class, published) in [
        (ShareClass::Platinum, 0.0906),
        (ShareClass::Gold, 0.0906),
        (ShareClass::Silver, 0.0934),
    ] {
        let o = runner.investor(&InvestorInput::new(class, 1, 15)).unwrap().outcome;
        assert_abs_diff_eq!(o.irr, published, epsilon = 1e-4);
    }
}

#[test]
fn ca_pool_surplus_and_capital() {
    let report = runner().evaluate_pool(&CA_POOL, RiskModel::Moderate).unwrap();

    assert_eq!(report.totals.positions, 90);
    assert_eq!(report.totals.total_capital, 200_000_000.0);
    assert_abs_diff_eq!(report.totals.total_surplus, 140_754_859.0, epsilon = 2.0);
    assert_relative_eq!(
        report.totals.total_net_worth,
        report.totals.total_capital + report.totals.total_surplus,
        max_relative = 1e-12
    );
}

#[test]
fn five_year_stay_refunds_ninety_percent() {
    let calc = runner()
        .resident(&ResidentRequest {
            unit_id: "1bhk".to_string(),
            residents: 1,
            cars: 0,
            stay_years: 5,
        })
        .unwrap();

    assert_eq!(calc.unit.base_price, 3_500_000.0);
    assert_eq!(calc.refund_percentage, 0.90);
    assert_abs_diff_eq!(calc.refund_amount, 472_500.0, epsilon = 1e-6);
}

#[test]
fn coverage_by_model() {
    let runner = runner();

    assert!(runner.coverage(RiskModel::Aggressive).unwrap().is_shortfall);
    assert!(!runner.coverage(RiskModel::Moderate).unwrap().is_shortfall);
    assert!(!runner.coverage(RiskModel::Conservative).unwrap().is_shortfall);
}

#[test]
fn csv_and_compiled_tables_agree() {
    let from_csv = ScenarioRunner::from_csv().unwrap();
    let compiled = runner();

    for class in ShareClass::ALL {
        let selection = Selection {
            share_class: class,
            number_of_shares: 3,
            ..Selection::default()
        };
        assert_eq!(
            from_csv.evaluate(&selection).unwrap(),
            compiled.evaluate(&selection).unwrap()
        );
    }
}

#[test]
fn invalid_selection_is_an_error() {
    let selection = Selection {
        unit_id: "penthouse".to_string(),
        ..Selection::default()
    };
    assert_eq!(
        runner().evaluate(&selection),
        Err(EngineError::UnknownUnitType("penthouse".to_string()))
    );
}
