//! Internal Rate of Return (IRR) calculation
//!
//! Newton-Raphson on the NPV function with a bisection fallback. Both loops are
//! bounded; failure to bracket or converge is reported as `NoRootFound`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Solver parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolverConfig {
    /// Starting periodic rate for Newton-Raphson
    pub initial_guess: f64,
    /// Convergence tolerance on both |NPV| (of normalised flows) and rate delta
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Bisection bracket, periodic rates
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Default for IrrSolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.05,
            tolerance: 1e-10,
            max_iterations: 1000,
            lower_bound: -0.99,
            upper_bound: 10.0,
        }
    }
}

/// Net present value of `cashflows` at a periodic `rate`; `cashflows[0]` is undiscounted
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / (discount * (1.0 + rate));
        }
    }

    (npv, dnpv)
}

fn no_root(reason: impl Into<String>) -> EngineError {
    EngineError::NoRootFound {
        reason: reason.into(),
    }
}

/// Bounded IRR solver
#[derive(Debug, Clone, Copy, Default)]
pub struct IrrSolver {
    config: IrrSolverConfig,
}

impl IrrSolver {
    pub fn new(config: IrrSolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IrrSolverConfig {
        &self.config
    }

    /// Annual IRR of yearly cash flows
    pub fn solve(&self, cashflows: &[f64]) -> Result<f64> {
        self.solve_periodic(cashflows, 1)
    }

    /// IRR of cash flows spaced `periods_per_year` apart, returned as an annual rate
    pub fn solve_periodic(&self, cashflows: &[f64], periods_per_year: u32) -> Result<f64> {
        if cashflows.len() < 2 {
            return Err(no_root("at least two cash flows are required"));
        }
        if cashflows.iter().any(|cf| !cf.is_finite()) {
            return Err(no_root("cash flows contain a non-finite value"));
        }
        if periods_per_year == 0 {
            return Err(no_root("periods per year must be positive"));
        }

        // Scale out the magnitude so the result and the NPV tolerance do not
        // depend on how many shares the flows represent.
        let scale = cashflows.iter().fold(0.0_f64, |m, cf| m.max(cf.abs()));
        if scale == 0.0 {
            return Err(no_root("all cash flows are zero"));
        }
        let flows: Vec<f64> = cashflows.iter().map(|cf| cf / scale).collect();

        let has_positive = flows.iter().any(|&cf| cf > 0.0);
        let has_negative = flows.iter().any(|&cf| cf < 0.0);
        if !has_positive || !has_negative {
            return Err(no_root("cash flows have no sign change"));
        }

        let periodic = match self.newton(&flows) {
            Some(rate) => rate,
            None => self.bisection(&flows)?,
        };

        Ok((1.0 + periodic).powi(periods_per_year as i32) - 1.0)
    }

    fn newton(&self, flows: &[f64]) -> Option<f64> {
        let cfg = &self.config;
        let mut rate = cfg.initial_guess;

        for iteration in 0..cfg.max_iterations {
            let (value, derivative) = npv_and_derivative(flows, rate);

            if derivative.abs() < 1e-20 {
                debug!("IRR: derivative vanished at rate {:.6}, falling back to bisection", rate);
                return None;
            }

            let new_rate = (rate - value / derivative).clamp(cfg.lower_bound, cfg.upper_bound);
            if !new_rate.is_finite() {
                return None;
            }

            if (new_rate - rate).abs() < cfg.tolerance && npv(flows, new_rate).abs() < cfg.tolerance {
                debug!("IRR: Newton converged to {:.8} after {} iterations", new_rate, iteration + 1);
                return Some(new_rate);
            }

            rate = new_rate;
        }

        debug!("IRR: Newton did not converge in {} iterations, falling back to bisection", cfg.max_iterations);
        None
    }

    fn bisection(&self, flows: &[f64]) -> Result<f64> {
        let cfg = &self.config;
        let mut low = cfg.lower_bound;
        let mut high = cfg.upper_bound;
        let mut npv_low = npv(flows, low);
        let npv_high = npv(flows, high);

        if npv_low * npv_high > 0.0 {
            return Err(no_root(format!(
                "NPV does not change sign between {} and {}",
                low, high
            )));
        }

        for _ in 0..cfg.max_iterations {
            let mid = (low + high) / 2.0;
            let npv_mid = npv(flows, mid);

            if npv_mid.abs() < cfg.tolerance || (high - low) / 2.0 < cfg.tolerance {
                debug!("IRR: bisection converged to {:.8}", mid);
                return Ok(mid);
            }

            if npv_mid * npv_low < 0.0 {
                high = mid;
            } else {
                low = mid;
                npv_low = npv_mid;
            }
        }

        Err(no_root(format!(
            "bisection did not converge in {} iterations",
            cfg.max_iterations
        )))
    }
}

/// Annual IRR with default solver settings
pub fn calculate_irr(cashflows: &[f64]) -> Result<f64> {
    IrrSolver::default().solve(cashflows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // 1000 in, 1100 back after a year
        let irr = calculate_irr(&[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_monthly_flows_annualised() {
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(1100.0);

        let irr = IrrSolver::default().solve_periodic(&cashflows, 12).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_level_annuity() {
        // 10,000 loan repaid by five payments of 2,637.97 is ~10%
        let mut cashflows = vec![-10_000.0];
        cashflows.extend(vec![2_637.97; 5]);

        let irr = calculate_irr(&cashflows).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-5);
    }

    #[test]
    fn test_ca_platinum_bullet() {
        let mut cashflows = vec![-3_000_000.0];
        cashflows.extend(vec![0.0; 14]);
        cashflows.push(11_018_023.0);

        let irr = calculate_irr(&cashflows).unwrap();
        assert_abs_diff_eq!(irr, 0.0906, epsilon = 1e-6);
    }

    #[test]
    fn test_scaling_flows_keeps_rate() {
        let base = [-3_000_000.0, 400_000.0, 400_000.0, 3_500_000.0];
        let scaled: Vec<f64> = base.iter().map(|cf| cf * 37.0).collect();

        let a = calculate_irr(&base).unwrap();
        let b = calculate_irr(&scaled).unwrap();
        assert_abs_diff_eq!(a, b, epsilon = 1e-10);
    }

    #[test]
    fn test_negative_irr() {
        let irr = calculate_irr(&[-1000.0, 500.0, 400.0]).unwrap();
        assert!(irr < 0.0);
        assert_abs_diff_eq!(npv(&[-1000.0, 500.0, 400.0], irr), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_sign_change() {
        assert!(matches!(
            calculate_irr(&[1000.0, 100.0, 100.0]),
            Err(EngineError::NoRootFound { .. })
        ));
        assert!(matches!(
            calculate_irr(&[-1000.0, -100.0]),
            Err(EngineError::NoRootFound { .. })
        ));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(calculate_irr(&[]).is_err());
        assert!(calculate_irr(&[-100.0]).is_err());
        assert!(calculate_irr(&[0.0, 0.0, 0.0]).is_err());
        assert!(calculate_irr(&[-100.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_converges_from_distant_guess() {
        let solver = IrrSolver::new(IrrSolverConfig {
            initial_guess: 9.0,
            ..Default::default()
        });
        let irr = solver.solve(&[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-8);
    }

    #[test]
    fn test_bisection_alone() {
        let solver = IrrSolver::default();
        let rate = solver.bisection(&[-1.0, 0.0, 1.21]).unwrap();
        assert_abs_diff_eq!(rate, 0.10, epsilon = 1e-8);
    }
}
