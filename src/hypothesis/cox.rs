// Stratified Cox proportional-hazards regression with one covariate
//
// Each stratum has its own baseline hazard; the covariate effect β is shared.
// The partial likelihood uses Efron's approximation for tied event times and
// is maximized with Newton-Raphson plus step halving.
//
// A positive β means observations with covariate 1 complete sooner
// (hazard ratio exp(β) > 1).

use crate::error::{AnalysisError, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

const MAX_ITERATIONS: usize = 50;
const MAX_HALVINGS: usize = 30;
const TOLERANCE: f64 = 1e-9;

/// |β| beyond this means the likelihood has no finite maximum
const DIVERGENCE_LIMIT: f64 = 25.0;

/// One run in survival form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalObservation {
    pub stratum: String,
    pub duration: f64,
    /// true when completion was observed, false when censored
    pub event: bool,
    pub covariate: f64,
}

/// Fitted coefficient of the covariate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoxFit {
    pub coef: f64,
    pub hazard_ratio: f64,
    pub std_error: f64,
    pub z: f64,
    pub pvalue: f64,
    pub log_likelihood: f64,
    pub iterations: usize,
    pub observations: usize,
    pub events: usize,
}

/// Log partial likelihood, score and information at β
#[derive(Debug, Clone, Copy)]
struct Derivatives {
    log_likelihood: f64,
    score: f64,
    information: f64,
}

/// Observations of one stratum sorted by decreasing duration
struct Stratum {
    rows: Vec<(f64, bool, f64)>,
}

fn build_strata(observations: &[SurvivalObservation]) -> Vec<Stratum> {
    let mut names: Vec<&str> = Vec::new();
    let mut strata: Vec<Stratum> = Vec::new();
    for obs in observations {
        let idx = match names.iter().position(|n| *n == obs.stratum) {
            Some(idx) => idx,
            None => {
                names.push(&obs.stratum);
                strata.push(Stratum { rows: Vec::new() });
                strata.len() - 1
            }
        };
        strata[idx]
            .rows
            .push((obs.duration, obs.event, obs.covariate));
    }
    for stratum in &mut strata {
        stratum.rows.sort_by(|a, b| b.0.total_cmp(&a.0));
    }
    strata
}

fn derivatives(strata: &[Stratum], beta: f64) -> Derivatives {
    let mut log_likelihood = 0.0;
    let mut score = 0.0;
    let mut information = 0.0;

    for stratum in strata {
        // risk set sums, grown while walking from the latest time backwards
        let (mut s0, mut s1, mut s2) = (0.0, 0.0, 0.0);
        let rows = &stratum.rows;
        let mut i = 0;
        while i < rows.len() {
            let time = rows[i].0;
            let (mut d0, mut d1, mut d2) = (0.0, 0.0, 0.0);
            let mut deaths = 0usize;
            let mut event_x = 0.0;

            let mut j = i;
            while j < rows.len() && rows[j].0 == time {
                let (_, event, x) = rows[j];
                let w = (beta * x).exp();
                s0 += w;
                s1 += w * x;
                s2 += w * x * x;
                if event {
                    d0 += w;
                    d1 += w * x;
                    d2 += w * x * x;
                    deaths += 1;
                    event_x += x;
                }
                j += 1;
            }

            if deaths > 0 {
                log_likelihood += beta * event_x;
                score += event_x;
                for l in 0..deaths {
                    let frac = l as f64 / deaths as f64;
                    let a0 = s0 - frac * d0;
                    let a1 = s1 - frac * d1;
                    let a2 = s2 - frac * d2;
                    log_likelihood -= a0.ln();
                    score -= a1 / a0;
                    information += a2 / a0 - (a1 / a0).powi(2);
                }
            }
            i = j;
        }
    }

    Derivatives {
        log_likelihood,
        score,
        information,
    }
}

/// Fit a Cox model stratified by `SurvivalObservation::stratum`
///
/// Fails with [`AnalysisError::FitFailed`] when there are no events, the
/// covariate does not vary within any stratum, or the coefficient diverges
/// (one group always completes before the other).
pub fn fit_stratified_cox(observations: &[SurvivalObservation]) -> Result<CoxFit> {
    if observations.is_empty() {
        return Err(AnalysisError::NoData("no observations".to_string()));
    }
    if observations
        .iter()
        .any(|o| !o.duration.is_finite() || !o.covariate.is_finite())
    {
        return Err(AnalysisError::FitFailed(
            "durations and covariates must be finite".to_string(),
        ));
    }
    let events = observations.iter().filter(|o| o.event).count();
    if events == 0 {
        return Err(AnalysisError::FitFailed("no observed events".to_string()));
    }

    let strata = build_strata(observations);
    let mut beta = 0.0;
    let mut current = derivatives(&strata, beta);
    let mut iterations = 0;

    loop {
        if !(current.information > 0.0 && current.information.is_finite()) {
            return Err(AnalysisError::FitFailed(
                "covariate has no variation within strata".to_string(),
            ));
        }
        if iterations >= MAX_ITERATIONS {
            return Err(AnalysisError::FitFailed(format!(
                "no convergence after {} iterations",
                MAX_ITERATIONS
            )));
        }
        iterations += 1;

        let mut step = current.score / current.information;
        let mut candidate = derivatives(&strata, beta + step);
        let mut halvings = 0;
        while !(candidate.log_likelihood >= current.log_likelihood - 1e-12)
            && halvings < MAX_HALVINGS
        {
            step /= 2.0;
            candidate = derivatives(&strata, beta + step);
            halvings += 1;
        }

        beta += step;
        current = candidate;
        tracing::trace!(iteration = iterations, beta, loglik = current.log_likelihood);

        if beta.abs() > DIVERGENCE_LIMIT {
            return Err(AnalysisError::FitFailed(
                "coefficient diverged; groups are completely separated".to_string(),
            ));
        }
        if step.abs() < TOLERANCE {
            break;
        }
    }

    if !(current.information > 0.0) {
        return Err(AnalysisError::FitFailed(
            "singular information at the optimum".to_string(),
        ));
    }

    let std_error = 1.0 / current.information.sqrt();
    let z = beta / std_error;
    let pvalue = (2.0 * Normal::standard().sf(z.abs())).min(1.0);

    Ok(CoxFit {
        coef: beta,
        hazard_ratio: beta.exp(),
        std_error,
        z,
        pvalue,
        log_likelihood: current.log_likelihood,
        iterations,
        observations: observations.len(),
        events,
    })
}
