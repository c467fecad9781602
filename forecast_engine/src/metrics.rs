//! Metrics for scoring fitted models on their training windows

use crate::error::{ForecastError, Result};
use crate::models::ModelFailure;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// A classification score whose denominator was zero and was reported as 0.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricWarning {
    /// No window was predicted above its mean
    PrecisionUndefined,
    /// No true target was above its mean
    RecallUndefined,
    /// Neither side had a positive label
    F1Undefined,
}

impl fmt::Display for MetricWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MetricWarning::PrecisionUndefined => "precision is ill-defined (no predicted positives)",
            MetricWarning::RecallUndefined => "recall is ill-defined (no true positives)",
            MetricWarning::F1Undefined => "f1 is ill-defined (no positives)",
        };
        f.write_str(text)
    }
}

/// Regression and direction scores of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    pub mse: f64,
    pub r2: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub warnings: Vec<MetricWarning>,
}

impl EvaluationMetrics {
    /// Score predictions against targets.
    ///
    /// Both series are binarised at their own mean (`> mean` is positive)
    /// before precision, recall and F1 are computed.
    pub fn compute(truth: &[f64], predicted: &[f64]) -> Result<Self> {
        let mse = mean_squared_error(truth, predicted)?;
        let r2 = r2_score(truth, predicted)?;

        let truth_labels = binarize_at_mean(truth);
        let predicted_labels = binarize_at_mean(predicted);
        let scores = ClassificationScores::compute(&truth_labels, &predicted_labels);

        Ok(Self {
            mse,
            r2,
            precision: scores.precision,
            recall: scores.recall,
            f1: scores.f1,
            warnings: scores.warnings,
        })
    }
}

/// Mean squared error
pub fn mean_squared_error(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(truth, predicted)?;
    let n = truth.len() as f64;
    Ok(truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n)
}

/// Coefficient of determination.
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(truth, predicted)?;
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;

    let ss_res: f64 = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Label each value by whether it lies strictly above the sample mean
pub fn binarize_at_mean(values: &[f64]) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|&v| v > mean).collect()
}

/// Precision, recall and F1 of the positive class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub warnings: Vec<MetricWarning>,
}

impl ClassificationScores {
    pub fn compute(truth: &[bool], predicted: &[bool]) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t, p) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let mut warnings = Vec::new();
        let precision = ratio(tp, tp + fp, MetricWarning::PrecisionUndefined, &mut warnings);
        let recall = ratio(tp, tp + fn_, MetricWarning::RecallUndefined, &mut warnings);
        let f1 = ratio(2 * tp, 2 * tp + fp + fn_, MetricWarning::F1Undefined, &mut warnings);

        Self {
            precision,
            recall,
            f1,
            warnings,
        }
    }
}

fn ratio(num: usize, den: usize, warning: MetricWarning, warnings: &mut Vec<MetricWarning>) -> f64 {
    if den == 0 {
        warnings.push(warning);
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn check_lengths(truth: &[f64], predicted: &[f64]) -> Result<()> {
    if truth.len() != predicted.len() || truth.is_empty() {
        return Err(ForecastError::ValidationError(format!(
            "Truth and predictions must have the same non-zero length (got {} and {})",
            truth.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Metrics of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelEvaluation {
    pub model: String,
    pub metrics: EvaluationMetrics,
}

/// Metrics for every model that could be scored, in training order.
///
/// Every row is computed on the min-max scaled training windows, for the
/// LSTM as for the other models, so MSE values are in `[0, 1]` units and
/// comparable across models. They are not price-unit errors.
#[derive(Debug, Default, Serialize)]
pub struct EvaluationReport {
    rows: Vec<ModelEvaluation>,
    failures: Vec<ModelFailure>,
}

impl EvaluationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model's metrics, logging any undefined score
    pub fn push(&mut self, model: &str, metrics: EvaluationMetrics) {
        for warning in &metrics.warnings {
            warn!(model, %warning, "metric set to 0.0");
        }
        self.rows.push(ModelEvaluation {
            model: model.to_string(),
            metrics,
        });
    }

    pub fn record_failure(&mut self, model: &str, error: ForecastError) {
        self.failures.push(ModelFailure::new(model, error));
    }

    pub fn rows(&self) -> &[ModelEvaluation] {
        &self.rows
    }

    pub fn get(&self, model: &str) -> Option<&EvaluationMetrics> {
        self.rows
            .iter()
            .find(|row| row.model == model)
            .map(|row| &row.metrics)
    }

    pub fn failures(&self) -> &[ModelFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Model", "MSE", "R2", "Precision", "Recall", "F1"
        )?;
        for row in &self.rows {
            let m = &row.metrics;
            writeln!(
                f,
                "{:<20} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                row.model, m.mse, m.r2, m.precision, m.recall, m.f1
            )?;
        }
        for failure in &self.failures {
            writeln!(f, "{:<20} skipped: {}", failure.model, failure.error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_perfect_predictions() {
        let truth = [0.1, 0.5, 0.3, 0.9];
        let metrics = EvaluationMetrics::compute(&truth, &truth).unwrap();

        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.r2, 1.0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1, 1.0);
        assert!(metrics.warnings.is_empty());
    }

    #[test]
    fn test_r2_constant_truth() {
        assert_eq!(r2_score(&[2.0, 2.0], &[2.0, 2.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[2.0, 2.0], &[2.0, 2.5]).unwrap(), 0.0);
    }

    #[test]
    fn test_r2_mean_predictor_is_zero() {
        let r2 = r2_score(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]).unwrap();
        assert_abs_diff_eq!(r2, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_predictions_warn() {
        // predictions never exceed their own mean, so precision has no denominator
        let metrics = EvaluationMetrics::compute(&[0.0, 1.0, 0.2, 0.8], &[0.5; 4]).unwrap();

        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert_eq!(metrics.warnings, vec![MetricWarning::PrecisionUndefined]);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(mean_squared_error(&[1.0], &[1.0, 2.0]).is_err());
        assert!(mean_squared_error(&[], &[]).is_err());
    }
}
