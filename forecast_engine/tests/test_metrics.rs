use approx::assert_abs_diff_eq;
use forecast_engine::metrics::{
    binarize_at_mean, mean_squared_error, r2_score, ClassificationScores, EvaluationMetrics,
    EvaluationReport, MetricWarning,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 0.0)]
#[case(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0], 1.0)]
#[case(&[0.0, 0.0], &[1.0, -1.0], 1.0)]
#[case(&[0.5], &[0.0], 0.25)]
fn test_mse(#[case] truth: &[f64], #[case] predicted: &[f64], #[case] expected: f64) {
    assert_abs_diff_eq!(mean_squared_error(truth, predicted).unwrap(), expected, epsilon = 1e-12);
}

#[rstest]
#[case(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0], 1.0)]
#[case(&[1.0, 2.0, 3.0, 4.0], &[2.5, 2.5, 2.5, 2.5], 0.0)]
#[case(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0], -3.0)]
#[case(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0], 1.0)]
#[case(&[5.0, 5.0, 5.0], &[5.0, 5.0, 6.0], 0.0)]
fn test_r2(#[case] truth: &[f64], #[case] predicted: &[f64], #[case] expected: f64) {
    assert_abs_diff_eq!(r2_score(truth, predicted).unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn test_binarize_strictly_above_mean() {
    assert_eq!(binarize_at_mean(&[1.0, 2.0, 3.0]), vec![false, false, true]);
    assert_eq!(binarize_at_mean(&[4.0, 4.0]), vec![false, false]);
    assert!(binarize_at_mean(&[]).is_empty());
}

#[test]
fn test_classification_scores() {
    let truth = [true, true, false, false, true];
    let predicted = [true, false, true, false, true];
    let scores = ClassificationScores::compute(&truth, &predicted);

    // tp 2, fp 1, fn 1
    assert_abs_diff_eq!(scores.precision, 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scores.recall, 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scores.f1, 2.0 / 3.0, epsilon = 1e-12);
    assert!(scores.warnings.is_empty());
}

#[test]
fn test_no_positives_anywhere() {
    let scores = ClassificationScores::compute(&[false, false], &[false, false]);
    assert_eq!(scores.precision, 0.0);
    assert_eq!(scores.recall, 0.0);
    assert_eq!(scores.f1, 0.0);
    assert_eq!(
        scores.warnings,
        vec![
            MetricWarning::PrecisionUndefined,
            MetricWarning::RecallUndefined,
            MetricWarning::F1Undefined
        ]
    );
}

#[test]
fn test_metrics_are_bounded() {
    let truth = [0.1, 0.4, 0.35, 0.8, 0.9, 0.2];
    let predicted = [0.15, 0.3, 0.5, 0.7, 0.95, 0.1];
    let m = EvaluationMetrics::compute(&truth, &predicted).unwrap();

    assert!(m.mse >= 0.0);
    assert!(m.r2 <= 1.0);
    for score in [m.precision, m.recall, m.f1] {
        assert!((0.0..=1.0).contains(&score));
    }
}

#[test]
fn test_report_lookup_and_display() {
    let mut report = EvaluationReport::new();
    let truth = [0.1, 0.5, 0.9];
    report.push("Linear Regression", EvaluationMetrics::compute(&truth, &truth).unwrap());

    assert_eq!(report.len(), 1);
    assert_eq!(report.get("Linear Regression").unwrap().r2, 1.0);
    assert!(report.get("SVM").is_none());

    let text = report.to_string();
    assert!(text.contains("Model"));
    assert!(text.contains("Linear Regression"));
}
