mod common;

use approx::assert_abs_diff_eq;
use common::{quick_config, CLOSES};
use forecast_engine::config::{ForestConfig, LstmConfig, SvrConfig};
use forecast_engine::models::lstm::LstmNetwork;
use forecast_engine::models::{
    LinearRegression, Lstm, RandomForest, Regressor, RegressorKind, SupportVectorRegression,
};
use price_math::{MinMaxScaler, WindowSet};
use rstest::rstest;

fn scaled_windows(window: usize) -> WindowSet {
    let scaler = MinMaxScaler::fit(&CLOSES).unwrap();
    WindowSet::from_series(&scaler.transform(&CLOSES), window).unwrap()
}

/// Windows whose target is an exact linear function of the inputs
fn linear_windows() -> WindowSet {
    let inputs: Vec<Vec<f64>> = (0..12)
        .map(|i| {
            let i = i as f64;
            vec![(i * 0.9).sin(), (i * 1.7).cos(), (i * 0.3).sin() * 0.5]
        })
        .collect();
    let targets = inputs
        .iter()
        .map(|x| 0.5 * x[0] - 0.25 * x[1] + 2.0 * x[2] + 0.1)
        .collect();
    WindowSet::from_samples(3, inputs, targets).unwrap()
}

#[test]
fn test_linear_regression_recovers_exact_relation() {
    let set = linear_windows();
    let model = LinearRegression::new().fit(&set).unwrap();
    let predictions = model.predict(set.inputs()).unwrap();

    for (p, t) in predictions.iter().zip(set.targets()) {
        assert_abs_diff_eq!(*p, *t, epsilon = 1e-6);
    }
}

#[test]
fn test_random_forest_stays_within_target_range() {
    let set = scaled_windows(5);
    let model = RandomForest::new(ForestConfig::default()).fit(&set).unwrap();
    let predictions = model.predict(set.inputs()).unwrap();

    let lo = set.targets().iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = set.targets().iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(predictions.len(), set.len());
    assert!(predictions.iter().all(|p| *p >= lo - 1e-9 && *p <= hi + 1e-9));
}

#[test]
fn test_random_forest_seeded() {
    let set = scaled_windows(5);
    let a = RandomForest::new(ForestConfig::default()).fit(&set).unwrap();
    let b = RandomForest::new(ForestConfig::default()).fit(&set).unwrap();
    assert_eq!(
        a.rollout(&set.inputs()[0], 5).unwrap(),
        b.rollout(&set.inputs()[0], 5).unwrap()
    );
}

#[test]
fn test_svr_predictions_finite() {
    let set = scaled_windows(5);
    let model = SupportVectorRegression::new(SvrConfig::default()).fit(&set).unwrap();
    let predictions = model.predict(set.inputs()).unwrap();

    assert_eq!(predictions.len(), set.len());
    assert!(predictions.iter().all(|p| p.is_finite()));
}

#[test]
fn test_lstm_loss_decreases() {
    let set = scaled_windows(5);
    let mut network = LstmNetwork::new(16, 42);
    let losses = network.train(set.inputs(), set.targets(), 100, 0.01);

    assert_eq!(losses.len(), 100);
    assert!(losses[99] < losses[0]);
}

#[test]
fn test_lstm_default_shape() {
    let network = LstmNetwork::new(LstmConfig::default().hidden_size, 42);
    assert_eq!(network.hidden_size(), 50);
    assert_eq!(LstmNetwork::param_count(50), 4 * 50 + 4 * 50 * 50 + 4 * 50 + 50 + 1);
}

#[test]
fn test_lstm_same_seed_same_forecast() {
    let set = scaled_windows(5);
    let config = LstmConfig {
        hidden_size: 8,
        epochs: 10,
        ..LstmConfig::default()
    };
    let a = Lstm::new(config.clone()).fit(&set).unwrap();
    let b = Lstm::new(config).fit(&set).unwrap();
    let window = &set.inputs()[set.len() - 1];
    assert_eq!(a.rollout(window, 5).unwrap(), b.rollout(window, 5).unwrap());
}

#[rstest]
#[case(RegressorKind::LinearRegression)]
#[case(RegressorKind::RandomForest)]
#[case(RegressorKind::Svm)]
#[case(RegressorKind::Lstm)]
fn test_rollout_length(#[case] kind: RegressorKind) {
    let config = quick_config(5);
    let set = scaled_windows(5);
    let regressor = kind.build(&config);
    assert_eq!(regressor.name(), kind.name());

    let model = regressor.fit(&set).unwrap();
    let window = &set.inputs()[set.len() - 1];
    for steps in [1, 5, 15] {
        assert_eq!(model.rollout(window, steps).unwrap().len(), steps);
    }
}

#[rstest]
#[case(RegressorKind::LinearRegression)]
#[case(RegressorKind::RandomForest)]
#[case(RegressorKind::Svm)]
#[case(RegressorKind::Lstm)]
fn test_wrong_window_length_rejected(#[case] kind: RegressorKind) {
    let config = quick_config(5);
    let set = scaled_windows(5);
    let model = kind.build(&config).fit(&set).unwrap();
    assert!(model.predict(&[vec![0.5; 4]]).is_err());
}
