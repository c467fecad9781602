//! Single-layer LSTM regressor
//!
//! The network reads a window one scaled close at a time (input size 1),
//! carries a hidden state of `hidden_size` units and projects the last hidden
//! state to one output through a linear head:
//!
//! ```text
//! z_t = W_x * x_t + W_h * h_{t-1} + b          (4H gate pre-activations)
//! i_t = sigmoid(z_i)  f_t = sigmoid(z_f)  g_t = tanh(z_g)  o_t = sigmoid(z_o)
//! c_t = f_t * c_{t-1} + i_t * g_t
//! h_t = o_t * tanh(c_t)
//! y   = w_out . h_T + b_out
//! ```
//!
//! Training is full batch on mean squared error for a fixed number of epochs
//! with Adam at a fixed learning rate. There is no early stopping and no
//! validation split.

use crate::config::LstmConfig;
use crate::error::{ForecastError, Result};
use crate::models::{check_prediction_count, FittedRegressor, Regressor};
use price_math::WindowSet;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use tracing::debug;

const NAME: &str = "LSTM";

/// Factory for the recurrent model
#[derive(Debug, Clone)]
pub struct Lstm {
    config: LstmConfig,
}

impl Lstm {
    pub fn new(config: LstmConfig) -> Self {
        Self { config }
    }
}

impl Regressor for Lstm {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&self, windows: &WindowSet) -> Result<Box<dyn FittedRegressor>> {
        if windows.is_empty() {
            return Err(ForecastError::model(NAME, "cannot train on an empty window set"));
        }

        let mut network = LstmNetwork::new(self.config.hidden_size, self.config.seed);
        let losses = network.train(
            windows.inputs(),
            windows.targets(),
            self.config.epochs,
            self.config.learning_rate,
        );

        let final_loss = losses.last().copied().unwrap_or(f64::NAN);
        if !final_loss.is_finite() {
            return Err(ForecastError::model(NAME, "training loss diverged"));
        }

        debug!(final_loss, "lstm fitted");
        Ok(Box::new(TrainedLstm {
            network,
            window: windows.window(),
        }))
    }
}

/// Fitted LSTM
#[derive(Debug, Clone)]
pub struct TrainedLstm {
    network: LstmNetwork,
    window: usize,
}

impl FittedRegressor for TrainedLstm {
    fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        if let Some(bad) = windows.iter().find(|w| w.len() != self.window) {
            return Err(ForecastError::ValidationError(format!(
                "Input window of length {} does not match window length {}",
                bad.len(),
                self.window
            )));
        }
        let predictions: Vec<f64> = windows.iter().map(|w| self.network.forward(w)).collect();
        check_prediction_count(NAME, windows.len(), predictions.len())?;
        Ok(predictions)
    }
}

/// Gate activations of one time step, kept for back-propagation
#[derive(Debug, Clone)]
struct StepCache {
    x: f64,
    h_prev: Vec<f64>,
    c_prev: Vec<f64>,
    i: Vec<f64>,
    f: Vec<f64>,
    g: Vec<f64>,
    o: Vec<f64>,
    tanh_c: Vec<f64>,
}

/// Weights of the recurrent layer and the output head in one flat buffer.
///
/// Layout: `w_x [4H] | w_h [4H x H] | b [4H] | w_out [H] | b_out [1]`, gate
/// blocks ordered input, forget, cell, output.
#[derive(Debug, Clone)]
pub struct LstmNetwork {
    hidden: usize,
    params: Vec<f64>,
}

impl LstmNetwork {
    /// Initialise every weight uniformly in `±1/sqrt(hidden)`
    pub fn new(hidden: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bound = 1.0 / (hidden as f64).sqrt();
        let dist = Uniform::new_inclusive(-bound, bound);
        let len = Self::param_count(hidden);
        let params = (0..len).map(|_| dist.sample(&mut rng)).collect();
        Self { hidden, params }
    }

    /// Number of trainable parameters for a hidden size
    pub fn param_count(hidden: usize) -> usize {
        4 * hidden + 4 * hidden * hidden + 4 * hidden + hidden + 1
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden
    }

    fn w_x_offset(&self) -> usize {
        0
    }

    fn w_h_offset(&self) -> usize {
        4 * self.hidden
    }

    fn b_offset(&self) -> usize {
        4 * self.hidden + 4 * self.hidden * self.hidden
    }

    fn w_out_offset(&self) -> usize {
        self.b_offset() + 4 * self.hidden
    }

    fn b_out_offset(&self) -> usize {
        self.w_out_offset() + self.hidden
    }

    /// Predict the value following `sequence`
    pub fn forward(&self, sequence: &[f64]) -> f64 {
        let (h, _) = self.run_sequence(sequence);
        self.project(&h)
    }

    fn project(&self, h: &[f64]) -> f64 {
        let w_out = &self.params[self.w_out_offset()..self.b_out_offset()];
        let b_out = self.params[self.b_out_offset()];
        w_out.iter().zip(h).map(|(w, h)| w * h).sum::<f64>() + b_out
    }

    /// Run the recurrence and return the last hidden state and per-step caches
    fn run_sequence(&self, sequence: &[f64]) -> (Vec<f64>, Vec<StepCache>) {
        let hsz = self.hidden;
        let w_x = &self.params[self.w_x_offset()..self.w_h_offset()];
        let w_h = &self.params[self.w_h_offset()..self.b_offset()];
        let b = &self.params[self.b_offset()..self.w_out_offset()];

        let mut h = vec![0.0; hsz];
        let mut c = vec![0.0; hsz];
        let mut caches = Vec::with_capacity(sequence.len());
        let mut z = vec![0.0; 4 * hsz];

        for &x in sequence {
            for (k, zk) in z.iter_mut().enumerate() {
                let row = &w_h[k * hsz..(k + 1) * hsz];
                let recurrent: f64 = row.iter().zip(&h).map(|(w, h)| w * h).sum();
                *zk = w_x[k] * x + recurrent + b[k];
            }

            let i: Vec<f64> = z[0..hsz].iter().map(|&v| sigmoid(v)).collect();
            let f: Vec<f64> = z[hsz..2 * hsz].iter().map(|&v| sigmoid(v)).collect();
            let g: Vec<f64> = z[2 * hsz..3 * hsz].iter().map(|&v| v.tanh()).collect();
            let o: Vec<f64> = z[3 * hsz..4 * hsz].iter().map(|&v| sigmoid(v)).collect();

            let c_next: Vec<f64> = (0..hsz).map(|j| f[j] * c[j] + i[j] * g[j]).collect();
            let tanh_c: Vec<f64> = c_next.iter().map(|v| v.tanh()).collect();
            let h_next: Vec<f64> = (0..hsz).map(|j| o[j] * tanh_c[j]).collect();

            caches.push(StepCache {
                x,
                h_prev: std::mem::replace(&mut h, h_next),
                c_prev: std::mem::replace(&mut c, c_next),
                i,
                f,
                g,
                o,
                tanh_c,
            });
        }

        (h, caches)
    }

    /// Accumulate the gradient of `scale * (y - target)^2` into `grads` and
    /// return the squared error.
    fn accumulate_gradients(&self, sequence: &[f64], target: f64, scale: f64, grads: &mut [f64]) -> f64 {
        let hsz = self.hidden;
        let (h_last, caches) = self.run_sequence(sequence);
        let prediction = self.project(&h_last);
        let error = prediction - target;
        let dy = 2.0 * error * scale;

        let w_h_off = self.w_h_offset();
        let b_off = self.b_offset();
        let w_out_off = self.w_out_offset();
        let b_out_off = self.b_out_offset();

        for j in 0..hsz {
            grads[w_out_off + j] += dy * h_last[j];
        }
        grads[b_out_off] += dy;

        let mut dh: Vec<f64> = self.params[w_out_off..b_out_off].iter().map(|w| w * dy).collect();
        let mut dc = vec![0.0; hsz];
        let mut dz = vec![0.0; 4 * hsz];

        for step in caches.iter().rev() {
            for j in 0..hsz {
                let d_o = dh[j] * step.tanh_c[j];
                dc[j] += dh[j] * step.o[j] * (1.0 - step.tanh_c[j] * step.tanh_c[j]);

                let d_i = dc[j] * step.g[j];
                let d_g = dc[j] * step.i[j];
                let d_f = dc[j] * step.c_prev[j];

                dz[j] = d_i * step.i[j] * (1.0 - step.i[j]);
                dz[hsz + j] = d_f * step.f[j] * (1.0 - step.f[j]);
                dz[2 * hsz + j] = d_g * (1.0 - step.g[j] * step.g[j]);
                dz[3 * hsz + j] = d_o * step.o[j] * (1.0 - step.o[j]);

                dc[j] *= step.f[j];
            }

            let mut dh_prev = vec![0.0; hsz];
            for (k, &dzk) in dz.iter().enumerate() {
                grads[k] += dzk * step.x;
                grads[b_off + k] += dzk;
                let row = w_h_off + k * hsz;
                for j in 0..hsz {
                    grads[row + j] += dzk * step.h_prev[j];
                    dh_prev[j] += self.params[row + j] * dzk;
                }
            }
            dh = dh_prev;
        }

        error * error
    }

    /// Full-batch training; returns the loss of each epoch
    pub fn train(&mut self, inputs: &[Vec<f64>], targets: &[f64], epochs: usize, learning_rate: f64) -> Vec<f64> {
        let mut optimizer = Adam::new(learning_rate);
        let mut losses = Vec::with_capacity(epochs);
        let n = inputs.len().max(1) as f64;
        let scale = 1.0 / n;

        for epoch in 0..epochs {
            let mut grads = vec![0.0; self.params.len()];
            let mut loss = 0.0;
            for (sequence, &target) in inputs.iter().zip(targets) {
                loss += self.accumulate_gradients(sequence, target, scale, &mut grads);
            }
            loss /= n;
            optimizer.apply_gradients(&mut self.params, &grads);
            losses.push(loss);

            if epoch % 20 == 0 || epoch + 1 == epochs {
                debug!(epoch, loss, "lstm training");
            }
        }

        losses
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Adam with the usual defaults (beta1 0.9, beta2 0.999, epsilon 1e-8)
#[derive(Debug, Clone)]
struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

impl Adam {
    fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    fn apply_gradients(&mut self, params: &mut [f64], gradients: &[f64]) {
        if self.m.len() != params.len() {
            self.m = vec![0.0; params.len()];
            self.v = vec![0.0; params.len()];
        }

        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t);

        for (i, (p, g)) in params.iter_mut().zip(gradients).enumerate() {
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;

            let m_hat = self.m[i] / bias_correction1;
            let v_hat = self.v[i] / bias_correction2;
            *p -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn toy_set() -> WindowSet {
        let series: Vec<f64> = (0..20).map(|i| 0.5 + 0.4 * (i as f64 * 0.7).sin()).collect();
        WindowSet::from_series(&series, 4).unwrap()
    }

    #[test]
    fn test_param_layout() {
        let net = LstmNetwork::new(3, 1);
        assert_eq!(net.params.len(), LstmNetwork::param_count(3));
        assert_eq!(net.b_out_offset(), net.params.len() - 1);
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = LstmNetwork::new(8, 7);
        let b = LstmNetwork::new(8, 7);
        assert_eq!(a.params, b.params);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let mut net = LstmNetwork::new(3, 11);
        let sequence = [0.2, 0.7, 0.4];
        let target = 0.9;

        let mut grads = vec![0.0; net.params.len()];
        net.accumulate_gradients(&sequence, target, 1.0, &mut grads);

        let loss = |net: &LstmNetwork| (net.forward(&sequence) - target).powi(2);
        let h = 1e-6;
        for idx in [0, 5, 14, 20, 40, 47, net.params.len() - 2, net.params.len() - 1] {
            let original = net.params[idx];
            net.params[idx] = original + h;
            let up = loss(&net);
            net.params[idx] = original - h;
            let down = loss(&net);
            net.params[idx] = original;

            let numeric = (up - down) / (2.0 * h);
            assert_abs_diff_eq!(grads[idx], numeric, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_training_reduces_loss() {
        let set = toy_set();
        let mut net = LstmNetwork::new(10, 3);
        let losses = net.train(set.inputs(), set.targets(), 60, 0.01);

        assert_eq!(losses.len(), 60);
        assert!(losses[59] < losses[0]);
    }

    #[test]
    fn test_fit_runs_configured_epochs() {
        let config = LstmConfig {
            hidden_size: 6,
            epochs: 15,
            ..LstmConfig::default()
        };
        let set = toy_set();
        let fitted = Lstm::new(config).fit(&set).unwrap();
        let predictions = fitted.predict(set.inputs()).unwrap();
        assert_eq!(predictions.len(), set.len());
    }
}
