//! Oscillator indicators

use crate::moving_averages::SimpleMovingAverage;
use crate::Result;

/// Relative Strength Index using simple rolling means of gains and losses.
///
/// Price changes are first differences, so the first point has no change and
/// the first `window` positions have no value. An RSI of 100 is reported when
/// the window holds gains but no losses; a window without any movement has no
/// value.
pub fn rolling_rsi(prices: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut gains = SimpleMovingAverage::new(window)?;
    let mut losses = SimpleMovingAverage::new(window)?;
    let mut out = Vec::with_capacity(prices.len());

    if prices.is_empty() {
        return Ok(out);
    }
    out.push(None);

    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        gains.update(change.max(0.0));
        losses.update((-change).max(0.0));

        let rsi = match (gains.value(), losses.value()) {
            (Some(avg_gain), Some(avg_loss)) => rsi_from_averages(avg_gain, avg_loss),
            _ => None,
        };
        out.push(rsi);
    }

    Ok(out)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { Some(100.0) } else { None };
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
