//! RSI (Relative Strength Index) indicator

/// RSI = 100 - (100 / (1 + RS)), RS = average gain / average loss.
///
/// The first `period` deltas seed the averages; the rest are folded in with
/// Wilder smoothing: `avg = (avg * (period - 1) + value) / period`.
/// Needs at least `period + 1` prices. Returns exactly 100 when the average
/// loss is zero.
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += change.abs();
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    for i in (period + 1)..prices.len() {
        let change = prices[i] - prices[i - 1];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, change.abs())
        };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// RSI with the default period (14).
pub fn rsi_default(prices: &[f64]) -> Option<f64> {
    rsi(prices, 14)
}
