//! EMA (Exponential Moving Average) indicator

/// Latest EMA over the series, or `None` when shorter than `period`.
///
/// Seeded with the SMA of the first `period` values, then
/// `ema = value * k + ema * (1 - k)` with `k = 2 / (period + 1)`.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().map(|&(_, v)| v)
}

/// Every intermediate EMA value paired with its source index. The first
/// entry sits at index `period - 1` (the seed); empty when the series is
/// shorter than `period`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<(usize, f64)> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push((period - 1, seed));

    let mut current = seed;
    for (i, &value) in values.iter().enumerate().skip(period) {
        current = value * k + current * (1.0 - k);
        out.push((i, current));
    }

    out
}
