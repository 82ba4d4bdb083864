//! OBV (On-Balance Volume) indicator

/// Final OBV value: cumulative volume signed by close direction, starting at
/// 0 on the first bar. A flat close leaves the running value unchanged.
pub fn obv(prices: &[f64], volumes: &[f64]) -> Option<f64> {
    obv_series(prices, volumes).last().copied()
}

/// Running OBV value at every index. Empty when the inputs are empty or the
/// two series differ in length.
pub fn obv_series(prices: &[f64], volumes: &[f64]) -> Vec<f64> {
    if prices.is_empty() || prices.len() != volumes.len() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(prices.len());
    let mut running = 0.0;
    out.push(running);

    for i in 1..prices.len() {
        if prices[i] > prices[i - 1] {
            running += volumes[i];
        } else if prices[i] < prices[i - 1] {
            running -= volumes[i];
        }
        out.push(running);
    }

    out
}
