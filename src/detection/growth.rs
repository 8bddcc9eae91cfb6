//! Open interest growth over a lookback window

use crate::exchange::OiItem;

/// Growth in percent from the latest running minimum to the highest reading after it
///
/// Readings older than `since_ms` are ignored. A new minimum resets the
/// running maximum, so a later dip discards any peak seen before it.
///
/// Returns `None` when no reading falls inside the window or the minimum is
/// zero.
pub fn calculate_growth_pct(items: &[OiItem], since_ms: i64) -> Option<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut found = false;

    for item in items.iter().filter(|i| i.timestamp >= since_ms) {
        if item.value < min {
            found = true;
            min = item.value;
            max = item.value;
        }
        if item.value > max {
            max = item.value;
        }
    }

    if !found || min == 0.0 {
        return None;
    }

    Some((max - min) / min * 100.0)
}
