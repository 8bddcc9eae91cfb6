//! Alert message text

use crate::detection::OiSpike;

/// Human-readable alert for an open interest spike
pub fn create_text(spike: &OiSpike) -> String {
    let direction_emoji = if spike.change_pct >= 0.0 { "🚀" } else { "🔻" };

    let header = format!("{direction_emoji} Sharp OI growth: {}", spike.symbol);

    let body = format!(
        "Open interest up {:.2}%\nDaily price change: {:.2}%\nDaily volume: {} $",
        spike.change_pct,
        spike.daily_price_change_pct,
        make_human_readable(spike.daily_volume)
    );

    match spike.exchange.trade_url(spike.market_type, &spike.symbol) {
        Some(link) => format!("{header}\n\n{body}\n\n{link}"),
        None => format!("{header}\n\n{body}"),
    }
}

/// Compact number with K/M/B/T suffix, two decimals
pub fn make_human_readable(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let abs = value.abs();
    for (scale, suffix) in UNITS {
        if abs >= scale {
            return format!("{:.2}{}", value / scale, suffix);
        }
    }
    format!("{value:.2}")
}
