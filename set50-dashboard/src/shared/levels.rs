//! Fibonacci retracement levels between a swing high and swing low

/// Retracement fractions in display order
pub const FIB_RATIOS: [(&str, f64); 6] = [
    ("0.0%", 0.0),
    ("23.6%", 0.236),
    ("38.2%", 0.382),
    ("50.0%", 0.5),
    ("61.8%", 0.618),
    ("100.0%", 1.0),
];

#[derive(Clone, Debug, PartialEq)]
pub struct RetracementLevel {
    pub label: &'static str,
    pub fraction: f64,
    pub price: f64,
}

/// Levels measured down from `swing_high`
///
/// No ordering is enforced between the inputs; an inverted swing simply
/// produces inverted levels.
pub fn compute_levels(swing_high: f64, swing_low: f64) -> Vec<RetracementLevel> {
    let range = swing_high - swing_low;

    FIB_RATIOS
        .iter()
        .map(|&(label, fraction)| RetracementLevel {
            label,
            fraction,
            price: swing_high - range * fraction,
        })
        .collect()
}

/// Level closest to `price`
pub fn nearest_level(levels: &[RetracementLevel], price: f64) -> Option<&RetracementLevel> {
    levels.iter().min_by(|a, b| {
        (a.price - price)
            .abs()
            .total_cmp(&(b.price - price).abs())
    })
}
