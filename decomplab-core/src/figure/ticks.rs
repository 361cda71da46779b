//! Numeric tick placement and label formatting.
//!
//! - `nice_ticks`: 1/2/2.5/5/10 step locator
//! - `format_general`: `%g`-style significant-digit formatting
//! - `percent_label`: `0.123` → `"12.3%"`

const STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Tick positions inside `[lo, hi]` using at most `max_bins` intervals of a
/// "nice" step (1, 2, 2.5 or 5 times a power of ten).
pub fn nice_ticks(lo: f64, hi: f64, max_bins: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() || max_bins == 0 {
        return Vec::new();
    }
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if hi - lo <= f64::EPSILON * hi.abs().max(1.0) {
        return vec![clean(lo)];
    }

    let raw = (hi - lo) / max_bins as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = STEPS
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw * (1.0 - 1e-9))
        .unwrap_or(10.0 * magnitude);

    let eps = step * 1e-9;
    let first = ((lo - eps) / step).ceil() as i64;
    let last = ((hi + eps) / step).floor() as i64;
    (first..=last).map(|k| clean(k as f64 * step)).collect()
}

/// Collapse `-0.0` and float noise around zero.
fn clean(v: f64) -> f64 {
    if v.abs() < 1e-12 {
        0.0
    } else {
        v
    }
}

/// Format with `precision` significant digits the way `%g` does: fixed
/// notation for moderate exponents, scientific otherwise, trailing zeros
/// stripped.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let precision = precision.max(1);

    // Exponent after rounding to `precision` significant digits.
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(&mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value))
    }
}

fn strip_trailing_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Percentage tick label with four significant digits.
pub fn percent_label(fraction: f64) -> String {
    format!("{}%", format_general(clean(100.0 * fraction), 4))
}
