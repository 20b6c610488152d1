//! Display strings for counts. "Unknown" and "zero" stay distinct here: an
//! absent value renders as an em dash, never as `0`.

pub const EM_DASH: &str = "\u{2014}";

const COMPACT_UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

fn trim_fraction(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Short form with at most one fraction digit: `950`, `1.2K`, `15.3K`, `4M`.
pub fn compact(value: u64) -> String {
    let amount = value as f64;
    let Some(position) = COMPACT_UNITS.iter().position(|(unit, _)| amount >= *unit) else {
        return value.to_string();
    };

    let (unit, suffix) = COMPACT_UNITS[position];
    let scaled = (amount / unit * 10.0).round() / 10.0;
    if scaled >= 1000.0 && position > 0 {
        let (larger_unit, larger_suffix) = COMPACT_UNITS[position - 1];
        let rescaled = (amount / larger_unit * 10.0).round() / 10.0;
        return format!("{}{}", trim_fraction(rescaled), larger_suffix);
    }
    format!("{}{}", trim_fraction(scaled), suffix)
}

/// Thousands-separated form: `1,234,567`.
pub fn grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

pub fn compact_or_dash(value: Option<u64>) -> String {
    value.map(compact).unwrap_or_else(|| EM_DASH.to_string())
}

pub fn grouped_or_dash(value: Option<u64>) -> String {
    value.map(grouped).unwrap_or_else(|| EM_DASH.to_string())
}
