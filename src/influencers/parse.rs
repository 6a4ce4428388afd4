use serde::Deserialize;

/// A numeric cell as it appears in the source: already a number (JSON) or
/// free text that may carry a magnitude suffix (CSV).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Numeric value with `m`/`k`/`b` suffixes expanded.
    pub fn magnitude(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => parse_magnitude(text),
        }
    }

    /// Numeric value without suffix handling.
    pub fn plain(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => parse_float_prefix(text),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

pub fn parse_magnitude(text: &str) -> f64 {
    let value = text.trim().to_lowercase();
    let multiplier = match value.chars().last() {
        Some('m') => 1e6,
        Some('k') => 1e3,
        Some('b') => 1e9,
        _ => return parse_float_prefix(&value),
    };
    parse_float_prefix(&value) * multiplier
}

/// Parses the longest leading decimal literal and ignores whatever follows,
/// so `"1.39%"` is `1.39` and `"abc"` is NaN.
pub fn parse_float_prefix(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0usize;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let integer_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - integer_start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while bytes.get(fraction_end).is_some_and(u8::is_ascii_digit) {
            fraction_end += 1;
        }
        digits += fraction_end - fraction_start;
        if digits > 0 {
            end = fraction_end;
        }
    }

    if digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits_start = exponent_end;
        while bytes.get(exponent_end).is_some_and(u8::is_ascii_digit) {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits_start {
            end = exponent_end;
        }
    }

    text[..end].parse::<f64>().unwrap_or(f64::NAN)
}
