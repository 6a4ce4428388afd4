/// Plain number display, `NaN` included, without trailing `.0` on integers.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Follower counts in millions, e.g. `475.8m`.
pub fn format_millions(value: f64) -> String {
    format!("{}m", value / 1e6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_like_plain_decimals() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(3.25), "3.25");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn followers_render_in_millions() {
        assert_eq!(format_millions(475_800_000.0), "475.8m");
        assert_eq!(format_millions(500_000.0), "0.5m");
        assert_eq!(format_millions(f64::NAN), "NaNm");
    }
}
