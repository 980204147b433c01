/// Placeholder shown for unknown values.
pub const UNKNOWN: &str = "—";

pub fn format_km(distance_km: Option<f64>) -> String {
    match distance_km {
        Some(distance) => format!("{distance:.2}"),
        None => UNKNOWN.to_owned(),
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.2}%"),
        None => UNKNOWN.to_owned(),
    }
}

/// Thousands-grouped count, e.g. `12,345`.
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Hermite ease on `[0, 1]`; inputs outside are clamped.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_numbers_render_as_a_dash() {
        assert_eq!(format_km(None), "—");
        assert_eq!(format_km(Some(3.14159)), "3.14");
        assert_eq!(format_percent(Some(-12.5)), "-12.50%");
    }

    #[test]
    fn counts_are_grouped_by_thousands() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn smoothstep_is_flat_at_the_ends() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(2.0), 1.0);
    }
}
