pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Share of `part` in `total` as a percentage rounded to one decimal
pub fn percentage(part: u64, total: u64) -> Option<f64> {
    match total {
        0 => None,
        total => Some(round_to_tenth(part as f64 / total as f64 * 100.0)),
    }
}

/// Group thousands the way the metrics panel prints milliseconds, e.g. `12,345`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(66.666), 66.7);
        assert_eq!(round_to_tenth(33.333), 33.3);
        assert_eq!(round_to_tenth(20.0), 20.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1000, 5000), Some(20.0));
        assert_eq!(percentage(2000, 3000), Some(66.7));
        assert_eq!(percentage(0, 3000), Some(0.0));
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(0, 0), None);
        assert_eq!(percentage(5, 0), None);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
