/// Formats a number using Indian digit grouping (lakhs/crores):
/// last three digits, then groups of two. 13762563 -> "1,37,62,563".
pub fn indian_int(value: i64) -> String {
    let is_negative = value < 0;
    let digits = value.unsigned_abs().to_string();

    let grouped = group_indian(&digits);
    if is_negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Formats a float with Indian digit grouping. Whole values render without
/// a decimal part; fractional values keep two decimal places.
pub fn indian_number(value: f64) -> String {
    let is_negative = value < 0.0;
    let num = value.abs();

    let (integer_part, decimal_part) = if num == num.trunc() {
        (format!("{}", num.trunc() as u64), String::new())
    } else {
        let s = format!("{:.2}", num);
        match s.split_once('.') {
            Some((i, d)) => (i.to_string(), d.to_string()),
            None => (s, String::new()),
        }
    };

    let mut result = group_indian(&integer_part);
    if !decimal_part.is_empty() {
        result.push('.');
        result.push_str(&decimal_part);
    }
    if is_negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Indian grouping over a plain digit string: first 3 from the right,
/// then every 2.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let reversed: Vec<char> = digits.chars().rev().collect();
    let mut parts: Vec<String> = Vec::new();

    parts.push(reversed[..3].iter().collect());
    for chunk in reversed[3..].chunks(2) {
        parts.push(chunk.iter().collect());
    }

    parts.join(",").chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_int() {
        assert_eq!(indian_int(0), "0");
        assert_eq!(indian_int(527), "527");
        assert_eq!(indian_int(1650), "1,650");
        assert_eq!(indian_int(100000), "1,00,000");
        assert_eq!(indian_int(13762563), "1,37,62,563");
        assert_eq!(indian_int(-13762563), "-1,37,62,563");
    }

    #[test]
    fn test_indian_number_whole() {
        assert_eq!(indian_number(0.0), "0");
        assert_eq!(indian_number(1650.0), "1,650");
        assert_eq!(indian_number(13762563.0), "1,37,62,563");
    }

    #[test]
    fn test_indian_number_fractional() {
        assert_eq!(indian_number(1234.5), "1,234.50");
        assert_eq!(indian_number(100000.25), "1,00,000.25");
        assert_eq!(indian_number(-42.75), "-42.75");
    }
}
