//! Comma-grouped number formatting for money inputs.
//!
//! `format_with_commas` and `parse_formatted` are inverses for any value
//! this module can produce: grouping touches only the integer digit run,
//! so `parse_formatted(&format_with_commas(s))` recovers the number in `s`.

/// Inserts a grouping comma every three digits of the integer portion,
/// counting left from the decimal point (or end of string). The sign and
/// any fractional tail pass through untouched. Empty input stays empty.
pub fn format_with_commas(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let (sign, rest) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    let int_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (int_part, tail) = rest.split_at(int_end);
    if int_part.len() <= 3 {
        return value.to_string();
    }
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}{tail}")
}

/// Stringifies a number and groups it. NaN stringifies to "NaN" and passes
/// through ungrouped.
pub fn format_f64(value: f64) -> String {
    format_with_commas(&value.to_string())
}

/// Strips grouping commas and parses as a float. Empty parses to 0 (the
/// "unset means unknown" rule lives in the profit model, not here); text
/// that still fails to parse becomes NaN rather than an error.
pub fn parse_formatted(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    text.replace(',', "").trim().parse().unwrap_or(f64::NAN)
}

/// Re-anchors the caret after the displayed text was reformatted in place.
///
/// This is the length-delta heuristic `old + (new.len - old.len)`: correct
/// whenever grouping commas only appear or disappear before the caret,
/// which is the common typing case. It can misplace the caret when commas
/// shift on both sides of it at once; that is a known limitation kept for
/// compatibility with the established editing feel.
pub fn remap_caret(old_caret: usize, old_text: &str, new_text: &str) -> usize {
    let shifted = old_caret as isize + (new_text.len() as isize - old_text.len() as isize);
    shifted.clamp(0, new_text.len() as isize) as usize
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn format_empty_is_empty() {
        assert_eq!(format_with_commas(""), "");
    }

    #[test]
    fn format_short_numbers_unchanged() {
        assert_eq!(format_with_commas("0"), "0");
        assert_eq!(format_with_commas("999"), "999");
    }

    #[test]
    fn format_groups_every_three_digits() {
        assert_eq!(format_with_commas("1000"), "1,000");
        assert_eq!(format_with_commas("300000"), "300,000");
        assert_eq!(format_with_commas("1234567"), "1,234,567");
    }

    #[test]
    fn format_leaves_fraction_untouched() {
        assert_eq!(format_with_commas("1234.5678"), "1,234.5678");
        assert_eq!(format_with_commas("74180.00"), "74,180.00");
    }

    #[test]
    fn format_keeps_sign() {
        assert_eq!(format_with_commas("-74180.00"), "-74,180.00");
        assert_eq!(format_with_commas("-500"), "-500");
    }

    #[test]
    fn format_passes_non_numeric_through() {
        assert_eq!(format_with_commas("NaN"), "NaN");
    }

    #[test]
    fn format_f64_stringifies_then_groups() {
        assert_eq!(format_f64(1234567.0), "1,234,567");
        assert_eq!(format_f64(1234.5), "1,234.5");
    }

    #[test]
    fn parse_empty_is_zero() {
        assert_eq!(parse_formatted(""), 0.0);
    }

    #[test]
    fn parse_strips_commas() {
        assert_eq!(parse_formatted("1,234,567"), 1234567.0);
        assert_eq!(parse_formatted("300,000"), 300000.0);
    }

    #[test]
    fn parse_plain_numbers() {
        assert_eq!(parse_formatted("6"), 6.0);
        assert_eq!(parse_formatted("0.5"), 0.5);
        assert_eq!(parse_formatted("-3,000"), -3000.0);
    }

    #[test]
    fn parse_garbage_is_nan() {
        assert!(parse_formatted("abc").is_nan());
        assert!(parse_formatted("12abc").is_nan());
    }

    #[test]
    fn remap_caret_follows_inserted_comma() {
        // "1234" caret after last digit -> "1,234" caret still after it
        assert_eq!(remap_caret(4, "1234", "1,234"), 5);
    }

    #[test]
    fn remap_caret_follows_removed_comma() {
        // deleting the last digit of "1,234" collapses the group
        assert_eq!(remap_caret(4, "1,23", "123"), 3);
    }

    #[test]
    fn remap_caret_clamps_to_bounds() {
        assert_eq!(remap_caret(0, "1,234", "1234"), 0);
        assert_eq!(remap_caret(2, "0.", "0"), 1);
        assert_eq!(remap_caret(9, "123", "123456"), 6);
    }

    proptest! {
        // Round-trip holds for any integer the formatter will see in
        // practice: up to 15 digits, exactly representable in an f64.
        #[test]
        fn parse_format_round_trip(n in 0u64..1_000_000_000_000_000) {
            let formatted = format_with_commas(&n.to_string());
            prop_assert_eq!(parse_formatted(&formatted), n as f64);
        }

        #[test]
        fn format_parse_round_trip_on_own_output(n in 0u64..1_000_000_000_000_000) {
            let formatted = format_with_commas(&n.to_string());
            prop_assert_eq!(format_f64(parse_formatted(&formatted)), formatted);
        }
    }
}
