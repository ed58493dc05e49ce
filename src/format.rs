//! Formatting of totals for summary labels.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

/// Format `number` as a dollar amount with two decimal places, e.g. "$1,234.50".
///
/// Negative amounts are written with a leading minus sign, e.g. "-$12.30".
pub fn currency(number: f64) -> String {
    let number = round_to_cents(number);

    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .expect("\"$\" is a valid currency prefix")
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .expect("\"-$\" is a valid currency prefix")
            .precision(Precision::Decimals(2))
    });

    let formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for
        // zero. This also covers negative zero.
        return "$0.00".to_owned();
    };

    pad_decimals(formatted_string)
}

/// Round `number` to the nearest cent.
///
/// Sums of amounts that cancel out, e.g. `0.1 + 0.2 - 0.3`, leave a tiny
/// remainder that would otherwise be shown in scientific notation.
pub(crate) fn round_to_cents(number: f64) -> f64 {
    (number * 100.0).round() / 100.0
}

/// numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3" and "7.00"
/// as "7", so restore them.
fn pad_decimals(mut formatted_string: String) -> String {
    match formatted_string.rfind('.') {
        None => formatted_string.push_str(".00"),
        Some(dot) if formatted_string.len() - dot == 2 => formatted_string.push('0'),
        Some(_) => {}
    }

    formatted_string
}

#[cfg(test)]
mod tests {
    use super::{currency, pad_decimals, round_to_cents};

    #[test]
    fn zero_has_two_decimals() {
        assert_eq!(currency(0.0), "$0.00");
    }

    #[test]
    fn positive_amounts() {
        assert_eq!(currency(12.34), "$12.34");
        assert_eq!(currency(12.3), "$12.30");
    }

    #[test]
    fn negative_amounts() {
        assert_eq!(currency(-45.99), "-$45.99");
        assert_eq!(currency(-12.3), "-$12.30");
    }

    #[test]
    fn whole_amounts_get_decimals() {
        assert_eq!(currency(7.0), "$7.00");
    }

    #[test]
    fn amounts_that_cancel_out_are_zero() {
        assert_eq!(currency(0.1 + 0.2 - 0.3), "$0.00");
        assert_eq!(currency(0.3 - 0.2 - 0.1), "$0.00");
        assert_eq!(currency(-0.0), "$0.00");
    }

    #[test]
    fn fractions_of_a_cent_are_rounded() {
        assert_eq!(currency(0.004), "$0.00");
        assert_eq!(currency(0.006), "$0.01");
        assert_eq!(currency(-0.006), "-$0.01");
        assert_eq!(currency(19.999), "$20.00");
    }

    #[test]
    fn round_to_cents_removes_float_noise() {
        assert_eq!(round_to_cents(0.1 + 0.2), 0.3);
        assert_eq!(round_to_cents(0.1 + 0.2 - 0.3), 0.0);
        assert_eq!(round_to_cents(12.345_6), 12.35);
    }

    #[test]
    fn pad_decimals_fills_missing_digits() {
        assert_eq!(pad_decimals("$7".to_owned()), "$7.00");
        assert_eq!(pad_decimals("$7.5".to_owned()), "$7.50");
        assert_eq!(pad_decimals("$7.55".to_owned()), "$7.55");
    }
}
