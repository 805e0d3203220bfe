//! Number formatting for tables and notifications.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format with thousands separators and at most `max_fraction_digits`
/// fractional digits, trailing zeros removed.
pub fn money_format(value: Decimal, max_fraction_digits: u32) -> String {
    let rounded = value
        .round_dp_with_strategy(max_fraction_digits, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    group_thousands(&rounded.to_string())
}

/// Token price or amount: two decimals above one, five below.
pub fn crypto_format(value: Decimal) -> String {
    if value.abs() >= Decimal::ONE {
        money_format(value, 2)
    } else {
        money_format(value, 5)
    }
}

/// USD amount with a dollar sign and at least two decimals.
pub fn currency_format(value: Decimal) -> String {
    let digits = if value.is_zero() || value.abs() >= Decimal::new(1, 2) {
        2
    } else {
        6
    };
    let mut rounded =
        value.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    if rounded.scale() < 2 {
        rounded.rescale(2);
    }
    let text = group_thousands(&rounded.to_string());
    match text.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${text}"),
    }
}

fn group_thousands(s: &str) -> String {
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_format() {
        assert_eq!(money_format(dec!(1234567.891), 2), "1,234,567.89");
        assert_eq!(money_format(dec!(1234.5), 2), "1,234.5");
        assert_eq!(money_format(dec!(999), 2), "999");
        assert_eq!(money_format(dec!(-1000), 0), "-1,000");
    }

    #[test]
    fn test_crypto_format() {
        assert_eq!(crypto_format(dec!(312.456)), "312.46");
        assert_eq!(crypto_format(dec!(0.0123456)), "0.01235");
    }

    #[test]
    fn test_currency_format() {
        assert_eq!(currency_format(dec!(15.6)), "$15.60");
        assert_eq!(currency_format(dec!(1234.5)), "$1,234.50");
        assert_eq!(currency_format(dec!(0.000512)), "$0.000512");
        assert_eq!(currency_format(Decimal::ZERO), "$0.00");
        assert_eq!(currency_format(dec!(-2)), "-$2.00");
    }
}
