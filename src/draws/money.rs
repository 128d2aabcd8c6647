// Euro amounts in the es-ES locale: "." groups thousands, "," separates the
// two decimals, and the currency sign trails after a space ("234.122,00 €").

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Format an amount as "1.234,56 €"
pub fn format_eur(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}{},{} €", if negative { "-" } else { "" }, grouped, frac_part)
}

/// Parse a locale-formatted euro string back into a decimal.
///
/// Returns `None` when nothing numeric remains after stripping the currency
/// sign, non-breaking spaces and thousands separators.
pub fn parse_eur(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '€' | '?' | '\u{a0}' | '.') && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.trim_end_matches("EUR").replace(',', ".");

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// A payout amount carrying both its decimal value and formatted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn formatted(&self) -> String {
        format_eur(self.0)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

#[derive(Serialize)]
struct MoneyRepr {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    formatted: String,
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MoneyRepr {
            amount: self.0,
            formatted: self.formatted(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_eur() {
        assert_eq!(format_eur(dec!(11.58)), "11,58 €");
        assert_eq!(format_eur(dec!(234122)), "234.122,00 €");
        assert_eq!(format_eur(dec!(1234567.5)), "1.234.567,50 €");
        assert_eq!(format_eur(dec!(0)), "0,00 €");
        assert_eq!(format_eur(dec!(-3.5)), "-3,50 €");
    }

    #[test]
    fn test_parse_eur() {
        assert_eq!(parse_eur("11,58 €"), Some(dec!(11.58)));
        assert_eq!(parse_eur("234.122,00 €"), Some(dec!(234122.00)));
        assert_eq!(parse_eur("1.000\u{a0}€"), Some(dec!(1000)));
        assert_eq!(parse_eur("2,00 ?"), Some(dec!(2.00)));
        assert_eq!(parse_eur(" € "), None);
        assert_eq!(parse_eur("bote"), None);
    }

    #[test]
    fn test_format_parse_round_trip() {
        for amount in [dec!(0.01), dec!(8.00), dec!(999.99), dec!(1000), dec!(17654321.09)] {
            assert_eq!(parse_eur(&format_eur(amount)), Some(amount));
        }
    }

    #[test]
    fn test_money_serializes_both_forms() {
        let json = serde_json::to_value(Money(dec!(10.00))).unwrap();
        assert_eq!(json["amount"], serde_json::json!(10.0));
        assert_eq!(json["formatted"], serde_json::json!("10,00 €"));
    }
}
