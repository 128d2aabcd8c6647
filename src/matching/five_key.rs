use std::collections::BTreeSet;

use super::{intersection_size, HitDescriptor};
use crate::draws::models::{Digit, GameType, HitCategory, Number};

pub fn evaluate(
    numbers: &BTreeSet<Number>,
    key: Option<&Digit>,
    winning: &BTreeSet<Number>,
    winning_key: Option<&Digit>,
) -> HitDescriptor {
    HitDescriptor::FiveKey {
        numbers_matched: intersection_size(numbers, winning),
        key_matched: matches!((key, winning_key), (Some(a), Some(b)) if a == b),
    }
}

/// Key with fewer than two numbers is the key-only refund "R"; otherwise
/// "{numbers}" plus "+C" when the key matched. Codes outside the vocabulary
/// ("1", "0") carry no prize.
pub fn category(numbers_matched: u8, key_matched: bool) -> Option<HitCategory> {
    if numbers_matched == 0 && !key_matched {
        return None;
    }
    if key_matched && numbers_matched < 2 {
        return Some(HitCategory::key_only());
    }
    let code = format!("{}{}", numbers_matched, if key_matched { "+C" } else { "" });
    HitCategory::lookup(GameType::FiveKey, &code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<Number> {
        values.iter().map(|v| Number::parse(v).unwrap()).collect()
    }

    #[test]
    fn test_two_numbers_plus_key_example() {
        let key = Digit::parse("7").unwrap();
        let hit = evaluate(
            &set(&["10", "20", "30"]),
            Some(&key),
            &set(&["10", "20", "99", "98", "97"]),
            Some(&key),
        );
        assert_eq!(
            hit,
            HitDescriptor::FiveKey {
                numbers_matched: 2,
                key_matched: true,
            }
        );
        assert_eq!(hit.category().unwrap().code(), "2+C");
    }

    #[test]
    fn test_key_only_refund() {
        assert_eq!(category(0, true).unwrap().code(), "R");
        assert_eq!(category(1, true).unwrap().code(), "R");
        assert_eq!(category(3, true).unwrap().code(), "3+C");
    }

    #[test]
    fn test_codes_outside_vocabulary() {
        assert!(category(0, false).is_none());
        assert!(category(1, false).is_none());
        assert_eq!(category(2, false).unwrap().code(), "2");
        assert_eq!(category(5, false).unwrap().code(), "5");
    }

    #[test]
    fn test_key_compared_without_leading_zeros() {
        let hit = evaluate(
            &set(&["01"]),
            Some(&Digit::parse("07").unwrap()),
            &set(&["40", "41", "42", "43", "44"]),
            Some(&Digit::parse("7").unwrap()),
        );
        assert_eq!(hit.category().unwrap().code(), "R");
    }
}
