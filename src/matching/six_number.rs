use std::collections::BTreeSet;

use super::{intersection_size, HitDescriptor};
use crate::draws::models::{Digit, GameType, HitCategory, Number};

/// The complement only counts at exactly five matched numbers; it is not
/// looked at otherwise. A missing reseed on either side never matches.
pub fn evaluate(
    numbers: &BTreeSet<Number>,
    reseed: Option<&Digit>,
    winning: &BTreeSet<Number>,
    complement: Option<&Number>,
    winning_reseed: Option<&Digit>,
) -> HitDescriptor {
    let numbers_matched = intersection_size(numbers, winning);
    let complement_matched =
        numbers_matched == 5 && complement.map_or(false, |c| numbers.contains(c));
    let reseed_matched = matches!((reseed, winning_reseed), (Some(a), Some(b)) if a == b);

    HitDescriptor::SixNumber {
        numbers_matched,
        complement_matched,
        reseed_matched,
    }
}

pub fn category(numbers_matched: u8, complement_matched: bool, reseed_matched: bool) -> Option<HitCategory> {
    let code = match numbers_matched {
        6 if reseed_matched => "6+R",
        6 => "6",
        5 if complement_matched => "5+C",
        5 => "5",
        4 => "4",
        3 => "3",
        _ if reseed_matched => "R",
        _ => return None,
    };
    HitCategory::lookup(GameType::SixNumber, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<Number> {
        values.iter().map(|v| Number::parse(v).unwrap()).collect()
    }

    fn code(hit: HitDescriptor) -> Option<&'static str> {
        hit.category().map(|c| c.code())
    }

    #[test]
    fn test_five_plus_complement_beats_five() {
        let ticket = set(&["01", "02", "03", "04", "05", "06"]);
        let winning = set(&["01", "02", "03", "04", "05", "40"]);
        let complement = Number::parse("6").unwrap();

        let hit = evaluate(&ticket, None, &winning, Some(&complement), None);
        assert_eq!(code(hit), Some("5+C"));

        let other = Number::parse("41").unwrap();
        let hit = evaluate(&ticket, None, &winning, Some(&other), None);
        assert_eq!(code(hit), Some("5"));
    }

    #[test]
    fn test_complement_ignored_outside_five_matches() {
        let winning = set(&["01", "02", "03", "04", "05", "06"]);
        let complement = Number::parse("49").unwrap();

        // Each ticket contains the complement; matched counts 0,1,2,3,4,6
        let tickets = [
            (set(&["49", "10", "11", "12", "13", "14"]), None),
            (set(&["49", "01", "11", "12", "13", "14"]), None),
            (set(&["49", "01", "02", "12", "13", "14"]), None),
            (set(&["49", "01", "02", "03", "13", "14"]), Some("3")),
            (set(&["49", "01", "02", "03", "04", "14"]), Some("4")),
        ];
        for (ticket, expected) in tickets {
            let with = evaluate(&ticket, None, &winning, Some(&complement), None);
            let without = evaluate(&ticket, None, &winning, None, None);
            assert_eq!(code(with), expected);
            assert_eq!(code(with), code(without));
            assert!(matches!(with, HitDescriptor::SixNumber { complement_matched: false, .. }));
        }

        let all_six = set(&["01", "02", "03", "04", "05", "06", "49"]);
        let hit = evaluate(&all_six, None, &winning, Some(&complement), None);
        assert_eq!(code(hit), Some("6"));
    }

    #[test]
    fn test_reseed_priority() {
        let ticket = set(&["01", "02", "03", "04", "05", "06"]);
        let reseed = Digit::parse("7").unwrap();
        let same = Digit::parse("07").unwrap();

        let hit = evaluate(&ticket, Some(&reseed), &ticket, None, Some(&same));
        assert_eq!(code(hit), Some("6+R"));

        let losing = set(&["20", "21", "22", "23", "24", "25"]);
        let hit = evaluate(&ticket, Some(&reseed), &losing, None, Some(&same));
        assert_eq!(code(hit), Some("R"));

        // A 3-number hit outranks the reseed refund
        let three = set(&["01", "02", "03", "23", "24", "25"]);
        let hit = evaluate(&ticket, Some(&reseed), &three, None, Some(&same));
        assert_eq!(code(hit), Some("3"));
    }

    #[test]
    fn test_no_category_without_hits() {
        let ticket = set(&["01", "02", "03", "04", "05", "06"]);
        let losing = set(&["20", "21", "22", "23", "24", "25"]);
        let hit = evaluate(&ticket, None, &losing, None, Some(&Digit::parse("1").unwrap()));
        assert_eq!(code(hit), None);
    }
}
