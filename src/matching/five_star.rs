use std::collections::BTreeSet;

use super::{intersection_size, HitDescriptor};
use crate::draws::models::{GameType, HitCategory, Number};

pub fn evaluate(
    numbers: &BTreeSet<Number>,
    stars: &BTreeSet<Number>,
    winning: &BTreeSet<Number>,
    winning_stars: &BTreeSet<Number>,
) -> HitDescriptor {
    HitDescriptor::FiveStar {
        numbers_matched: intersection_size(numbers, winning),
        stars_matched: intersection_size(stars, winning_stars),
    }
}

/// "{numbers}+{stars}", eligible only when the code is a published tier
pub fn category(numbers_matched: u8, stars_matched: u8) -> Option<HitCategory> {
    if numbers_matched == 0 && stars_matched == 0 {
        return None;
    }
    HitCategory::lookup(
        GameType::FiveStar,
        &format!("{}+{}", numbers_matched, stars_matched),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<Number> {
        values.iter().map(|v| Number::parse(v).unwrap()).collect()
    }

    #[test]
    fn test_counts_numbers_and_stars() {
        let hit = evaluate(
            &set(&["3", "14", "25", "36", "47"]),
            &set(&["2", "9"]),
            &set(&["03", "14", "25", "40", "50"]),
            &set(&["09", "11"]),
        );
        assert_eq!(
            hit,
            HitDescriptor::FiveStar {
                numbers_matched: 3,
                stars_matched: 1,
            }
        );
        assert_eq!(hit.category().unwrap().code(), "3+1");
    }

    #[test]
    fn test_unplayable_combinations_have_no_prize() {
        assert!(category(1, 0).is_none());
        assert!(category(0, 1).is_none());
        assert!(category(0, 0).is_none());
        assert_eq!(category(0, 2).unwrap().code(), "0+2");
        assert_eq!(category(5, 2).unwrap().code(), "5+2");
        assert_eq!(category(2, 0).unwrap().code(), "2+0");
    }
}
