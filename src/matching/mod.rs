// Match evaluators - compare a ticket's numbers to an official result
//
// Evaluation is pure: no I/O, no store access. The only failure is a
// structural one (ticket and result belong to different games).

pub mod five_key;
pub mod five_star;
pub mod six_number;

use serde::Serialize;
use std::collections::BTreeSet;

use crate::draws::models::{DrawResult, GameType, HitCategory, Number, Ticket, TicketPlay, WinningNumbers};
use crate::error::MatchError;

/// Match counts of one ticket against one draw. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum HitDescriptor {
    SixNumber {
        numbers_matched: u8,
        complement_matched: bool,
        reseed_matched: bool,
    },
    FiveStar {
        numbers_matched: u8,
        stars_matched: u8,
    },
    FiveKey {
        numbers_matched: u8,
        key_matched: bool,
    },
}

impl HitDescriptor {
    pub fn game(&self) -> GameType {
        match self {
            HitDescriptor::SixNumber { .. } => GameType::SixNumber,
            HitDescriptor::FiveStar { .. } => GameType::FiveStar,
            HitDescriptor::FiveKey { .. } => GameType::FiveKey,
        }
    }

    /// Prize tier reached, or `None` when the ticket won nothing
    pub fn category(&self) -> Option<HitCategory> {
        match *self {
            HitDescriptor::SixNumber {
                numbers_matched,
                complement_matched,
                reseed_matched,
            } => six_number::category(numbers_matched, complement_matched, reseed_matched),
            HitDescriptor::FiveStar {
                numbers_matched,
                stars_matched,
            } => five_star::category(numbers_matched, stars_matched),
            HitDescriptor::FiveKey {
                numbers_matched,
                key_matched,
            } => five_key::category(numbers_matched, key_matched),
        }
    }

    /// Short description of the hit for summaries
    pub fn describe(&self) -> String {
        match *self {
            HitDescriptor::SixNumber {
                numbers_matched,
                complement_matched,
                reseed_matched,
            } => match (numbers_matched, complement_matched, reseed_matched) {
                (6, _, true) => "6 numbers + reseed".to_string(),
                (5, true, _) => "5 numbers + complement".to_string(),
                (n, _, true) if n < 3 => "reseed matched".to_string(),
                (n, _, _) => format!("{} numbers", n),
            },
            HitDescriptor::FiveStar {
                numbers_matched,
                stars_matched,
            } => format!("{} numbers and {} stars", numbers_matched, stars_matched),
            HitDescriptor::FiveKey {
                numbers_matched,
                key_matched,
            } => match (numbers_matched, key_matched) {
                (n, true) if n < 2 => "key number matched".to_string(),
                (n, true) => format!("{} numbers + key", n),
                (n, false) => format!("{} numbers", n),
            },
        }
    }
}

/// Compare a ticket to a draw result of the same game
pub fn evaluate(ticket: &Ticket, result: &DrawResult) -> Result<HitDescriptor, MatchError> {
    match (&ticket.play, &result.winning) {
        (
            TicketPlay::SixNumber { numbers, reseed },
            WinningNumbers::SixNumber {
                numbers: winning,
                complement,
                reseed: winning_reseed,
            },
        ) => Ok(six_number::evaluate(
            numbers,
            reseed.as_ref(),
            winning,
            complement.as_ref(),
            winning_reseed.as_ref(),
        )),
        (
            TicketPlay::FiveStar { numbers, stars },
            WinningNumbers::FiveStar {
                numbers: winning,
                stars: winning_stars,
                ..
            },
        ) => Ok(five_star::evaluate(numbers, stars, winning, winning_stars)),
        (
            TicketPlay::FiveKey { numbers, key },
            WinningNumbers::FiveKey {
                numbers: winning,
                key: winning_key,
            },
        ) => Ok(five_key::evaluate(numbers, key.as_ref(), winning, winning_key.as_ref())),
        _ => Err(MatchError::GameMismatch {
            ticket: ticket.game(),
            result: result.game(),
        }),
    }
}

pub(crate) fn intersection_size(a: &BTreeSet<Number>, b: &BTreeSet<Number>) -> u8 {
    a.intersection(b).count() as u8
}
