use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::Type;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::money::parse_eur;
use super::normalizer::{normalize_digit, normalize_draw_id, normalize_number, parse_number_list};
use crate::error::MatchError;

/// The three supported games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "game_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// 6 of 49 plus complement and reseed
    SixNumber,
    /// 5 of 50 plus 2 stars
    FiveStar,
    /// 5 of 54 plus key number
    FiveKey,
}

const SIX_NUMBER_CATEGORIES: &[&str] = &["6+R", "6", "5+C", "5", "4", "3", "R"];

const FIVE_STAR_CATEGORIES: &[&str] = &[
    "5+2", "5+1", "5+0", "4+2", "4+1", "4+0", "3+2", "3+1", "3+0", "2+2", "2+1", "2+0", "1+2",
    "1+1", "0+2",
];

const FIVE_KEY_CATEGORIES: &[&str] = &["5+C", "5", "4+C", "4", "3+C", "3", "2+C", "2", "R"];

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::SixNumber => "six_number",
            GameType::FiveStar => "five_star",
            GameType::FiveKey => "five_key",
        }
    }

    /// Return all supported games, in reporting order
    pub fn all() -> Vec<GameType> {
        vec![GameType::FiveStar, GameType::SixNumber, GameType::FiveKey]
    }

    /// Size of the winning-number set of every draw of this game
    pub fn numbers_per_draw(&self) -> usize {
        match self {
            GameType::SixNumber => 6,
            GameType::FiveStar | GameType::FiveKey => 5,
        }
    }

    /// Weekdays on which this game is drawn
    pub fn draw_weekdays(&self) -> &'static [Weekday] {
        match self {
            GameType::SixNumber => &[Weekday::Mon, Weekday::Thu, Weekday::Sat],
            GameType::FiveStar => &[Weekday::Tue, Weekday::Fri],
            GameType::FiveKey => &[Weekday::Sun],
        }
    }

    /// Closed vocabulary of hit-category codes, best tier first
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            GameType::SixNumber => SIX_NUMBER_CATEGORIES,
            GameType::FiveStar => FIVE_STAR_CATEGORIES,
            GameType::FiveKey => FIVE_KEY_CATEGORIES,
        }
    }

    /// Human hint for when official results usually appear
    pub fn publication_hint(&self) -> &'static str {
        match self {
            GameType::SixNumber | GameType::FiveStar => "usually after midnight of the following day",
            GameType::FiveKey => "usually published on Monday morning",
        }
    }
}

impl FromStr for GameType {
    type Err = MatchError;

    /// Accepts the canonical names and the legacy product names found in old records
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "six_number" | "primitiva" => Ok(GameType::SixNumber),
            "five_star" | "euromillones" => Ok(GameType::FiveStar),
            "five_key" | "gordo" => Ok(GameType::FiveKey),
            other => Err(MatchError::UnknownGame(other.to_string())),
        }
    }
}

// ========== CANONICAL VALUES ==========

/// A ball or star, always held as a two-digit string ("07")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Number(String);

impl Number {
    pub fn parse(raw: &str) -> Result<Self, MatchError> {
        normalize_number(raw).map(Number)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reseed or key digit, held without leading zeros
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Digit(String);

impl Digit {
    pub fn parse(raw: &str) -> Result<Self, MatchError> {
        normalize_digit(raw).map(Digit)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Three-digit draw identifier ("007")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DrawId(String);

impl DrawId {
    pub fn parse(raw: &str) -> Result<Self, MatchError> {
        normalize_draw_id(raw).map(DrawId)
    }

    pub fn from_number(n: u32) -> Self {
        DrawId(format!("{:03}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn number_set(raw: &str) -> Result<BTreeSet<Number>, MatchError> {
    Ok(parse_number_list(raw)?.into_iter().map(Number).collect())
}

fn optional_digit(raw: Option<&str>) -> Result<Option<Digit>, MatchError> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => Digit::parse(s).map(Some),
        _ => Ok(None),
    }
}

fn optional_number(raw: Option<&str>) -> Result<Option<Number>, MatchError> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => Number::parse(s).map(Some),
        _ => Ok(None),
    }
}

// ========== HIT CATEGORIES ==========

/// A code from a game's closed hit-category vocabulary ("5+C", "3+1", "R", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitCategory {
    game: GameType,
    code: &'static str,
}

impl HitCategory {
    /// Look a code up in the game's vocabulary; whitespace inside the code is ignored
    pub fn parse(game: GameType, code: &str) -> Result<Self, MatchError> {
        let compact: String = code.chars().filter(|c| !c.is_whitespace()).collect();
        game.vocabulary()
            .iter()
            .find(|known| known.eq_ignore_ascii_case(&compact))
            .map(|known| HitCategory { game, code: *known })
            .ok_or(MatchError::UnknownCategory {
                game,
                code: code.to_string(),
            })
    }

    /// Same as `parse` but for codes computed by the evaluators, where an
    /// unknown code simply means "no prize tier"
    pub fn lookup(game: GameType, code: &str) -> Option<Self> {
        Self::parse(game, code).ok()
    }

    /// The key-only consolation category of the key-number game
    pub fn key_only() -> Self {
        HitCategory {
            game: GameType::FiveKey,
            code: "R",
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Key-number categories that also earn the separately published "R" amount
    pub fn carries_key_supplement(&self) -> bool {
        self.game == GameType::FiveKey && self.code.ends_with("+C")
    }

    /// Position in the vocabulary; lower is a better tier
    pub fn rank(&self) -> usize {
        self.game
            .vocabulary()
            .iter()
            .position(|c| *c == self.code)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for HitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for HitCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

// ========== TICKETS ==========

/// A draw a ticket takes part in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawRef {
    pub draw_id: DrawId,
    pub date: NaiveDate,
}

/// The numbers played on a ticket, with the fields each game requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum TicketPlay {
    SixNumber {
        numbers: BTreeSet<Number>,
        reseed: Option<Digit>,
    },
    FiveStar {
        numbers: BTreeSet<Number>,
        stars: BTreeSet<Number>,
    },
    FiveKey {
        numbers: BTreeSet<Number>,
        key: Option<Digit>,
    },
}

impl TicketPlay {
    pub fn game(&self) -> GameType {
        match self {
            TicketPlay::SixNumber { .. } => GameType::SixNumber,
            TicketPlay::FiveStar { .. } => GameType::FiveStar,
            TicketPlay::FiveKey { .. } => GameType::FiveKey,
        }
    }

    pub fn numbers(&self) -> &BTreeSet<Number> {
        match self {
            TicketPlay::SixNumber { numbers, .. }
            | TicketPlay::FiveStar { numbers, .. }
            | TicketPlay::FiveKey { numbers, .. } => numbers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub id: String,
    pub play: TicketPlay,
    pub draws: Vec<DrawRef>,
}

impl Ticket {
    pub fn game(&self) -> GameType {
        self.play.game()
    }

    pub fn short_id(&self) -> &str {
        short_ticket_id(&self.id)
    }
}

/// Last five characters of a ticket identifier, as printed in summaries
pub fn short_ticket_id(id: &str) -> &str {
    let start = id.char_indices().rev().nth(4).map(|(i, _)| i).unwrap_or(0);
    &id[start..]
}

/// Loosely-typed ticket as it arrives from capture or old records
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicket {
    pub id: String,
    pub game: String,
    /// Packed ("010203") or separated ("1,2,3") numbers
    pub numbers: String,
    #[serde(default)]
    pub reseed: Option<String>,
    #[serde(default)]
    pub stars: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    pub draws: Vec<RawDrawRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDrawRef {
    pub draw: String,
    pub date: NaiveDate,
}

impl TryFrom<RawTicket> for Ticket {
    type Error = MatchError;

    fn try_from(raw: RawTicket) -> Result<Self, Self::Error> {
        let game: GameType = raw.game.parse()?;
        let id = raw.id.trim().to_string();

        let numbers = number_set(&raw.numbers)?;
        if numbers.is_empty() {
            return Err(MatchError::EmptyTicket(id));
        }

        let play = match game {
            GameType::SixNumber => TicketPlay::SixNumber {
                numbers,
                reseed: optional_digit(raw.reseed.as_deref())?,
            },
            GameType::FiveStar => TicketPlay::FiveStar {
                numbers,
                stars: number_set(raw.stars.as_deref().unwrap_or(""))?,
            },
            GameType::FiveKey => TicketPlay::FiveKey {
                numbers,
                key: optional_digit(raw.key.as_deref())?,
            },
        };

        let draws = raw
            .draws
            .iter()
            .map(|d| {
                Ok(DrawRef {
                    draw_id: DrawId::parse(&d.draw)?,
                    date: d.date,
                })
            })
            .collect::<Result<Vec<_>, MatchError>>()?;
        if draws.is_empty() {
            return Err(MatchError::NoDrawReferences(id));
        }

        Ok(Ticket { id, play, draws })
    }
}

// ========== DRAW RESULTS ==========

/// Winning numbers with each game's supplementary fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum WinningNumbers {
    SixNumber {
        numbers: BTreeSet<Number>,
        complement: Option<Number>,
        reseed: Option<Digit>,
    },
    FiveStar {
        numbers: BTreeSet<Number>,
        stars: BTreeSet<Number>,
        bonus_code: Option<String>,
    },
    FiveKey {
        numbers: BTreeSet<Number>,
        key: Option<Digit>,
    },
}

impl WinningNumbers {
    pub fn game(&self) -> GameType {
        match self {
            WinningNumbers::SixNumber { .. } => GameType::SixNumber,
            WinningNumbers::FiveStar { .. } => GameType::FiveStar,
            WinningNumbers::FiveKey { .. } => GameType::FiveKey,
        }
    }

    pub fn numbers(&self) -> &BTreeSet<Number> {
        match self {
            WinningNumbers::SixNumber { numbers, .. }
            | WinningNumbers::FiveStar { numbers, .. }
            | WinningNumbers::FiveKey { numbers, .. } => numbers,
        }
    }
}

/// Official result of one draw. Unique per (game, draw id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawResult {
    pub draw_id: DrawId,
    pub date: NaiveDate,
    pub winning: WinningNumbers,
}

impl DrawResult {
    /// Build a result, enforcing the game's fixed set sizes
    pub fn new(draw_id: DrawId, date: NaiveDate, winning: WinningNumbers) -> Result<Self, MatchError> {
        let result = Self {
            draw_id,
            date,
            winning,
        };
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let game = self.game();
        let actual = self.winning.numbers().len();
        if actual != game.numbers_per_draw() {
            return Err(MatchError::WrongSetSize {
                game,
                expected: game.numbers_per_draw(),
                actual,
            });
        }
        if let WinningNumbers::FiveStar { stars, .. } = &self.winning {
            if stars.len() != 2 {
                return Err(MatchError::WrongStarCount {
                    game,
                    expected: 2,
                    actual: stars.len(),
                });
            }
        }
        Ok(())
    }

    pub fn game(&self) -> GameType {
        self.winning.game()
    }

    /// One-line header used in summaries
    pub fn headline(&self) -> String {
        let join = |set: &BTreeSet<Number>| {
            set.iter().map(Number::as_str).collect::<Vec<_>>().join(" ")
        };
        let extra = match &self.winning {
            WinningNumbers::SixNumber { complement, reseed, .. } => format!(
                " · C:{} · R:{}",
                complement.as_ref().map(Number::as_str).unwrap_or("-"),
                reseed.as_ref().map(Digit::as_str).unwrap_or("-"),
            ),
            WinningNumbers::FiveStar { stars, bonus_code, .. } => {
                let mut s = format!(" + {}", join(stars));
                if let Some(code) = bonus_code {
                    s.push_str(&format!(" · Bonus: {}", code));
                }
                s
            }
            WinningNumbers::FiveKey { key, .. } => {
                format!(" · Key:{}", key.as_ref().map(Digit::as_str).unwrap_or("-"))
            }
        };
        format!(
            "Draw {} ({}): {}{}",
            self.draw_id,
            self.date,
            join(self.winning.numbers()),
            extra
        )
    }
}

/// Loosely-typed result as stored in text columns or received from a feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDrawResult {
    /// Feeds may omit it when the game is implied by the request
    #[serde(default)]
    pub game: String,
    pub draw: String,
    pub date: Option<NaiveDate>,
    pub numbers: String,
    #[serde(default)]
    pub complement: Option<String>,
    #[serde(default)]
    pub reseed: Option<String>,
    #[serde(default)]
    pub stars: Option<String>,
    #[serde(default)]
    pub bonus_code: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl TryFrom<RawDrawResult> for DrawResult {
    type Error = MatchError;

    fn try_from(raw: RawDrawResult) -> Result<Self, Self::Error> {
        let game: GameType = raw.game.parse()?;
        let draw_id = DrawId::parse(&raw.draw)?;
        let date = raw
            .date
            .ok_or_else(|| MatchError::MissingDate(raw.draw.clone()))?;
        let numbers = number_set(&raw.numbers)?;

        let winning = match game {
            GameType::SixNumber => WinningNumbers::SixNumber {
                numbers,
                complement: optional_number(raw.complement.as_deref())?,
                reseed: optional_digit(raw.reseed.as_deref())?,
            },
            GameType::FiveStar => WinningNumbers::FiveStar {
                numbers,
                stars: number_set(raw.stars.as_deref().unwrap_or(""))?,
                bonus_code: raw
                    .bonus_code
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            },
            GameType::FiveKey => WinningNumbers::FiveKey {
                numbers,
                key: optional_digit(raw.key.as_deref())?,
            },
        };

        DrawResult::new(draw_id, date, winning)
    }
}

// ========== PRIZE TABLES ==========

/// One row of a draw's published prize table.
/// Unique per (game, draw id, hit-category code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrizeTableEntry {
    pub game: GameType,
    pub draw_id: DrawId,
    pub date: NaiveDate,
    pub category: HitCategory,
    /// Ordinal label as published ("1ª", "Especial", "Reintegro")
    pub label: String,
    /// `None` when the published amount text is not a readable number
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub amount_text: String,
}

impl PrizeTableEntry {
    /// Build an entry from published text, validating the category against the game
    pub fn from_published(
        game: GameType,
        draw_id: DrawId,
        date: NaiveDate,
        code: &str,
        label: &str,
        amount_text: &str,
    ) -> Result<Self, MatchError> {
        Ok(Self {
            game,
            category: HitCategory::parse(game, code)?,
            draw_id,
            date,
            label: normalize_ordinal(label),
            amount: parse_eur(amount_text),
            amount_text: amount_text.trim().to_string(),
        })
    }
}

/// "1a" / "1º" / "1 ª" -> "1ª"; collapses whitespace
pub fn normalize_ordinal(label: &str) -> String {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let chars: Vec<char> = collapsed.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        let after_digit = i > 0 && chars[i - 1].is_ascii_digit();
        let ends_word = chars.get(i + 1).map_or(true, |n| !n.is_alphanumeric());
        if after_digit && ends_word && matches!(c, 'a' | 'A' | 'º' | 'o' | 'O') {
            out.push('ª');
        } else {
            out.push(*c);
        }
    }
    out
}
