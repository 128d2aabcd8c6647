// Week arithmetic and the publication gate.
//
// Weeks run Monday to Sunday. Every game draws on fixed weekdays, so a
// week's expected draw dates follow from its Monday alone.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::draws::models::GameType;

/// Monday of the week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sunday closing the week that starts on `monday`
pub fn week_end(monday: NaiveDate) -> NaiveDate {
    monday + Duration::days(6)
}

/// Every Monday from the week of `from` to the week of `to`, inclusive.
/// Empty when `to` falls in an earlier week than `from`.
pub fn mondays_in_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let end = monday_of(to);
    let mut current = monday_of(from);
    let mut mondays = Vec::new();
    while current <= end {
        mondays.push(current);
        current += Duration::weeks(1);
    }
    mondays
}

/// Dates the game is drawn on during the week starting at `monday`
pub fn draw_dates(game: GameType, monday: NaiveDate) -> Vec<NaiveDate> {
    let monday = monday_of(monday);
    game.draw_weekdays()
        .iter()
        .map(|day| monday + Duration::days(day.num_days_from_monday() as i64))
        .collect()
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ========== CLOCK ==========

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at one instant
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ========== PUBLICATION GATE ==========

/// Results of a draw are not looked for before this local time on the draw date
#[derive(Debug, Clone, Copy)]
pub struct PublicationGate {
    threshold: NaiveTime,
}

impl PublicationGate {
    /// Hours above 23 are clamped to 23
    pub fn new(hour: u32) -> Self {
        Self {
            threshold: NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Moment from which the draw of `date` may be fetched
    pub fn opens_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.threshold)
    }

    pub fn is_open(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        now >= self.opens_at(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monday_of() {
        // 2025-01-06 is a Monday
        assert_eq!(monday_of(date(2025, 1, 6)), date(2025, 1, 6));
        assert_eq!(monday_of(date(2025, 1, 9)), date(2025, 1, 6));
        assert_eq!(monday_of(date(2025, 1, 12)), date(2025, 1, 6));
        assert_eq!(monday_of(date(2025, 1, 1)), date(2024, 12, 30));
    }

    #[test]
    fn test_mondays_in_range() {
        let mondays = mondays_in_range(date(2025, 1, 8), date(2025, 1, 20));
        assert_eq!(mondays, vec![date(2025, 1, 6), date(2025, 1, 13), date(2025, 1, 20)]);

        assert!(mondays_in_range(date(2025, 1, 20), date(2025, 1, 8)).is_empty());
    }

    #[test]
    fn test_draw_dates_per_game() {
        let monday = date(2025, 1, 6);
        assert_eq!(
            draw_dates(GameType::SixNumber, monday),
            vec![date(2025, 1, 6), date(2025, 1, 9), date(2025, 1, 11)]
        );
        assert_eq!(
            draw_dates(GameType::FiveStar, monday),
            vec![date(2025, 1, 7), date(2025, 1, 10)]
        );
        assert_eq!(draw_dates(GameType::FiveKey, monday), vec![date(2025, 1, 12)]);
        assert_eq!(weekday_name(date(2025, 1, 12)), "Sunday");
    }

    #[test]
    fn test_publication_gate() {
        let gate = PublicationGate::new(22);
        let draw = date(2025, 1, 7);

        assert!(!gate.is_open(draw, draw.and_hms_opt(21, 59, 59).unwrap()));
        assert!(gate.is_open(draw, draw.and_hms_opt(22, 0, 0).unwrap()));
        assert!(gate.is_open(draw, date(2025, 1, 8).and_hms_opt(0, 30, 0).unwrap()));
        assert!(!gate.is_open(draw, date(2025, 1, 6).and_hms_opt(23, 0, 0).unwrap()));
    }
}
