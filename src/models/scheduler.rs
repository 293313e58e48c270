//! Four-grade spaced repetition scheduling and due-card selection.
//!
//! The schedule is a simplified SM-2 variant:
//! - Again: the interval drops to 0 and the card comes back after a fixed one-minute delay
//! - Hard / Good / Easy: the interval grows 0 → 1 day → 3 days → interval × ease
//! - Hard lowers the ease by 0.15, Easy raises it by 0.15, Good leaves it alone
//! - Ease never falls below 1.3
//!
//! Everything here is pure; the caller supplies `now` and applies the result.

use super::card::MIN_EASE;
use super::{Card, Deck, Grade};
use crate::clock::DAY_MS;

/// Delay before a card graded Again resurfaces, independent of interval and ease.
pub const RELEARN_DELAY_MS: i64 = 60_000;
pub const EASE_STEP: f64 = 0.15;

/// New schedule for a card after grading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleUpdate {
    pub interval: u32,
    pub ease: f64,
    pub due_date: i64,
}

impl ScheduleUpdate {
    pub fn apply_to(&self, card: &mut Card) {
        card.interval = self.interval;
        card.ease = self.ease;
        card.due_date = self.due_date;
    }
}

/// Computes the next schedule for `card` graded `grade` at time `now`.
pub fn schedule(card: &Card, grade: Grade, now: i64) -> ScheduleUpdate {
    if grade == Grade::Again {
        return ScheduleUpdate {
            interval: 0,
            ease: card.ease,
            due_date: now + RELEARN_DELAY_MS,
        };
    }

    let interval = match card.interval {
        0 => 1,
        1 => 3,
        // f64::round rounds half away from zero
        n => (n as f64 * card.ease).round() as u32,
    };

    let delta = match grade {
        Grade::Hard => -EASE_STEP,
        Grade::Easy => EASE_STEP,
        _ => 0.0,
    };
    let ease = (card.ease + delta).max(MIN_EASE);

    ScheduleUpdate {
        interval,
        ease,
        due_date: now + i64::from(interval) * DAY_MS,
    }
}

/// Cards of `deck` that are due at `now`, in deck order.
pub fn select_due(deck: &Deck, now: i64) -> Vec<Card> {
    deck.cards
        .iter()
        .filter(|c| c.is_due(now))
        .cloned()
        .collect()
}

pub fn due_count(deck: &Deck, now: i64) -> usize {
    deck.cards.iter().filter(|c| c.is_due(now)).count()
}

/// What each grade would do to `card` if it were rated at `now`.
pub fn preview(card: &Card, now: i64) -> [(Grade, ScheduleUpdate); 4] {
    Grade::ALL.map(|grade| (grade, schedule(card, grade, now)))
}

/// Short human-readable delay until `update` comes due, e.g. "1m", "3d", "2w".
pub fn format_interval(update: &ScheduleUpdate, now: i64) -> String {
    let delay = (update.due_date - now).max(0);
    if delay < DAY_MS {
        let minutes = (delay + 59_999) / 60_000;
        return format!("{}m", minutes);
    }

    let days = delay / DAY_MS;
    if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
