//! Review session state machine.
//!
//! A session snapshots the cards that are due when it starts and walks through
//! them once: flip the current card, grade it, move on. Grading writes only the
//! rated card back to the deck repository. Cards that become due while a
//! session is running never join it.

use super::achievement::{
    FLASHCARD_ACHIEVEMENT_ICON, FLASHCARD_ACHIEVEMENT_ID, FLASHCARD_ACHIEVEMENT_TITLE,
};
use super::scheduler::{ScheduleUpdate, schedule, select_due};
use super::{Card, Grade};
use crate::clock::Clock;
use crate::database::{AchievementNotifier, DeckRepository};
use crate::error::{Result, ReviewError};
use log::{debug, info, warn};

/// Snapshot of due cards plus a cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewSession {
    deck_id: String,
    cards: Vec<Card>,
    index: usize,
    flipped: bool,
}

/// Result of moving past the current card.
#[derive(Debug, PartialEq)]
pub enum Step {
    Next(ReviewSession),
    Finished,
}

impl ReviewSession {
    /// Returns None when there is nothing to review.
    pub fn new(deck_id: impl Into<String>, cards: Vec<Card>) -> Option<Self> {
        if cards.is_empty() {
            return None;
        }
        Some(Self {
            deck_id: deck_id.into(),
            cards,
            index: 0,
            flipped: false,
        })
    }

    pub fn deck_id(&self) -> &str {
        &self.deck_id
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.index)
    }

    /// 1-based position of the current card.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.index
    }

    /// Fraction of the snapshot already graded.
    pub fn progress(&self) -> f32 {
        self.index as f32 / self.cards.len() as f32
    }

    /// Reveals the back of the current card. Flipping twice changes nothing.
    pub fn flip(self) -> Self {
        Self {
            flipped: true,
            ..self
        }
    }

    pub fn advance(self) -> Step {
        let index = self.index + 1;
        if index >= self.cards.len() {
            Step::Finished
        } else {
            Step::Next(Self {
                index,
                flipped: false,
                ..self
            })
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ReviewState {
    #[default]
    Idle,
    Active(ReviewSession),
}

impl ReviewState {
    fn describe(&self) -> &'static str {
        match self {
            ReviewState::Idle => "no review session is active",
            ReviewState::Active(_) => "the card is not flipped",
        }
    }
}

/// Emitted when the last card of a session has been graded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub reviewed: usize,
    /// False when the completion achievement had been unlocked before.
    pub newly_unlocked: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RateOutcome {
    /// The card as it now stands in the repository.
    pub card: Card,
    pub completed: Option<Completion>,
}

/// Drives one review session at a time against a deck repository.
pub struct ReviewController<R, N, C> {
    decks: R,
    achievements: N,
    clock: C,
    state: ReviewState,
}

impl<R, N, C> ReviewController<R, N, C>
where
    R: DeckRepository,
    N: AchievementNotifier,
    C: Clock,
{
    pub fn new(decks: R, achievements: N, clock: C) -> Self {
        Self {
            decks,
            achievements,
            clock,
            state: ReviewState::Idle,
        }
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn session(&self) -> Option<&ReviewSession> {
        match &self.state {
            ReviewState::Active(session) => Some(session),
            ReviewState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session().is_some()
    }

    pub fn repository(&self) -> &R {
        &self.decks
    }

    pub fn notifier(&self) -> &N {
        &self.achievements
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Starts reviewing the cards of `deck_id` that are due now.
    ///
    /// Returns false, and stays idle, when no card is due.
    pub fn start(&mut self, deck_id: &str) -> Result<bool> {
        if self.is_active() {
            return Err(ReviewError::InvalidStateTransition {
                action: "start a review",
                state: "another review session is active",
            });
        }

        let deck = self.decks.find_deck(deck_id)?;
        let due = select_due(&deck, self.clock.now());

        match ReviewSession::new(deck.id, due) {
            Some(session) => {
                info!(
                    "Review of '{}' started with {} due cards",
                    deck.name,
                    session.len()
                );
                self.state = ReviewState::Active(session);
                Ok(true)
            }
            None => {
                debug!("No cards due in '{}'", deck.name);
                Ok(false)
            }
        }
    }

    pub fn flip(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            ReviewState::Active(session) => {
                self.state = ReviewState::Active(session.flip());
                Ok(())
            }
            ReviewState::Idle => Err(ReviewError::InvalidStateTransition {
                action: "flip",
                state: ReviewState::Idle.describe(),
            }),
        }
    }

    /// Grades the current card from a 1-4 rating.
    pub fn rate_rating(&mut self, rating: u8) -> Result<RateOutcome> {
        let grade = Grade::try_from(rating)?;
        self.rate(grade)
    }

    /// Grades the current card, persists its new schedule and advances.
    pub fn rate(&mut self, grade: Grade) -> Result<RateOutcome> {
        let (deck_id, snapshot) = match &self.state {
            ReviewState::Active(session) if session.flipped => {
                match session.current_card() {
                    Some(card) => (session.deck_id.clone(), card.clone()),
                    None => {
                        return Err(ReviewError::InvalidStateTransition {
                            action: "rate",
                            state: "the session has no current card",
                        });
                    }
                }
            }
            state => {
                return Err(ReviewError::InvalidStateTransition {
                    action: "rate",
                    state: state.describe(),
                });
            }
        };

        let update = schedule(&snapshot, grade, self.clock.now());
        let card = match self.persist(&deck_id, &snapshot.id, &update) {
            Ok(card) => card,
            Err(e) if e.is_not_found() => {
                warn!("Review of deck {} aborted: {}", deck_id, e);
                self.state = ReviewState::Idle;
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        debug!(
            "Card {} graded {}: interval {}d, ease {:.2}",
            card.id,
            grade.label(),
            card.interval,
            card.ease
        );

        let ReviewState::Active(session) = std::mem::take(&mut self.state) else {
            return Err(ReviewError::InvalidStateTransition {
                action: "rate",
                state: ReviewState::Idle.describe(),
            });
        };
        let reviewed = session.len();

        match session.advance() {
            Step::Next(next) => {
                self.state = ReviewState::Active(next);
                Ok(RateOutcome {
                    card,
                    completed: None,
                })
            }
            Step::Finished => {
                info!("Review session complete: {} cards reviewed", reviewed);
                let newly_unlocked = self.achievements.unlock_achievement(
                    FLASHCARD_ACHIEVEMENT_ID,
                    FLASHCARD_ACHIEVEMENT_TITLE,
                    FLASHCARD_ACHIEVEMENT_ICON,
                )?;
                Ok(RateOutcome {
                    card,
                    completed: Some(Completion {
                        reviewed,
                        newly_unlocked,
                    }),
                })
            }
        }
    }

    /// Abandons the remaining cards. Already graded cards keep their schedule.
    pub fn quit(&mut self) {
        if let ReviewState::Active(session) = std::mem::take(&mut self.state) {
            info!(
                "Review of deck {} quit with {} cards left",
                session.deck_id,
                session.remaining()
            );
        }
    }

    /// Applies `update` to the stored copy of one card and writes the decks back.
    fn persist(&self, deck_id: &str, card_id: &str, update: &ScheduleUpdate) -> Result<Card> {
        let mut decks = self.decks.get_decks()?;
        let deck = decks
            .iter_mut()
            .find(|d| d.id == deck_id)
            .ok_or_else(|| ReviewError::DeckNotFound(deck_id.to_string()))?;
        let card = deck
            .card_mut(card_id)
            .ok_or_else(|| ReviewError::CardNotFound {
                deck_id: deck_id.to_string(),
                card_id: card_id.to_string(),
            })?;

        update.apply_to(card);
        let stored = card.clone();
        self.decks.save_decks(&decks)?;
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{DAY_MS, ManualClock};
    use crate::database::MemoryStore;
    use crate::error::StorageError;
    use crate::models::{Achievement, Deck};

    const NOW: i64 = 1_700_000_000_000;

    type Controller = ReviewController<MemoryStore, MemoryStore, ManualClock>;

    fn card(id: &str, interval: u32, due_date: i64) -> Card {
        Card {
            id: id.to_string(),
            front: format!("front {}", id),
            back: format!("back {}", id),
            due_date,
            interval,
            ease: 2.5,
        }
    }

    fn deck(cards: Vec<Card>) -> Deck {
        Deck {
            id: "deck".to_string(),
            name: "Biology".to_string(),
            cards,
        }
    }

    fn controller(cards: Vec<Card>) -> Controller {
        ReviewController::new(
            MemoryStore::with_decks(vec![deck(cards)]),
            MemoryStore::new(),
            ManualClock::new(NOW),
        )
    }

    fn stored(ctl: &Controller, id: &str) -> Card {
        ctl.repository()
            .find_deck("deck")
            .unwrap()
            .card(id)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_two_card_scenario() {
        let mut ctl = controller(vec![card("a", 0, NOW), card("b", 1, NOW - 10)]);

        assert!(ctl.start("deck").unwrap());
        let session = ctl.session().unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.index(), 0);
        assert!(!session.is_flipped());

        ctl.flip().unwrap();
        let outcome = ctl.rate(Grade::Good).unwrap();
        assert!(outcome.completed.is_none());
        let a = stored(&ctl, "a");
        assert_eq!(a.interval, 1);
        assert_eq!(a.due_date, NOW + DAY_MS);
        assert_eq!(ctl.session().unwrap().index(), 1);
        assert!(!ctl.session().unwrap().is_flipped());

        ctl.flip().unwrap();
        let outcome = ctl.rate(Grade::Hard).unwrap();
        let b = stored(&ctl, "b");
        assert_eq!(b.interval, 3);
        assert!((b.ease - 2.35).abs() < 1e-9);
        assert_eq!(b.due_date, NOW + 3 * DAY_MS);
        assert_eq!(
            outcome.completed,
            Some(Completion {
                reviewed: 2,
                newly_unlocked: true,
            })
        );
        assert_eq!(ctl.state(), &ReviewState::Idle);
        assert_eq!(ctl.notifier().unlock_calls(), 1);
        assert_eq!(
            ctl.notifier().achievements().unwrap()[0].id,
            FLASHCARD_ACHIEVEMENT_ID
        );
    }

    #[test]
    fn test_start_with_nothing_due_stays_idle() {
        let mut ctl = controller(vec![card("a", 3, NOW + 1)]);
        assert!(!ctl.start("deck").unwrap());
        assert_eq!(ctl.state(), &ReviewState::Idle);
        assert!(ctl.session().is_none());
    }

    #[test]
    fn test_start_unknown_deck() {
        let mut ctl = controller(vec![card("a", 0, NOW)]);
        let err = ctl.start("missing").unwrap_err();
        assert!(matches!(err, ReviewError::DeckNotFound(_)));
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_start_while_active_is_rejected() {
        let mut ctl = controller(vec![card("a", 0, NOW)]);
        ctl.start("deck").unwrap();
        ctl.flip().unwrap();
        let before = ctl.state().clone();

        assert!(matches!(
            ctl.start("deck"),
            Err(ReviewError::InvalidStateTransition { .. })
        ));
        assert_eq!(ctl.state(), &before);
    }

    #[test]
    fn test_rate_before_flip_is_rejected() {
        let mut ctl = controller(vec![card("a", 0, NOW), card("b", 0, NOW)]);
        ctl.start("deck").unwrap();
        let before = ctl.state().clone();

        let err = ctl.rate(Grade::Good).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidStateTransition { .. }));
        assert_eq!(ctl.state(), &before);
        assert_eq!(ctl.repository().save_count(), 0);
    }

    #[test]
    fn test_flip_and_rate_without_session() {
        let mut ctl = controller(vec![card("a", 0, NOW)]);
        assert!(matches!(
            ctl.flip(),
            Err(ReviewError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            ctl.rate(Grade::Easy),
            Err(ReviewError::InvalidStateTransition { .. })
        ));
        assert_eq!(ctl.state(), &ReviewState::Idle);
    }

    #[test]
    fn test_flip_is_idempotent() {
        let mut ctl = controller(vec![card("a", 0, NOW)]);
        ctl.start("deck").unwrap();
        ctl.flip().unwrap();
        ctl.flip().unwrap();
        assert!(ctl.session().unwrap().is_flipped());
        assert_eq!(ctl.session().unwrap().index(), 0);
    }

    #[test]
    fn test_invalid_rating_leaves_state_alone() {
        let mut ctl = controller(vec![card("a", 0, NOW)]);
        ctl.start("deck").unwrap();
        ctl.flip().unwrap();
        let before = ctl.state().clone();

        assert!(matches!(
            ctl.rate_rating(9),
            Err(ReviewError::InvalidGrade(9))
        ));
        assert_eq!(ctl.state(), &before);

        let outcome = ctl.rate_rating(1).unwrap();
        assert_eq!(outcome.card.due_date, NOW + 60_000);
    }

    #[test]
    fn test_rate_uses_current_time() {
        let mut ctl = controller(vec![card("a", 0, NOW)]);
        ctl.start("deck").unwrap();
        ctl.clock().advance(5_000);
        ctl.flip().unwrap();

        let outcome = ctl.rate(Grade::Again).unwrap();
        assert_eq!(outcome.card.due_date, NOW + 5_000 + 60_000);
    }

    #[test]
    fn test_snapshot_membership_is_fixed() {
        // b is not due at start; a's relearn delay passes mid-session
        let mut ctl = controller(vec![
            card("a", 0, NOW),
            card("b", 0, NOW + 30_000),
            card("c", 0, NOW),
        ]);
        ctl.start("deck").unwrap();
        assert_eq!(ctl.session().unwrap().len(), 2);

        ctl.flip().unwrap();
        ctl.rate(Grade::Again).unwrap();
        ctl.clock().advance(120_000);

        let ids: Vec<_> = ctl
            .session()
            .unwrap()
            .cards()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(ctl.session().unwrap().current_card().unwrap().id, "c");

        ctl.flip().unwrap();
        let outcome = ctl.rate(Grade::Good).unwrap();
        assert_eq!(outcome.completed.map(|c| c.reviewed), Some(2));
    }

    #[test]
    fn test_only_rated_card_is_written() {
        let mut ctl = controller(vec![card("a", 0, NOW), card("b", 0, NOW)]);
        ctl.start("deck").unwrap();

        // edit the stored copy of a after the snapshot was taken
        let mut decks = ctl.repository().get_decks().unwrap();
        decks[0].cards[0].back = "edited".to_string();
        ctl.repository().save_decks(&decks).unwrap();

        ctl.flip().unwrap();
        let outcome = ctl.rate(Grade::Easy).unwrap();

        assert_eq!(outcome.card.back, "edited");
        assert_eq!(stored(&ctl, "a").back, "edited");
        assert_eq!(stored(&ctl, "b"), card("b", 0, NOW));
    }

    #[test]
    fn test_card_deleted_mid_session_aborts() {
        let mut ctl = controller(vec![card("a", 0, NOW), card("b", 0, NOW)]);
        ctl.start("deck").unwrap();
        ctl.repository().delete_card("deck", "a").unwrap();

        ctl.flip().unwrap();
        let err = ctl.rate(Grade::Good).unwrap_err();
        assert!(matches!(err, ReviewError::CardNotFound { .. }));
        assert_eq!(ctl.state(), &ReviewState::Idle);
        assert_eq!(ctl.notifier().unlock_calls(), 0);
    }

    #[test]
    fn test_quit_keeps_graded_cards() {
        let mut ctl = controller(vec![card("a", 0, NOW), card("b", 0, NOW)]);
        ctl.start("deck").unwrap();
        ctl.flip().unwrap();
        ctl.rate(Grade::Good).unwrap();

        ctl.quit();
        assert_eq!(ctl.state(), &ReviewState::Idle);
        assert_eq!(stored(&ctl, "a").interval, 1);
        assert_eq!(stored(&ctl, "b"), card("b", 0, NOW));
        assert_eq!(ctl.notifier().unlock_calls(), 0);

        // quitting again is harmless
        ctl.quit();
        assert_eq!(ctl.state(), &ReviewState::Idle);
    }

    #[test]
    fn test_one_notification_per_completed_session() {
        let cards: Vec<_> = (0..7).map(|i| card(&i.to_string(), 0, NOW)).collect();
        let mut ctl = controller(cards);

        for round in 1..=2 {
            assert!(ctl.start("deck").unwrap());
            let mut completions = 0;
            while ctl.is_active() {
                ctl.flip().unwrap();
                if ctl.rate(Grade::Again).unwrap().completed.is_some() {
                    completions += 1;
                }
            }
            assert_eq!(completions, 1);
            assert_eq!(ctl.notifier().unlock_calls(), round);
            ctl.clock().advance(60_000);
        }

        // second unlock reports the achievement as already held
        assert_eq!(ctl.notifier().achievements().unwrap().len(), 1);
    }

    #[test]
    fn test_repeat_completion_reports_already_unlocked() {
        let mut ctl = controller(vec![card("a", 0, NOW)]);
        ctl.notifier()
            .unlock_achievement(
                FLASHCARD_ACHIEVEMENT_ID,
                FLASHCARD_ACHIEVEMENT_TITLE,
                FLASHCARD_ACHIEVEMENT_ICON,
            )
            .unwrap();

        ctl.start("deck").unwrap();
        ctl.flip().unwrap();
        let done = ctl.rate(Grade::Good).unwrap().completed.unwrap();
        assert!(!done.newly_unlocked);
    }

    #[test]
    fn test_progress_accessors() {
        let session = ReviewSession::new("d", vec![card("a", 0, 0), card("b", 0, 0)]).unwrap();
        assert_eq!(session.position(), 1);
        assert_eq!(session.remaining(), 2);
        assert_eq!(session.progress(), 0.0);

        let Step::Next(session) = session.flip().advance() else {
            panic!("expected another card");
        };
        assert_eq!(session.position(), 2);
        assert_eq!(session.remaining(), 1);
        assert_eq!(session.progress(), 0.5);
        assert_eq!(session.advance(), Step::Finished);
    }

    #[test]
    fn test_empty_snapshot_is_no_session() {
        assert!(ReviewSession::new("d", Vec::new()).is_none());
    }

    struct FailingSaves(MemoryStore);

    impl DeckRepository for FailingSaves {
        fn get_decks(&self) -> std::result::Result<Vec<Deck>, StorageError> {
            self.0.get_decks()
        }

        fn save_decks(&self, _decks: &[Deck]) -> std::result::Result<(), StorageError> {
            Err(StorageError::LockPoisoned)
        }
    }

    #[test]
    fn test_storage_failure_keeps_session() {
        let mut ctl = ReviewController::new(
            FailingSaves(MemoryStore::with_decks(vec![deck(vec![card("a", 0, NOW)])])),
            MemoryStore::new(),
            ManualClock::new(NOW),
        );
        ctl.start("deck").unwrap();
        ctl.flip().unwrap();
        let before = ctl.state().clone();

        assert!(matches!(
            ctl.rate(Grade::Good),
            Err(ReviewError::Storage(StorageError::LockPoisoned))
        ));
        assert_eq!(ctl.state(), &before);
    }

    #[test]
    fn test_achievement_record_shape() {
        let a = Achievement::new(
            FLASHCARD_ACHIEVEMENT_ID,
            FLASHCARD_ACHIEVEMENT_TITLE,
            FLASHCARD_ACHIEVEMENT_ICON,
        );
        assert_eq!(a.title, "Flashcard Master");
        assert!(chrono::DateTime::parse_from_rfc3339(&a.unlocked_at).is_ok());
    }
}
