pub mod achievement;
pub mod card;
pub mod deck;
pub mod grade;
pub mod review_session;
pub mod scheduler;

pub use achievement::Achievement;
pub use card::Card;
pub use deck::Deck;
pub use grade::Grade;
pub use review_session::{Completion, RateOutcome, ReviewController, ReviewSession, ReviewState};
pub use scheduler::{ScheduleUpdate, schedule, select_due};
