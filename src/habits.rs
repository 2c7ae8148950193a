//! Small daily habits and their day streaks.

pub mod habit_store;
pub mod streak;
pub mod types;

pub use habit_store::HabitStore;
pub use streak::advance_streak;
pub use types::{Habit, StreakTransition, TickOutcome};
