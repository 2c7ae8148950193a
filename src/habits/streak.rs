use chrono::NaiveDate;

use crate::habits::types::StreakTransition;

/// Streak transition for a tick on `today`.
///
/// Returns the new `(streak, last_done)` and the transition taken. A tick on
/// the day already recorded (or, with a clock that went backwards, any day
/// not after it) leaves the state unchanged.
pub fn advance_streak(
    streak: u32,
    last_done: Option<NaiveDate>,
    today: NaiveDate,
) -> (u32, Option<NaiveDate>, StreakTransition) {
    match last_done {
        Some(last) if last >= today => (streak, last_done, StreakTransition::AlreadyDone),
        Some(last) if today.pred_opt() == Some(last) => {
            (streak.saturating_add(1), Some(today), StreakTransition::Continued)
        }
        _ => (1, Some(today), StreakTransition::Restarted),
    }
}
