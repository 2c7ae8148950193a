use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error_handling::types::StorageError;
use crate::habits::streak::advance_streak;
use crate::habits::types::{Habit, StreakTransition, TickOutcome};
use crate::storage::record_store::{RecordStore, HABITS_KEY};

#[derive(Clone)]
pub struct HabitStore {
    records: RecordStore,
    clock: Arc<dyn Clock>,
}

impl HabitStore {
    pub fn new(records: RecordStore, clock: Arc<dyn Clock>) -> Self {
        Self { records, clock }
    }

    /// All habits in insertion order.
    pub fn list_habits(&self) -> Vec<Habit> {
        self.records.read(HABITS_KEY, Vec::new())
    }

    pub fn get_habit(&self, id: &str) -> Option<Habit> {
        self.list_habits().into_iter().find(|h| h.id == id)
    }

    pub fn add_habit(&self, title: &str) -> Result<Habit, StorageError> {
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            streak: 0,
            last_done: None,
        };
        let created = habit.clone();
        self.records.update(HABITS_KEY, move |items: &mut Vec<Habit>| {
            items.push(habit);
            ((), true)
        })?;
        info!("Added habit {} ({})", created.id, created.title);
        Ok(created)
    }

    /// Marks the habit done today. Persists only when the streak moved.
    pub fn tick_habit(&self, id: &str) -> Result<Option<TickOutcome>, StorageError> {
        let today = self.clock.today();
        let outcome = self.records.update(HABITS_KEY, |items: &mut Vec<Habit>| {
            let Some(h) = items.iter_mut().find(|h| h.id == id) else {
                return (None, false);
            };
            let (streak, last_done, transition) = advance_streak(h.streak, h.last_done, today);
            h.streak = streak;
            h.last_done = last_done;
            let changed = transition != StreakTransition::AlreadyDone;
            (Some(TickOutcome { habit: h.clone(), transition }), changed)
        })?;
        match &outcome {
            Some(o) => debug!("Habit {} ticked on {}: {:?}, streak {}", id, today, o.transition, o.habit.streak),
            None => debug!("No habit with id {}", id),
        }
        Ok(outcome)
    }

    /// Removes the habit. The filtered collection is written either way.
    pub fn delete_habit(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self.records.update(HABITS_KEY, |items: &mut Vec<Habit>| {
            let before = items.len();
            items.retain(|h| h.id != id);
            (items.len() != before, true)
        })?;
        if removed {
            info!("Deleted habit {}", id);
        }
        Ok(removed)
    }
}
