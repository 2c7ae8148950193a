use std::sync::Arc;

use log::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::configuration::{BackendKind, Config, StorageConfig};
use crate::confessions::{Confession, ConfessionStatus, ConfessionStore};
use crate::error_handling::types::{ControllerError, StorageError};
use crate::habits::{Habit, HabitStore, TickOutcome};
use crate::moderation::{ContentFilter, Rejection};
use crate::storage::{DatabaseStorage, FileStorage, MemoryStorage, RecordStore, Storage};

/// Entry point shared by the CLI and the HTTP API.
///
/// Owns both stores over a single backend and performs the input checks the
/// stores leave to their callers: empty text, banned words, unknown ids.
pub struct Controller {
    confessions: ConfessionStore,
    habits: HabitStore,
    filter: ContentFilter,
}

impl From<Rejection> for ControllerError {
    fn from(r: Rejection) -> Self {
        ControllerError::Rejected(r.message().to_string())
    }
}

/// Opens the backend selected in the storage configuration.
pub fn open_backend(config: &StorageConfig) -> Result<Arc<dyn Storage>, StorageError> {
    let backend: Arc<dyn Storage> = match config.backend {
        BackendKind::Memory => {
            info!("Using in-memory storage, data will not persist");
            Arc::new(MemoryStorage::new())
        }
        BackendKind::File => Arc::new(FileStorage::new(&config.data_dir)?),
        BackendKind::Database => Arc::new(DatabaseStorage::new_file(&config.db_path)?),
    };
    Ok(backend)
}

impl Controller {
    pub fn new(config: &Config) -> Result<Self, ControllerError> {
        let backend = open_backend(&config.storage)?;
        let clock = Arc::new(SystemClock::new(config.clock.day_boundary));
        let filter = ContentFilter::new(&config.moderation.extra_banned_words);
        Ok(Self::from_parts(backend, clock, filter))
    }

    pub fn from_parts(backend: Arc<dyn Storage>, clock: Arc<dyn Clock>, filter: ContentFilter) -> Self {
        let records = RecordStore::new(backend);
        Self {
            confessions: ConfessionStore::new(records.clone(), clock.clone()),
            habits: HabitStore::new(records, clock),
            filter,
        }
    }

    pub fn confessions(&self) -> &ConfessionStore {
        &self.confessions
    }

    pub fn habits(&self) -> &HabitStore {
        &self.habits
    }

    pub fn submit_confession(&self, content: &str, tags: &[String]) -> Result<Confession, ControllerError> {
        let content = self.filter.check(content)?;
        let tags = normalize_tags(tags);
        if tags.iter().any(|t| self.filter.contains_banned_words(t)) {
            return Err(Rejection::BannedWords.into());
        }
        Ok(self.confessions.add_confession(content, tags)?)
    }

    pub fn confession(&self, id: &str) -> Result<Confession, ControllerError> {
        self.confessions.get_confession(id).ok_or_else(|| not_found("confession", id))
    }

    pub fn react(&self, id: &str, emoji: &str) -> Result<Confession, ControllerError> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(ControllerError::Rejected(String::from("emoji must not be empty")));
        }
        self.confessions
            .react_to_confession(id, emoji)?
            .ok_or_else(|| not_found("confession", id))
    }

    pub fn comment(&self, id: &str, content: &str) -> Result<Confession, ControllerError> {
        let content = self.filter.check(content)?;
        self.confessions
            .add_comment(id, content)?
            .ok_or_else(|| not_found("confession", id))
    }

    pub fn delete_comment(&self, id: &str, comment_id: &str) -> Result<Confession, ControllerError> {
        match self.confessions.delete_comment(id, comment_id)? {
            Some(confession) => Ok(confession),
            None if self.confessions.get_confession(id).is_none() => Err(not_found("confession", id)),
            None => Err(not_found("comment", comment_id)),
        }
    }

    pub fn moderate(&self, id: &str, status: ConfessionStatus) -> Result<Confession, ControllerError> {
        self.confessions
            .moderate_confession(id, status)?
            .ok_or_else(|| not_found("confession", id))
    }

    pub fn create_habit(&self, title: &str) -> Result<Habit, ControllerError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ControllerError::Rejected(String::from("title must not be empty")));
        }
        Ok(self.habits.add_habit(title)?)
    }

    pub fn tick_habit(&self, id: &str) -> Result<TickOutcome, ControllerError> {
        self.habits.tick_habit(id)?.ok_or_else(|| not_found("habit", id))
    }

    pub fn delete_habit(&self, id: &str) -> Result<(), ControllerError> {
        if self.habits.delete_habit(id)? {
            Ok(())
        } else {
            Err(not_found("habit", id))
        }
    }
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn not_found(kind: &str, id: &str) -> ControllerError {
    debug!("Unknown {} id {}", kind, id);
    ControllerError::NotFound(format!("{} {}", kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::habits::StreakTransition;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn controller() -> Controller {
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        Controller::from_parts(Arc::new(MemoryStorage::new()), clock, ContentFilter::new(["spam"]))
    }

    #[test]
    fn test_submit_trims_and_normalizes_tags() {
        let c = controller();
        let tags = vec![" exam ".to_string(), "".into(), "exam".into(), "sleep".into()];
        let confession = c.submit_confession("  mất ngủ trước kỳ thi  ", &tags).unwrap();
        assert_eq!(confession.content, "mất ngủ trước kỳ thi");
        assert_eq!(confession.tags, vec!["exam", "sleep"]);
        assert_eq!(confession.status, ConfessionStatus::Pending);
    }

    #[test]
    fn test_submit_rejects_empty_and_banned() {
        let c = controller();
        assert!(matches!(c.submit_confession("   ", &[]), Err(ControllerError::Rejected(_))));
        assert!(matches!(c.submit_confession("buy SPAM now", &[]), Err(ControllerError::Rejected(_))));
        assert!(matches!(
            c.submit_confession("fine", &["shit".to_string()]),
            Err(ControllerError::Rejected(_))
        ));
        assert!(c.confessions().list_confessions(true).is_empty());
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let c = controller();
        assert!(matches!(c.react("nope", "👍"), Err(ControllerError::NotFound(_))));
        assert!(matches!(c.comment("nope", "hi"), Err(ControllerError::NotFound(_))));
        assert!(matches!(c.moderate("nope", ConfessionStatus::Approved), Err(ControllerError::NotFound(_))));
        assert!(matches!(c.tick_habit("nope"), Err(ControllerError::NotFound(_))));
        assert!(matches!(c.delete_habit("nope"), Err(ControllerError::NotFound(_))));
        assert!(matches!(c.confession("nope"), Err(ControllerError::NotFound(_))));
    }

    #[test]
    fn test_delete_comment_names_the_missing_id() {
        let c = controller();
        match c.delete_comment("nope", "c1") {
            Err(ControllerError::NotFound(what)) => assert_eq!(what, "confession nope"),
            other => panic!("unexpected result {:?}", other),
        }

        let confession = c.submit_confession("ổn thôi", &[]).unwrap();
        match c.delete_comment(&confession.id, "c1") {
            Err(ControllerError::NotFound(what)) => assert_eq!(what, "comment c1"),
            other => panic!("unexpected result {:?}", other),
        }

        let commented = c.comment(&confession.id, "cố lên").unwrap();
        let comment_id = commented.comments[0].id.clone();
        let after = c.delete_comment(&confession.id, &comment_id).unwrap();
        assert!(after.comments.is_empty());
    }

    #[test]
    fn test_habit_flow() {
        let c = controller();
        assert!(matches!(c.create_habit("  "), Err(ControllerError::Rejected(_))));
        let h = c.create_habit(" Hít thở 1 phút ").unwrap();
        assert_eq!(h.title, "Hít thở 1 phút");
        let tick = c.tick_habit(&h.id).unwrap();
        assert_eq!(tick.transition, StreakTransition::Restarted);
        c.delete_habit(&h.id).unwrap();
        assert!(c.habits().list_habits().is_empty());
    }

    #[test]
    fn test_new_opens_configured_file_backend() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_path_buf();
        let c = Controller::new(&config).unwrap();
        c.create_habit("walk").unwrap();

        let reopened = Controller::new(&config).unwrap();
        assert_eq!(reopened.habits().list_habits().len(), 1);
        assert!(dir.path().join("sm_habits_v1.json").exists());
    }
}
