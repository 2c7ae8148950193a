use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::confessions::types::{Comment, Confession, ConfessionStatus};
use crate::error_handling::types::StorageError;
use crate::storage::record_store::{RecordStore, CONFESSIONS_KEY};

/// Confession feed operations.
///
/// Mutations on an unknown id write nothing and return `Ok(None)`.
#[derive(Clone)]
pub struct ConfessionStore {
    records: RecordStore,
    clock: Arc<dyn Clock>,
}

impl ConfessionStore {
    pub fn new(records: RecordStore, clock: Arc<dyn Clock>) -> Self {
        Self { records, clock }
    }

    fn all(&self) -> Vec<Confession> {
        self.records.read(CONFESSIONS_KEY, Vec::new())
    }

    /// Newest first. Only approved confessions unless `include_pending`.
    pub fn list_confessions(&self, include_pending: bool) -> Vec<Confession> {
        let mut items = self.all();
        if !include_pending {
            items.retain(|c| c.status == ConfessionStatus::Approved);
        }
        sort_newest_first(&mut items);
        items
    }

    /// Confessions in one moderation state, newest first.
    pub fn list_by_status(&self, status: ConfessionStatus) -> Vec<Confession> {
        let mut items = self.all();
        items.retain(|c| c.status == status);
        sort_newest_first(&mut items);
        items
    }

    pub fn get_confession(&self, id: &str) -> Option<Confession> {
        self.all().into_iter().find(|c| c.id == id)
    }

    /// Distinct tags used by approved confessions, alphabetically.
    pub fn list_tags(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|c| c.status == ConfessionStatus::Approved)
            .flat_map(|c| c.tags)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn add_confession(&self, content: &str, tags: Vec<String>) -> Result<Confession, StorageError> {
        let confession = Confession {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at: self.clock.now_millis(),
            tags,
            reactions: Default::default(),
            comments: Vec::new(),
            status: ConfessionStatus::Pending,
        };
        let created = confession.clone();
        self.records.update(CONFESSIONS_KEY, move |items: &mut Vec<Confession>| {
            items.push(confession);
            ((), true)
        })?;
        info!("Added confession {}", created.id);
        Ok(created)
    }

    pub fn react_to_confession(&self, id: &str, emoji: &str) -> Result<Option<Confession>, StorageError> {
        self.modify(id, |c| {
            *c.reactions.entry(emoji.to_string()).or_insert(0) += 1;
        })
    }

    pub fn add_comment(&self, id: &str, content: &str) -> Result<Option<Confession>, StorageError> {
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at: self.clock.now_millis(),
        };
        self.modify(id, move |c| c.comments.push(comment))
    }

    /// Removes one comment. `None` when either id is unknown.
    pub fn delete_comment(&self, id: &str, comment_id: &str) -> Result<Option<Confession>, StorageError> {
        self.records.update(CONFESSIONS_KEY, |items: &mut Vec<Confession>| {
            let Some(c) = items.iter_mut().find(|c| c.id == id) else {
                return (None, false);
            };
            let before = c.comments.len();
            c.comments.retain(|m| m.id != comment_id);
            if c.comments.len() == before {
                return (None, false);
            }
            (Some(c.clone()), true)
        })
    }

    pub fn moderate_confession(&self, id: &str, status: ConfessionStatus) -> Result<Option<Confession>, StorageError> {
        let updated = self.modify(id, |c| c.status = status)?;
        if updated.is_some() {
            info!("Confession {} moderated to {}", id, status);
        }
        Ok(updated)
    }

    fn modify<F>(&self, id: &str, change: F) -> Result<Option<Confession>, StorageError>
    where
        F: FnOnce(&mut Confession),
    {
        let result = self.records.update(CONFESSIONS_KEY, |items: &mut Vec<Confession>| {
            match items.iter_mut().find(|c| c.id == id) {
                Some(c) => {
                    change(c);
                    (Some(c.clone()), true)
                }
                None => (None, false),
            }
        })?;
        if result.is_none() {
            debug!("No confession with id {}", id);
        }
        Ok(result)
    }
}

fn sort_newest_first(items: &mut [Confession]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::memory_storage::MemoryStorage;
    use crate::storage::storage_trait::Storage;
    use chrono::{Duration, NaiveDate};

    fn setup() -> (Arc<MemoryStorage>, Arc<FixedClock>, ConfessionStore) {
        let backend = Arc::new(MemoryStorage::new());
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        let store = ConfessionStore::new(RecordStore::new(backend.clone()), clock.clone());
        (backend, clock, store)
    }

    #[test]
    fn test_added_confessions_start_pending() {
        let (_, clock, store) = setup();
        let a = store.add_confession("first", vec![]).unwrap();
        clock.advance(Duration::seconds(1));
        let b = store.add_confession("second", vec!["exam".into()]).unwrap();

        let all = store.list_confessions(true);
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|c| c.status == ConfessionStatus::Pending));
        assert_eq!(all[0].id, b.id);
        assert_eq!(all[1].id, a.id);
        assert!(all[0].reactions.is_empty());
        assert!(all[0].comments.is_empty());
        assert_eq!(all[0].tags, vec!["exam".to_string()]);
    }

    #[test]
    fn test_public_list_only_shows_approved() {
        let (_, clock, store) = setup();
        let a = store.add_confession("a", vec![]).unwrap();
        clock.advance(Duration::seconds(1));
        let b = store.add_confession("b", vec![]).unwrap();
        clock.advance(Duration::seconds(1));
        let c = store.add_confession("c", vec![]).unwrap();
        assert!(store.list_confessions(false).is_empty());

        store.moderate_confession(&a.id, ConfessionStatus::Approved).unwrap();
        store.moderate_confession(&b.id, ConfessionStatus::Rejected).unwrap();
        store.moderate_confession(&c.id, ConfessionStatus::Approved).unwrap();

        let public: Vec<_> = store.list_confessions(false).into_iter().map(|x| x.id).collect();
        assert_eq!(public, vec![c.id.clone(), a.id.clone()]);
        assert_eq!(store.list_by_status(ConfessionStatus::Rejected)[0].id, b.id);
        assert!(store.list_by_status(ConfessionStatus::Pending).is_empty());
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let (_, _, store) = setup();
        let a = store.add_confession("a", vec![]).unwrap();
        let b = store.add_confession("b", vec![]).unwrap();
        let ids: Vec<_> = store.list_confessions(true).into_iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_reactions_count_up() {
        let (_, _, store) = setup();
        let c = store.add_confession("hug please", vec![]).unwrap();
        for _ in 0..5 {
            store.react_to_confession(&c.id, "❤️").unwrap();
        }
        let updated = store.react_to_confession(&c.id, "🤗").unwrap().unwrap();
        assert_eq!(updated.reaction_count("❤️"), 5);
        assert_eq!(updated.reaction_count("🤗"), 1);
        assert_eq!(store.get_confession(&c.id).unwrap().reaction_count("❤️"), 5);
    }

    #[test]
    fn test_comments_append_and_delete() {
        let (_, clock, store) = setup();
        let c = store.add_confession("post", vec![]).unwrap();
        clock.advance(Duration::minutes(5));
        let with_one = store.add_comment(&c.id, "you are not alone").unwrap().unwrap();
        store.add_comment(&c.id, "same here").unwrap();

        let stored = store.get_confession(&c.id).unwrap();
        assert_eq!(stored.comments.len(), 2);
        assert_eq!(stored.comments[0].content, "you are not alone");
        assert_eq!(stored.comments[0].created_at, c.created_at + 5 * 60 * 1000);

        let first_id = with_one.comments[0].id.clone();
        let after = store.delete_comment(&c.id, &first_id).unwrap().unwrap();
        assert_eq!(after.comments.len(), 1);
        assert_eq!(after.comments[0].content, "same here");
        assert!(store.delete_comment(&c.id, &first_id).unwrap().is_none());
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let (backend, _, store) = setup();
        store.add_confession("only", vec![]).unwrap();
        let before = backend.get(CONFESSIONS_KEY).unwrap();

        assert!(store.react_to_confession("missing", "👍").unwrap().is_none());
        assert!(store.add_comment("missing", "hi").unwrap().is_none());
        assert!(store.moderate_confession("missing", ConfessionStatus::Approved).unwrap().is_none());
        assert!(store.delete_comment("missing", "x").unwrap().is_none());
        assert!(store.get_confession("missing").is_none());
        assert_eq!(backend.get(CONFESSIONS_KEY).unwrap(), before);
    }

    #[test]
    fn test_tags_from_approved_only() {
        let (_, _, store) = setup();
        let a = store.add_confession("a", vec!["stress".into(), "exam".into()]).unwrap();
        let b = store.add_confession("b", vec!["exam".into(), "family".into()]).unwrap();
        store.add_confession("c", vec!["secret".into()]).unwrap();
        store.moderate_confession(&a.id, ConfessionStatus::Approved).unwrap();
        store.moderate_confession(&b.id, ConfessionStatus::Approved).unwrap();
        assert_eq!(store.list_tags(), vec!["exam", "family", "stress"]);
    }

    #[test]
    fn test_corrupt_collection_reads_as_empty() {
        let (backend, _, store) = setup();
        backend.set(CONFESSIONS_KEY, "not json at all").unwrap();
        assert!(store.list_confessions(true).is_empty());

        let c = store.add_confession("fresh start", vec![]).unwrap();
        assert_eq!(store.list_confessions(true), vec![c]);
    }
}
