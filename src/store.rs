//! Vote store: in-memory list with write-through JSON file persistence
//!
//! The RwLock'd list is the single authority. It is loaded once at startup
//! and every mutation rewrites the data file before returning, so reads
//! always observe prior writes and the file never lags behind memory.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CONFIG;
use crate::core::model::{ValidVote, Vote};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// ID sequence persisted next to the vote file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Metadata {
    last_id: u64,
}

pub struct VoteStore {
    data_file: PathBuf,
    meta_file: PathBuf,
    votes: RwLock<Vec<Vote>>,
}

pub static STORE: Lazy<VoteStore> =
    Lazy::new(|| VoteStore::new(&CONFIG.data_file, &CONFIG.meta_file));

/// Current local time in the stored timestamp format.
pub fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl VoteStore {
    pub fn new(data_file: impl Into<PathBuf>, meta_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            meta_file: meta_file.into(),
            votes: RwLock::new(Vec::new()),
        }
    }

    /// Load the vote file into memory. A missing or unreadable file starts
    /// the store empty. Returns the number of votes loaded.
    pub fn load(&self) -> Result<usize, StoreError> {
        let votes: Vec<Vote> = if self.data_file.exists() {
            let raw = fs::read_to_string(&self.data_file)?;
            match serde_json::from_str(&raw) {
                Ok(votes) => votes,
                Err(e) => {
                    tracing::warn!("vote file unreadable, starting empty: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let count = votes.len();
        *self.votes.write().unwrap() = votes;
        Ok(count)
    }

    /// Cloned copy of all votes. Reports run on this snapshot so they are
    /// isolated from concurrent mutations.
    pub fn snapshot(&self) -> Vec<Vote> {
        self.votes.read().unwrap().clone()
    }

    /// Admit a validated vote: reject if the player already has an active
    /// vote (case-insensitive), otherwise allocate the next ID, stamp the
    /// creation time and persist. The whole sequence runs under one write
    /// guard, so concurrent submissions can neither mint duplicate ids nor
    /// double-register a player. Returns None on a duplicate.
    pub fn add_vote(&self, valid: ValidVote) -> Result<Option<Vote>, StoreError> {
        let mut votes = self.votes.write().unwrap();

        let lowered = valid.name.to_lowercase();
        let name_taken = votes
            .iter()
            .any(|v| v.is_active && v.name.to_lowercase() == lowered);
        if name_taken {
            return Ok(None);
        }

        let vote = Vote {
            id: self.next_id()?,
            name: valid.name,
            days: valid.days,
            note: valid.note,
            created_at: now_stamp(),
            modified_at: None,
            is_active: true,
        };
        votes.push(vote.clone());
        self.persist(&votes)?;
        Ok(Some(vote))
    }

    /// Rename a player across all their votes, stamping `modified_at`.
    /// Returns how many votes changed; 0 means the name was not found.
    pub fn rename_player(&self, old_name: &str, new_name: &str) -> Result<usize, StoreError> {
        let mut votes = self.votes.write().unwrap();
        let now = now_stamp();
        let mut changed = 0;

        for vote in votes.iter_mut() {
            if vote.name == old_name {
                vote.name = new_name.to_string();
                vote.modified_at = Some(now.clone());
                changed += 1;
            }
        }

        if changed > 0 {
            self.persist(&votes)?;
        }
        Ok(changed)
    }

    /// Flag a single vote inactive. Returns false when the id is unknown.
    pub fn deactivate(&self, vote_id: u64) -> Result<bool, StoreError> {
        let mut votes = self.votes.write().unwrap();
        let found = match votes.iter_mut().find(|v| v.id == vote_id) {
            Some(vote) => {
                vote.is_active = false;
                true
            }
            None => false,
        };

        if found {
            self.persist(&votes)?;
        }
        Ok(found)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let mut votes = self.votes.write().unwrap();
        votes.clear();
        self.persist(&votes)
    }

    /// Next value of the persisted ID sequence. Creates the metadata file on
    /// first use; a corrupt file restarts the sequence. Only called while
    /// the votes write guard is held, which serializes the read-modify-write
    /// of the metadata file.
    fn next_id(&self) -> Result<u64, StoreError> {
        let mut meta = Metadata::default();
        if self.meta_file.exists() {
            if let Ok(raw) = fs::read_to_string(&self.meta_file) {
                meta = serde_json::from_str(&raw).unwrap_or_default();
            }
        }

        meta.last_id += 1;
        fs::write(&self.meta_file, serde_json::to_string_pretty(&meta)?)?;
        Ok(meta.last_id)
    }

    fn persist(&self, votes: &[Vote]) -> Result<(), StoreError> {
        fs::write(&self.data_file, serde_json::to_string_pretty(votes)?)?;
        tracing::debug!(
            "Saved {} votes to {}",
            votes.len(),
            self.data_file.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Weekday;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn temp_store(dir: &tempfile::TempDir) -> VoteStore {
        VoteStore::new(dir.path().join("votes.json"), dir.path().join("meta.json"))
    }

    fn valid(name: &str) -> ValidVote {
        ValidVote {
            name: name.to_string(),
            days: vec![Weekday::Monday],
            note: None,
        }
    }

    #[test]
    fn add_vote_round_trips_through_the_file() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);
        store.add_vote(valid("Romina")).unwrap().unwrap();
        store.add_vote(valid("Alex")).unwrap().unwrap();

        let reopened = temp_store(&dir);
        assert_eq!(reopened.load().unwrap(), 2);
        assert_eq!(reopened.snapshot(), store.snapshot());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);
        assert_eq!(store.load().unwrap(), 0);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("votes.json"), "{not json").unwrap();
        let store = temp_store(&dir);
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn id_sequence_survives_reopen() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);
        assert_eq!(store.add_vote(valid("Romina")).unwrap().unwrap().id, 1);
        assert_eq!(store.add_vote(valid("Alex")).unwrap().unwrap().id, 2);

        let reopened = temp_store(&dir);
        reopened.load().unwrap();
        assert_eq!(reopened.add_vote(valid("Maria")).unwrap().unwrap().id, 3);
    }

    #[test]
    fn concurrent_adds_mint_unique_ids() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);

        std::thread::scope(|s| {
            for t in 0..8 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..10 {
                        store
                            .add_vote(valid(&format!("player-{}-{}", t, i)))
                            .unwrap()
                            .unwrap();
                    }
                });
            }
        });

        let snapshot = store.snapshot();
        let ids: HashSet<u64> = snapshot.iter().map(|v| v.id).collect();
        assert_eq!(snapshot.len(), 80);
        assert_eq!(ids.len(), 80);
    }

    #[test]
    fn active_duplicate_names_rejected_across_case_and_accents() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);

        let first = store.add_vote(valid("Émile")).unwrap().unwrap();
        assert!(store.add_vote(valid("émile")).unwrap().is_none());
        assert!(store.add_vote(valid("ÉMILE")).unwrap().is_none());

        // A deactivated player may vote again.
        store.deactivate(first.id).unwrap();
        assert!(store.add_vote(valid("émile")).unwrap().is_some());
    }

    #[test]
    fn rename_counts_matches_and_stamps_modified_at() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);
        store.add_vote(valid("Romina")).unwrap().unwrap();
        store.add_vote(valid("Rom")).unwrap().unwrap();
        store.add_vote(valid("Alex")).unwrap().unwrap();

        assert_eq!(store.rename_player("Romina", "Ro").unwrap(), 1);
        assert_eq!(store.rename_player("Rom", "Ro").unwrap(), 1);
        assert_eq!(store.rename_player("Ro", "Romi").unwrap(), 2);
        assert_eq!(store.rename_player("Nobody", "X").unwrap(), 0);

        let reopened = temp_store(&dir);
        reopened.load().unwrap();
        let snapshot = reopened.snapshot();
        assert_eq!(snapshot.iter().filter(|v| v.name == "Romi").count(), 2);
        assert!(snapshot
            .iter()
            .filter(|v| v.name == "Romi")
            .all(|v| v.modified_at.is_some()));
        assert!(snapshot.iter().any(|v| v.name == "Alex"));
    }

    #[test]
    fn deactivate_flags_vote_and_persists() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);
        let vote = store.add_vote(valid("Romina")).unwrap().unwrap();

        assert!(store.deactivate(vote.id).unwrap());
        assert!(!store.deactivate(99).unwrap());

        let reopened = temp_store(&dir);
        reopened.load().unwrap();
        assert!(!reopened.snapshot()[0].is_active);
    }

    #[test]
    fn clear_empties_store_and_file() {
        let dir = tempdir().unwrap();
        let store = temp_store(&dir);
        store.add_vote(valid("Romina")).unwrap().unwrap();
        store.clear().unwrap();

        let reopened = temp_store(&dir);
        assert_eq!(reopened.load().unwrap(), 0);
    }
}
