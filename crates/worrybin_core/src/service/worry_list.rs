//! Worry list controller.
//!
//! # Responsibility
//! - Own the in-memory, observable copy of the worry collection.
//! - Route add/toggle/delete actions through the repository.
//! - Call UI collaborators (confirmation, messages, audio cues).
//!
//! # Invariants
//! - Observers run synchronously after every state change.
//! - `add_worry` republishes from the repository, not from memory.
//! - Deletes update memory first; a failed write is not rolled back.
//! - Collaborator failures never fail a data operation.

use crate::config::{CoreConfig, TogglePersistence};
use crate::model::worry::{Worry, WorryId};
use crate::repo::worry_repo::{RepoResult, WorryRepository};
use crate::store::record_store::{RecordStore, SqliteRecordStore, StoreResult};
use log::{error, info, warn};
use rusqlite::Connection;
use std::collections::BTreeSet;

pub const ADD_MESSAGE_TITLE: &str = "Thank You!";
pub const ADD_MESSAGE_BODY: &str = "Thank you for sharing your worry.";

/// Handle returned by `subscribe`, used to unsubscribe.
pub type SubscriptionId = u64;

type Observer = Box<dyn FnMut(&[Worry])>;

/// Audio cues the list asks the shell to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Played after a successful add and after a confirmed delete.
    Clap,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Entries were removed from memory; carries the count.
    Deleted(usize),
    /// The confirmation collaborator declined.
    Cancelled,
    /// No in-memory entry matched; nothing was asked or written.
    NotFound,
}

/// UI collaborators invoked by the controller.
///
/// Every method has a permissive default so shells implement only what
/// they present.
pub trait WorryListHooks {
    /// Asked before a delete proceeds. `false` abandons the delete.
    fn confirm_delete(&mut self, _targets: &[Worry]) -> bool {
        true
    }

    /// Display-only notification.
    fn show_message(&mut self, _title: &str, _message: &str) {}

    /// Fire-and-forget audio cue.
    fn play_cue(&mut self, _cue: AudioCue) -> Result<(), String> {
        Ok(())
    }
}

/// Hooks that confirm every delete and present nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl WorryListHooks for NoopHooks {}

/// Observable worry list state container.
pub struct WorryListController<S: RecordStore, H: WorryListHooks = NoopHooks> {
    repo: WorryRepository<S>,
    hooks: H,
    toggle_persistence: TogglePersistence,
    worries: Vec<Worry>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl<H: WorryListHooks> WorryListController<SqliteRecordStore, H> {
    /// Builds a controller over a migrated connection using `config`.
    pub fn open(conn: Connection, hooks: H, config: &CoreConfig) -> StoreResult<Self> {
        let store = SqliteRecordStore::with_slot_key(conn, config.slot_key.as_str())?;
        Ok(Self::new(
            WorryRepository::new(store),
            hooks,
            config.toggle_persistence,
        ))
    }
}

impl<S: RecordStore, H: WorryListHooks> WorryListController<S, H> {
    /// Creates the controller and loads the persisted list once.
    pub fn new(
        repo: WorryRepository<S>,
        hooks: H,
        toggle_persistence: TogglePersistence,
    ) -> Self {
        let mut controller = Self {
            repo,
            hooks,
            toggle_persistence,
            worries: Vec::new(),
            observers: Vec::new(),
            next_subscription: 0,
        };
        controller.initialize();
        controller
    }

    /// Current list in display order.
    pub fn worries(&self) -> &[Worry] {
        &self.worries
    }

    pub fn repository(&self) -> &WorryRepository<S> {
        &self.repo
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Registers an observer called with the full list on every change.
    pub fn subscribe(&mut self, observer: impl FnMut(&[Worry]) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` for unknown handles.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Replaces the in-memory list with the persisted one and notifies.
    pub fn initialize(&mut self) {
        self.worries = self.repo.load_all();
        info!(
            "event=worry_list_load module=service status=ok count={}",
            self.worries.len()
        );
        self.notify();
    }

    /// Persists a new worry and republishes the stored list.
    ///
    /// `text` is not validated. On failure the visible list is unchanged
    /// and no message or cue is emitted.
    pub fn add_worry(&mut self, text: impl Into<String>) -> RepoResult<Worry> {
        let worry = Worry::new(text);
        if let Err(err) = self.repo.append(&worry) {
            error!(
                "event=worry_add module=service status=error worry_id={} error={}",
                worry.id, err
            );
            return Err(err);
        }

        self.initialize();
        self.hooks.show_message(ADD_MESSAGE_TITLE, ADD_MESSAGE_BODY);
        self.play_cue(AudioCue::Clap);
        Ok(worry)
    }

    /// Flips `realized` on the matching entry.
    ///
    /// Returns the new flag, or `None` when `id` is not in the list.
    /// Only `TogglePersistence::Persist` writes the change to the store.
    pub fn toggle_realized(&mut self, id: WorryId) -> RepoResult<Option<bool>> {
        let Some(worry) = self.worries.iter_mut().find(|worry| worry.id == id) else {
            return Ok(None);
        };
        let realized = worry.toggle_realized();
        self.notify();

        if self.toggle_persistence == TogglePersistence::Persist {
            if let Err(err) = self.repo.replace_all(&self.worries) {
                error!(
                    "event=worry_toggle module=service status=error worry_id={} error={}",
                    id, err
                );
                return Err(err);
            }
        }

        info!(
            "event=worry_toggle module=service status=ok worry_id={} realized={} persisted={}",
            id,
            realized,
            self.toggle_persistence == TogglePersistence::Persist
        );
        Ok(Some(realized))
    }

    /// Deletes the worry with `id` after confirmation.
    pub fn delete_worry(&mut self, id: WorryId) -> RepoResult<DeleteOutcome> {
        let Some(position) = self.worries.iter().position(|worry| worry.id == id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !self
            .hooks
            .confirm_delete(std::slice::from_ref(&self.worries[position]))
        {
            info!("event=worry_delete module=service status=cancelled worry_id={id}");
            return Ok(DeleteOutcome::Cancelled);
        }

        self.worries.remove(position);
        self.notify();

        if let Err(err) = self.repo.remove_by_id(id) {
            error!(
                "event=worry_delete module=service status=error mode=id worry_id={} error={}",
                id, err
            );
            return Err(err);
        }

        self.play_cue(AudioCue::Clap);
        Ok(DeleteOutcome::Deleted(1))
    }

    /// Deletes worries at display positions after confirmation.
    ///
    /// Positions past the end of the list are ignored.
    pub fn delete_worry_at(&mut self, indices: &BTreeSet<usize>) -> RepoResult<DeleteOutcome> {
        let targets = indices
            .iter()
            .filter_map(|index| self.worries.get(*index).cloned())
            .collect::<Vec<_>>();
        if targets.is_empty() {
            return Ok(DeleteOutcome::NotFound);
        }
        if !self.hooks.confirm_delete(&targets) {
            info!(
                "event=worry_delete module=service status=cancelled mode=index count={}",
                targets.len()
            );
            return Ok(DeleteOutcome::Cancelled);
        }

        let mut position = 0;
        self.worries.retain(|_| {
            let keep = !indices.contains(&position);
            position += 1;
            keep
        });
        self.notify();

        if let Err(err) = self.repo.remove_at(indices) {
            error!(
                "event=worry_delete module=service status=error mode=index count={} error={}",
                targets.len(),
                err
            );
            return Err(err);
        }

        self.play_cue(AudioCue::Clap);
        Ok(DeleteOutcome::Deleted(targets.len()))
    }

    fn play_cue(&mut self, cue: AudioCue) {
        if let Err(err) = self.hooks.play_cue(cue) {
            warn!("event=audio_cue module=service status=error cue={cue:?} error={err}");
        }
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer(&self.worries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DeleteOutcome, NoopHooks, WorryListController};
    use crate::config::TogglePersistence;
    use crate::db::open_db_in_memory;
    use crate::repo::worry_repo::WorryRepository;
    use crate::store::record_store::SqliteRecordStore;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    fn controller() -> WorryListController<SqliteRecordStore> {
        let store = SqliteRecordStore::new(open_db_in_memory().unwrap());
        WorryListController::new(
            WorryRepository::new(store),
            NoopHooks,
            TogglePersistence::MemoryOnly,
        )
    }

    #[test]
    fn observers_see_every_change_until_unsubscribed() {
        let mut list = controller();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handle = list.subscribe(move |worries| sink.borrow_mut().push(worries.len()));

        let worry = list.add_worry("rent").unwrap();
        list.toggle_realized(worry.id).unwrap();
        assert!(list.unsubscribe(handle));
        list.delete_worry(worry.id).unwrap();

        assert_eq!(*seen.borrow(), vec![1, 1]);
        assert!(!list.unsubscribe(handle));
    }

    #[test]
    fn delete_at_removes_selected_positions() {
        let mut list = controller();
        let a = list.add_worry("a").unwrap();
        list.add_worry("b").unwrap();
        let c = list.add_worry("c").unwrap();

        let outcome = list.delete_worry_at(&BTreeSet::from([1])).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted(1));
        let ids = list.worries().iter().map(|w| w.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![a.id, c.id]);
        assert_eq!(list.repository().load_all(), list.worries());
    }

    #[test]
    fn delete_of_unknown_targets_reports_not_found() {
        let mut list = controller();
        assert_eq!(
            list.delete_worry(uuid::Uuid::new_v4()).unwrap(),
            DeleteOutcome::NotFound
        );
        assert_eq!(
            list.delete_worry_at(&BTreeSet::from([3])).unwrap(),
            DeleteOutcome::NotFound
        );
    }
}
