use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;
use worrybin_core::db::{open_db, open_db_in_memory};
use worrybin_core::service::worry_list::{ADD_MESSAGE_BODY, ADD_MESSAGE_TITLE};
use worrybin_core::{
    AudioCue, CoreConfig, DeleteOutcome, NoopHooks, RecordStore, SqliteRecordStore, StoreError,
    StoreResult, TogglePersistence, Worry, WorryListController, WorryListHooks, WorryRepository,
};

/// Hooks that record every collaborator call.
#[derive(Default)]
struct RecordingHooks {
    confirm: bool,
    cue_fails: bool,
    confirmations: Vec<usize>,
    messages: Vec<(String, String)>,
    cues: Vec<AudioCue>,
}

impl RecordingHooks {
    fn confirming() -> Self {
        Self {
            confirm: true,
            ..Self::default()
        }
    }
}

impl WorryListHooks for RecordingHooks {
    fn confirm_delete(&mut self, targets: &[Worry]) -> bool {
        self.confirmations.push(targets.len());
        self.confirm
    }

    fn show_message(&mut self, title: &str, message: &str) {
        self.messages.push((title.to_string(), message.to_string()));
    }

    fn play_cue(&mut self, cue: AudioCue) -> Result<(), String> {
        self.cues.push(cue);
        if self.cue_fails {
            Err("clap.mp3 missing".to_string())
        } else {
            Ok(())
        }
    }
}

/// Store whose writes can be switched off to simulate failures.
struct FlakyStore {
    inner: SqliteRecordStore,
    fail_writes: Cell<bool>,
}

impl RecordStore for FlakyStore {
    fn read(&self) -> StoreResult<Option<Vec<u8>>> {
        self.inner.read()
    }

    fn write(&self, bytes: &[u8]) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.inner.write(bytes)
    }
}

fn memory_list<H: WorryListHooks>(hooks: H) -> WorryListController<SqliteRecordStore, H> {
    WorryListController::open(open_db_in_memory().unwrap(), hooks, &CoreConfig::default())
        .unwrap()
}

fn flaky_list(toggle_persistence: TogglePersistence) -> WorryListController<FlakyStore> {
    let store = FlakyStore {
        inner: SqliteRecordStore::new(open_db_in_memory().unwrap()),
        fail_writes: Cell::new(false),
    };
    WorryListController::new(
        WorryRepository::new(store),
        NoopHooks,
        toggle_persistence,
    )
}

#[test]
fn adding_a_worry_publishes_one_active_entry() {
    let mut list = memory_list(RecordingHooks::confirming());

    list.add_worry("Will it rain tomorrow?").unwrap();

    assert_eq!(list.worries().len(), 1);
    let worry = &list.worries()[0];
    assert_eq!(worry.text, "Will it rain tomorrow?");
    assert!(!worry.realized);
    assert_eq!(worry.days_ago(), 0);
    assert_eq!(
        list.hooks().messages,
        vec![(ADD_MESSAGE_TITLE.to_string(), ADD_MESSAGE_BODY.to_string())]
    );
    assert_eq!(list.hooks().cues, vec![AudioCue::Clap]);
}

#[test]
fn deleting_first_of_two_leaves_only_the_second() {
    let mut list = memory_list(RecordingHooks::confirming());
    let a = list.add_worry("A").unwrap();
    let b = list.add_worry("B").unwrap();

    let outcome = list.delete_worry(a.id).unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted(1));
    assert_eq!(list.worries(), std::slice::from_ref(&b));
    assert_eq!(list.repository().load_all(), vec![b]);
    assert_eq!(list.hooks().confirmations, vec![1]);
}

#[test]
fn toggling_twice_restores_realized_flag() {
    let mut list = memory_list(NoopHooks);
    let worry = list.add_worry("flip me").unwrap();

    assert_eq!(list.toggle_realized(worry.id).unwrap(), Some(true));
    assert!(list.worries()[0].realized);
    assert_eq!(list.toggle_realized(worry.id).unwrap(), Some(false));
    assert!(!list.worries()[0].realized);
}

#[test]
fn toggling_unknown_id_is_a_noop() {
    let mut list = memory_list(NoopHooks);
    list.add_worry("only").unwrap();

    assert_eq!(list.toggle_realized(uuid::Uuid::new_v4()).unwrap(), None);
    assert!(!list.worries()[0].realized);
}

#[test]
fn memory_only_toggle_is_lost_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worrybin.db");

    let id = {
        let mut list =
            WorryListController::open(open_db(&path).unwrap(), NoopHooks, &CoreConfig::default())
                .unwrap();
        let worry = list.add_worry("not saved").unwrap();
        list.toggle_realized(worry.id).unwrap();
        worry.id
    };

    let reopened =
        WorryListController::open(open_db(&path).unwrap(), NoopHooks, &CoreConfig::default())
            .unwrap();
    let worry = reopened.worries().iter().find(|w| w.id == id).unwrap();
    assert!(!worry.realized);
}

#[test]
fn memory_only_toggle_is_dropped_by_a_later_add() {
    let mut list = memory_list(NoopHooks);
    let first = list.add_worry("first").unwrap();
    list.toggle_realized(first.id).unwrap();
    assert!(list.worries()[0].realized);

    list.add_worry("second").unwrap();

    assert!(!list.worries()[0].realized);
    assert!(!list.repository().load_all()[0].realized);
}

#[test]
fn persisted_toggle_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worrybin.db");
    let config = CoreConfig {
        toggle_persistence: TogglePersistence::Persist,
        ..CoreConfig::default()
    };

    let id = {
        let mut list = WorryListController::open(open_db(&path).unwrap(), NoopHooks, &config)
            .unwrap();
        let worry = list.add_worry("saved").unwrap();
        list.toggle_realized(worry.id).unwrap();
        worry.id
    };

    let reopened = WorryListController::open(open_db(&path).unwrap(), NoopHooks, &config).unwrap();
    assert!(reopened.worries().iter().any(|w| w.id == id && w.realized));
}

#[test]
fn declined_confirmation_abandons_delete() {
    let mut list = memory_list(RecordingHooks::default());
    let worry = list.add_worry("stay").unwrap();
    let cues_before = list.hooks().cues.len();

    assert_eq!(
        list.delete_worry(worry.id).unwrap(),
        DeleteOutcome::Cancelled
    );
    assert_eq!(
        list.delete_worry_at(&BTreeSet::from([0])).unwrap(),
        DeleteOutcome::Cancelled
    );
    assert_eq!(list.worries().len(), 1);
    assert_eq!(list.repository().load_all().len(), 1);
    assert_eq!(list.hooks().cues.len(), cues_before);
}

#[test]
fn failing_audio_cue_does_not_fail_add_or_delete() {
    let mut list = memory_list(RecordingHooks {
        confirm: true,
        cue_fails: true,
        ..RecordingHooks::default()
    });

    let worry = list.add_worry("noisy").unwrap();
    assert_eq!(list.worries().len(), 1);
    assert_eq!(list.delete_worry(worry.id).unwrap(), DeleteOutcome::Deleted(1));
    assert!(list.worries().is_empty());
    assert_eq!(list.hooks().cues.len(), 2);
}

#[test]
fn empty_text_worry_is_accepted() {
    let mut list = memory_list(NoopHooks);
    list.add_worry("").unwrap();
    assert_eq!(list.worries()[0].text, "");
}

#[test]
fn add_republishes_from_store() {
    let mut list = memory_list(NoopHooks);
    let external = Worry::new("written elsewhere");
    list.repository().append(&external).unwrap();

    let added = list.add_worry("mine").unwrap();
    assert_eq!(list.worries(), &[external, added][..]);
}

#[test]
fn failed_add_keeps_prior_state_and_notifies_nobody() {
    let mut list = flaky_list(TogglePersistence::MemoryOnly);
    list.add_worry("before").unwrap();
    let notified = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&notified);
    list.subscribe(move |_| *counter.borrow_mut() += 1);

    list.repository().store().fail_writes.set(true);
    assert!(list.add_worry("after").is_err());

    assert_eq!(list.worries().len(), 1);
    assert_eq!(*notified.borrow(), 0);
}

#[test]
fn failed_delete_write_is_not_rolled_back() {
    let mut list = flaky_list(TogglePersistence::MemoryOnly);
    let worry = list.add_worry("diverge").unwrap();

    list.repository().store().fail_writes.set(true);
    assert!(list.delete_worry(worry.id).is_err());

    assert!(list.worries().is_empty());
    assert_eq!(list.repository().load_all(), vec![worry]);
}

#[test]
fn failed_persisted_toggle_keeps_flip_and_errors() {
    let mut list = flaky_list(TogglePersistence::Persist);
    let worry = list.add_worry("write through").unwrap();

    list.repository().store().fail_writes.set(true);
    assert!(list.toggle_realized(worry.id).is_err());

    assert!(list.worries()[0].realized);
    assert!(!list.repository().load_all()[0].realized);
}

#[test]
fn failed_delete_at_write_is_not_rolled_back() {
    let mut list = flaky_list(TogglePersistence::MemoryOnly);
    let first = list.add_worry("first").unwrap();
    let second = list.add_worry("second").unwrap();

    list.repository().store().fail_writes.set(true);
    assert!(list.delete_worry_at(&BTreeSet::from([0])).is_err());

    assert_eq!(list.worries(), std::slice::from_ref(&second));
    assert_eq!(list.repository().load_all(), vec![first, second]);
}
