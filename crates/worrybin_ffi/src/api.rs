//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level worry list functions to Dart via FRB.
//! - Keep one list controller per UI thread.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Worry ids cross the boundary as hyphenated UUID strings.
//! - The shell confirms deletes in its own dialog before calling
//!   `worry_delete`.

use log::warn;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;
use worrybin_core::db::open_db;
use worrybin_core::{
    core_version as core_version_inner, init_logging_with_config, now_epoch_ms,
    ping as ping_inner, AudioCue, CoreConfig, DeleteOutcome, SqliteRecordStore, Worry,
    WorryListController, WorryListHooks,
};

const DB_FILE_NAME: &str = "worrybin.sqlite3";
const ENV_DB_PATH: &str = "WORRYBIN_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

thread_local! {
    static CONTROLLER: RefCell<Option<WorryListController<SqliteRecordStore, FfiHooks>>> =
        const { RefCell::new(None) };
}

/// Collaborators for the FFI path.
///
/// Confirmation already happened in Dart; messages are handed back in the
/// response envelope and audio is played by the shell.
#[derive(Debug, Default)]
struct FfiHooks {
    last_message: Option<String>,
}

impl WorryListHooks for FfiHooks {
    fn show_message(&mut self, title: &str, message: &str) {
        self.last_message = Some(format!("{title} {message}"));
    }

    fn play_cue(&mut self, _cue: AudioCue) -> Result<(), String> {
        Ok(())
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive), or
///   empty to use `WORRYBIN_LOG_LEVEL` / the build-mode default.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => return format!("config invalid: {err}"),
    };
    match init_logging_with_config(&config, level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One worry row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorryItem {
    pub id: String,
    pub text: String,
    pub realized: bool,
    /// Creation time in epoch milliseconds.
    pub timestamp_ms: i64,
    /// Whole days since creation, computed at call time.
    pub days_ago: i64,
}

/// List snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorryListResponse {
    pub ok: bool,
    pub items: Vec<WorryItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorryActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Id of the worry the action applied to.
    pub worry_id: Option<String>,
    /// New realized flag after a toggle.
    pub realized: Option<bool>,
    /// Human-readable message for the UI.
    pub message: String,
}

impl WorryActionResponse {
    fn success(message: impl Into<String>, worry_id: Uuid) -> Self {
        Self {
            ok: true,
            worry_id: Some(worry_id.to_string()),
            realized: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            worry_id: None,
            realized: None,
            message: message.into(),
        }
    }
}

/// Returns the current worry list in display order.
///
/// # FFI contract
/// - Sync call, DB-backed on first use per thread.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn worry_list() -> WorryListResponse {
    let now = now_epoch_ms();
    match with_controller(|list| {
        Ok(list
            .worries()
            .iter()
            .map(|worry| to_worry_item(worry, now))
            .collect::<Vec<_>>())
    }) {
        Ok(items) => WorryListResponse {
            ok: true,
            message: format!("{} worr{}.", items.len(), plural_suffix(items.len())),
            items,
        },
        Err(err) => WorryListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("worry_list failed: {err}"),
        },
    }
}

/// Adds a worry. Text is stored as given; empty text is allowed.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the created worry id and the thank-you message on success.
#[flutter_rust_bridge::frb(sync)]
pub fn worry_add(text: String) -> WorryActionResponse {
    let result = with_controller(|list| {
        let worry = list.add_worry(text).map_err(|err| err.to_string())?;
        let message = list
            .hooks_mut()
            .last_message
            .take()
            .unwrap_or_else(|| "Worry added.".to_string());
        Ok((worry.id, message))
    });
    match result {
        Ok((id, message)) => WorryActionResponse::success(message, id),
        Err(err) => WorryActionResponse::failure(format!("worry_add failed: {err}")),
    }
}

/// Flips the realized flag of one worry.
///
/// Persistence follows `WORRYBIN_TOGGLE_PERSISTENCE`.
#[flutter_rust_bridge::frb(sync)]
pub fn worry_toggle(worry_id: String) -> WorryActionResponse {
    let id = match parse_worry_id(&worry_id) {
        Ok(id) => id,
        Err(err) => return WorryActionResponse::failure(format!("worry_toggle failed: {err}")),
    };
    match with_controller(|list| list.toggle_realized(id).map_err(|err| err.to_string())) {
        Ok(Some(realized)) => WorryActionResponse {
            realized: Some(realized),
            ..WorryActionResponse::success("Worry updated.", id)
        },
        Ok(None) => WorryActionResponse::failure(format!("worry not found: {id}")),
        Err(err) => WorryActionResponse::failure(format!("worry_toggle failed: {err}")),
    }
}

/// Deletes one worry by id. The caller has already confirmed.
#[flutter_rust_bridge::frb(sync)]
pub fn worry_delete(worry_id: String) -> WorryActionResponse {
    let id = match parse_worry_id(&worry_id) {
        Ok(id) => id,
        Err(err) => return WorryActionResponse::failure(format!("worry_delete failed: {err}")),
    };
    match with_controller(|list| list.delete_worry(id).map_err(|err| err.to_string())) {
        Ok(DeleteOutcome::Deleted(_)) => WorryActionResponse::success("Worry deleted.", id),
        Ok(DeleteOutcome::Cancelled) => WorryActionResponse::failure("Delete cancelled."),
        Ok(DeleteOutcome::NotFound) => {
            WorryActionResponse::failure(format!("worry not found: {id}"))
        }
        Err(err) => WorryActionResponse::failure(format!("worry_delete failed: {err}")),
    }
}

fn parse_worry_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid worry id `{}`", raw.trim()))
}

fn plural_suffix(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(ENV_DB_PATH) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn open_controller() -> Result<WorryListController<SqliteRecordStore, FfiHooks>, String> {
    let config = CoreConfig::from_env().map_err(|err| format!("config invalid: {err}"))?;
    let conn =
        open_db(resolve_db_path()).map_err(|err| format!("worry DB open failed: {err}"))?;
    WorryListController::open(conn, FfiHooks::default(), &config)
        .map_err(|err| format!("worry store init failed: {err}"))
}

fn with_controller<T>(
    f: impl FnOnce(&mut WorryListController<SqliteRecordStore, FfiHooks>) -> Result<T, String>,
) -> Result<T, String> {
    CONTROLLER.with(|cell| {
        let mut slot = cell
            .try_borrow_mut()
            .map_err(|_| "worry list is busy".to_string())?;
        if slot.is_none() {
            *slot = Some(open_controller().inspect_err(|err| {
                warn!("event=ffi_controller_open module=ffi status=error error={err}");
            })?);
        }
        match slot.as_mut() {
            Some(list) => f(list),
            None => Err("worry list unavailable".to_string()),
        }
    })
}

fn to_worry_item(worry: &Worry, now_epoch_ms: i64) -> WorryItem {
    WorryItem {
        id: worry.id.to_string(),
        text: worry.text.clone(),
        realized: worry.realized,
        timestamp_ms: worry.timestamp,
        days_ago: worry.days_ago_at(now_epoch_ms),
    }
}
