//! Worry repository over a single record store slot.
//!
//! # Responsibility
//! - Load, append and remove worries by rewriting the whole collection.
//! - Degrade unreadable persisted data to an empty collection.
//!
//! # Invariants
//! - Insertion order is preserved; no sorting.
//! - Corrupt slot content never surfaces as an error from `load_all`.
//! - Records that parse are kept even when they break collection rules;
//!   those rules are enforced on the records being written.
//! - Failed encodes or writes leave the slot untouched.

use crate::model::worry::{validate_collection, Worry, WorryId, WorryValidationError};
use crate::store::record_store::{RecordStore, StoreError};
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for repository mutations.
#[derive(Debug)]
pub enum RepoError {
    Validation(WorryValidationError),
    Store(StoreError),
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to encode worries: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<WorryValidationError> for RepoError {
    fn from(value: WorryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Encodes a worry collection to its persisted JSON form.
pub fn encode_worries(worries: &[Worry]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(worries)
}

/// Decodes a persisted worry collection.
///
/// Only unparseable payloads fail. Parsed records that break id rules are
/// returned as stored and reported with a warning.
pub fn decode_worries(bytes: &[u8]) -> Result<Vec<Worry>, serde_json::Error> {
    let worries: Vec<Worry> = serde_json::from_slice(bytes)?;
    if let Err(err) = validate_collection(&worries) {
        warn!(
            "event=worries_decode module=repo status=degraded error_code=invalid_collection count={} error={}",
            worries.len(),
            err
        );
    }
    Ok(worries)
}

/// Worry persistence over one record store slot.
pub struct WorryRepository<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> WorryRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the full collection in insertion order.
    ///
    /// Absent, unreadable or corrupt data yields an empty collection.
    pub fn load_all(&self) -> Vec<Worry> {
        match self.load_for_write() {
            Ok(worries) => worries,
            Err(err) => {
                warn!(
                    "event=worries_load module=repo status=degraded error_code=store_read_failed error={}",
                    err
                );
                Vec::new()
            }
        }
    }

    /// Appends one worry at the end of the persisted collection.
    pub fn append(&self, worry: &Worry) -> RepoResult<()> {
        worry.validate()?;
        let mut worries = self.load_for_write()?;
        if worries.iter().any(|existing| existing.id == worry.id) {
            return Err(WorryValidationError::DuplicateId(worry.id).into());
        }
        worries.push(worry.clone());
        self.save(&worries, "append")?;
        info!(
            "event=worry_append module=repo status=ok worry_id={} count={}",
            worry.id,
            worries.len()
        );
        Ok(())
    }

    /// Removes worries at the given load-order positions.
    ///
    /// Out-of-range positions are ignored. Returns the number removed.
    pub fn remove_at(&self, indices: &BTreeSet<usize>) -> RepoResult<usize> {
        let worries = self.load_for_write()?;
        let before = worries.len();
        let kept = worries
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !indices.contains(index))
            .map(|(_, worry)| worry)
            .collect::<Vec<_>>();
        let removed = before - kept.len();

        self.save(&kept, "remove_at")?;
        info!(
            "event=worry_remove module=repo status=ok mode=index removed={} count={}",
            removed,
            kept.len()
        );
        Ok(removed)
    }

    /// Removes the first worry with `id`.
    ///
    /// Returns `false` without writing when no entry matches.
    pub fn remove_by_id(&self, id: WorryId) -> RepoResult<bool> {
        let mut worries = self.load_for_write()?;
        let Some(position) = worries.iter().position(|worry| worry.id == id) else {
            info!("event=worry_remove module=repo status=noop mode=id worry_id={id}");
            return Ok(false);
        };

        worries.remove(position);
        self.save(&worries, "remove_by_id")?;
        info!(
            "event=worry_remove module=repo status=ok mode=id worry_id={} count={}",
            id,
            worries.len()
        );
        Ok(true)
    }

    /// Replaces the persisted collection wholesale.
    pub fn replace_all(&self, worries: &[Worry]) -> RepoResult<()> {
        validate_collection(worries)?;
        self.save(worries, "replace_all")
    }

    // Store read failures propagate here so a mutation never overwrites
    // data it could not see. Decode failures still degrade to empty.
    fn load_for_write(&self) -> RepoResult<Vec<Worry>> {
        let Some(bytes) = self.store.read()? else {
            return Ok(Vec::new());
        };

        match decode_worries(&bytes) {
            Ok(worries) => Ok(worries),
            Err(err) => {
                warn!(
                    "event=worries_decode module=repo status=degraded error_code=decode_failed bytes={} error={}",
                    bytes.len(),
                    err
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, worries: &[Worry], op: &'static str) -> RepoResult<()> {
        let encoded = encode_worries(worries).map_err(|err| {
            error!(
                "event=worries_save module=repo status=error op={} error_code=encode_failed error={}",
                op, err
            );
            RepoError::from(err)
        })?;

        self.store.write(&encoded).map_err(|err| {
            error!(
                "event=worries_save module=repo status=error op={} error_code=store_write_failed error={}",
                op, err
            );
            RepoError::from(err)
        })
    }
}
