use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pagewatch_core::{ExtractionResult, Fingerprint, FingerprintMode, PersistedState};
use pagewatch_logging::{watch_debug, watch_info, watch_warn};

use crate::{AtomicFileWriter, PersistError};

/// Single-file record of the last observed fingerprint.
///
/// Scalar mode stores the bare digest; set-based mode stores a JSON array of
/// locators in result order. No locking: one run at a time is assumed.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
    mode: FingerprintMode,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>, mode: FingerprintMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> FingerprintMode {
        self.mode
    }

    /// Last recorded state; missing or corrupt files yield the empty state.
    pub fn load(&self) -> PersistedState {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                watch_info!("No prior state at {:?}; treating as first run", self.path);
                return PersistedState::empty(self.mode);
            }
            Err(err) => {
                watch_warn!("State file {:?} unreadable, starting empty: {}", self.path, err);
                return PersistedState::empty(self.mode);
            }
        };

        match self.parse(&content) {
            Some(state) => {
                watch_debug!("Loaded prior state from {:?}", self.path);
                state
            }
            None => {
                watch_warn!("State file {:?} is corrupt, starting empty", self.path);
                PersistedState::empty(self.mode)
            }
        }
    }

    fn parse(&self, content: &str) -> Option<PersistedState> {
        match self.mode {
            FingerprintMode::Scalar => {
                let digest = content.trim();
                if digest.is_empty() {
                    return Some(PersistedState::empty(self.mode));
                }
                digest
                    .chars()
                    .all(|c| c.is_ascii_hexdigit())
                    .then(|| PersistedState {
                        fingerprint: Fingerprint::Digest(digest.to_string()),
                        raw_result: None,
                    })
            }
            FingerprintMode::SetBased => {
                if content.trim().is_empty() {
                    return Some(PersistedState::empty(self.mode));
                }
                let locators: Vec<String> = serde_json::from_str(content).ok()?;
                if locators.is_empty() {
                    return Some(PersistedState::empty(self.mode));
                }
                let set: BTreeSet<String> = locators.iter().cloned().collect();
                Some(PersistedState {
                    fingerprint: Fingerprint::MembershipSet(set),
                    raw_result: Some(ExtractionResult::resources(locators)),
                })
            }
        }
    }

    /// Atomically overwrites the record with `state`.
    pub fn save(&self, state: &PersistedState) -> Result<(), PersistError> {
        if state.mode() != self.mode {
            return Err(PersistError::ModeMismatch {
                expected: self.mode,
                actual: state.mode(),
            });
        }

        let content = match &state.fingerprint {
            Fingerprint::Digest(digest) => digest.clone(),
            Fingerprint::MembershipSet(set) => {
                let locators: Vec<&String> = match &state.raw_result {
                    Some(raw) => raw.items().iter().collect(),
                    None => set.iter().collect(),
                };
                serde_json::to_string_pretty(&locators)?
            }
        };

        AtomicFileWriter::new(self.path.clone()).write(&content)?;
        watch_info!("Recorded new state at {:?}", self.path);
        Ok(())
    }
}
