//! Pagewatch core: pure change-detection logic (no IO).
mod classify;
mod fingerprint;
mod result;
mod selection;
mod state;

pub use classify::{classify, ChangeOutcome};
pub use fingerprint::{
    fingerprint, truncate_to_boundary, Fingerprint, FingerprintMode, EMPTY_MARKER,
};
pub use result::ExtractionResult;
pub use selection::{file_name, LabelRule, MissingLabel, Pick, SelectionPolicy};
pub use state::PersistedState;
