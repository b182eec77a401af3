use crate::{ExtractionResult, Fingerprint, FingerprintMode};

/// The record carried from one run to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedState {
    pub fingerprint: Fingerprint,
    /// `None` before the first recorded change, and always in scalar mode
    /// (the on-disk digest cannot hold it).
    pub raw_result: Option<ExtractionResult>,
}

impl PersistedState {
    pub fn empty(mode: FingerprintMode) -> Self {
        Self {
            fingerprint: Fingerprint::empty(mode),
            raw_result: None,
        }
    }

    /// State to record after observing `result` with `fingerprint`.
    ///
    /// Membership sets keep the ordered, deduplicated items as a resource list;
    /// digests and empty observations keep nothing but the fingerprint.
    pub fn observed(fingerprint: Fingerprint, result: &ExtractionResult) -> Self {
        let raw_result = match fingerprint.mode() {
            FingerprintMode::Scalar => None,
            FingerprintMode::SetBased if result.is_empty() => None,
            FingerprintMode::SetBased => {
                Some(ExtractionResult::resources(result.items().iter().cloned()))
            }
        };
        Self {
            fingerprint,
            raw_result,
        }
    }

    pub fn mode(&self) -> FingerprintMode {
        self.fingerprint.mode()
    }

    pub fn is_first_run(&self) -> bool {
        self.raw_result.is_none() && self.fingerprint.is_empty()
    }
}
