use crate::{ExtractionResult, Fingerprint, MissingLabel, SelectionPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    Changed {
        /// Short label selected from the current result.
        highlight: String,
        /// Items present now but missing from the last membership set, in result order.
        added: Vec<String>,
    },
    Unchanged,
    InsufficientData(String),
}

/// Compares the current observation against the last recorded one.
///
/// Selection runs against `current_result` in extractor order, never against
/// the fingerprint, since membership sets discard order.
pub fn classify(
    current: &Fingerprint,
    last: &Fingerprint,
    current_result: &ExtractionResult,
    policy: &SelectionPolicy,
) -> ChangeOutcome {
    if current == last {
        return ChangeOutcome::Unchanged;
    }

    if current_result.len() < policy.min_len() {
        return ChangeOutcome::InsufficientData(format!(
            "{:?} needs at least {} item(s), found {}",
            policy.pick,
            policy.min_len(),
            current_result.len()
        ));
    }

    let highlight = match policy.select(current_result) {
        Some(label) => label,
        None => match &policy.on_missing_label {
            MissingLabel::Placeholder(text) => text.clone(),
            MissingLabel::Insufficient => {
                return ChangeOutcome::InsufficientData(format!(
                    "{:?} element has no {:?} label",
                    policy.pick, policy.label
                ));
            }
        },
    };

    ChangeOutcome::Changed {
        highlight,
        added: added_items(current, last, current_result),
    }
}

fn added_items(
    current: &Fingerprint,
    last: &Fingerprint,
    result: &ExtractionResult,
) -> Vec<String> {
    match (current, last) {
        (Fingerprint::MembershipSet(_), Fingerprint::MembershipSet(previous)) => {
            let mut added: Vec<String> = Vec::new();
            for item in result.items() {
                if !previous.contains(item) && !added.contains(item) {
                    added.push(item.clone());
                }
            }
            added
        }
        _ => Vec::new(),
    }
}
