use serde::{Deserialize, Serialize};

use crate::ExtractionResult;

/// Which element of a changed result is surfaced in the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pick {
    First,
    Second,
    SecondToLast,
    Last,
    /// No single element; report how many items were observed.
    #[default]
    Summary,
}

impl Pick {
    /// Fewest items a result needs before this pick can be applied.
    pub fn min_len(self) -> usize {
        match self {
            Self::First | Self::Last | Self::Summary => 1,
            Self::Second | Self::SecondToLast => 2,
        }
    }

    /// Position of the picked element, or `None` for `Summary` and short results.
    pub fn index(self, len: usize) -> Option<usize> {
        if len < self.min_len() {
            return None;
        }
        match self {
            Self::First => Some(0),
            Self::Second => Some(1),
            Self::SecondToLast => Some(len - 2),
            Self::Last => Some(len - 1),
            Self::Summary => None,
        }
    }
}

/// How a picked element is shortened into a human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelRule {
    /// Last path segment of a locator, without query or fragment.
    FileName,
    /// The n-th whitespace-delimited token of a line.
    Token(usize),
    #[default]
    Whole,
}

impl LabelRule {
    pub fn apply(self, item: &str) -> Option<String> {
        let label = match self {
            Self::FileName => file_name(item),
            Self::Token(n) => item.split_whitespace().nth(n).unwrap_or(""),
            Self::Whole => item.trim(),
        };
        (!label.is_empty()).then(|| label.to_string())
    }
}

/// What to do when the picked element yields no label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingLabel {
    /// Report `InsufficientData` instead of notifying.
    #[default]
    Insufficient,
    /// Notify anyway, using this text as the highlight.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    pub pick: Pick,
    pub label: LabelRule,
    pub on_missing_label: MissingLabel,
}

impl SelectionPolicy {
    pub fn min_len(&self) -> usize {
        self.pick.min_len()
    }

    /// Label for the picked element of `result`, in extractor order.
    ///
    /// Returns `None` when the result is too short or the label is empty.
    pub fn select(&self, result: &ExtractionResult) -> Option<String> {
        if self.pick == Pick::Summary {
            if result.len() < self.min_len() {
                return None;
            }
            return Some(format!("{} {}", result.len(), result.unit()));
        }
        let index = self.pick.index(result.len())?;
        result
            .items()
            .get(index)
            .and_then(|item| self.label.apply(item))
    }
}

/// Filename component of a locator such as `https://host/a/b/3.png?v=2`.
pub fn file_name(locator: &str) -> &str {
    let end = locator.find(['?', '#']).unwrap_or(locator.len());
    let path = locator[..end].trim().trim_end_matches('/');
    path.rsplit('/').next().unwrap_or(path)
}
