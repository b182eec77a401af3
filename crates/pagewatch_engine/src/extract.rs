use pagewatch_core::ExtractionResult;
use pagewatch_logging::{watch_debug, watch_info, watch_warn};
use serde::{Deserialize, Serialize};

use crate::snapshot::{css_urls, Element, QueryError, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceOrder {
    /// Document order of first appearance.
    #[default]
    FirstSeen,
    /// Lexicographic.
    Sorted,
}

/// One way of pulling structured content out of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStrategy {
    /// Text of list/table rows, one line per accepted row.
    Rows {
        selector: String,
        /// Sub-selector whose first match inside a row provides the text;
        /// rows without a match are skipped.
        #[serde(default)]
        field: Option<String>,
        /// Rows whose whole text equals one of these (case-insensitive) are
        /// headers or placeholders.
        #[serde(default)]
        stop_words: Vec<String>,
        /// Longer candidates are taken to be garbled or concatenated text.
        #[serde(default)]
        max_chars: Option<usize>,
    },
    /// Attribute values of matching elements, usually `img[src]`.
    Images {
        #[serde(default = "default_image_selector")]
        selector: String,
        #[serde(default = "default_image_attribute")]
        attribute: String,
        /// Only keep locators ending with this (case-insensitive), e.g. `.gif`.
        #[serde(default)]
        suffix: Option<String>,
        #[serde(default)]
        order: ResourceOrder,
    },
    /// Locators from `background-image` style declarations.
    BackgroundImages {
        #[serde(default = "default_background_selector")]
        selector: String,
        #[serde(default)]
        order: ResourceOrder,
    },
    /// Every visible line of the page body.
    BodyText,
}

fn default_image_selector() -> String {
    "img".to_string()
}

fn default_image_attribute() -> String {
    "src".to_string()
}

fn default_background_selector() -> String {
    "[style]".to_string()
}

impl ExtractionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rows { .. } => "rows",
            Self::Images { .. } => "images",
            Self::BackgroundImages { .. } => "background-images",
            Self::BodyText => "body-text",
        }
    }

    /// Runs this strategy alone; an empty result means "nothing found".
    pub fn apply(&self, snapshot: &Snapshot) -> Result<ExtractionResult, QueryError> {
        match self {
            Self::Rows {
                selector,
                field,
                stop_words,
                max_chars,
            } => {
                let rows = match field {
                    Some(field) => snapshot.select_within(selector, field)?,
                    None => snapshot.select(selector)?,
                };
                let stop_words: Vec<String> =
                    stop_words.iter().map(|w| w.trim().to_lowercase()).collect();
                let lines = rows
                    .iter()
                    .map(Element::text)
                    .filter(|text| !text.is_empty())
                    .filter(|text| {
                        let lowered = text.to_lowercase();
                        !stop_words.iter().any(|word| lowered == *word)
                    })
                    .filter(|text| max_chars.is_none_or(|max| text.chars().count() <= max))
                    .map(ToOwned::to_owned)
                    .collect();
                Ok(ExtractionResult::TextSample(lines))
            }
            Self::Images {
                selector,
                attribute,
                suffix,
                order,
            } => {
                let suffix = suffix.as_deref().map(str::to_lowercase);
                let locators = snapshot
                    .select(selector)?
                    .iter()
                    .filter_map(|el| el.attr(attribute))
                    .map(str::trim)
                    .filter(|locator| !locator.is_empty())
                    .filter(|locator| {
                        suffix
                            .as_deref()
                            .is_none_or(|s| locator.to_lowercase().ends_with(s))
                    })
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>();
                Ok(ordered(locators, *order))
            }
            Self::BackgroundImages { selector, order } => {
                let locators = snapshot
                    .select(selector)?
                    .iter()
                    .filter_map(|el| el.style_property("background-image"))
                    .flat_map(css_urls)
                    .collect::<Vec<_>>();
                Ok(ordered(locators, *order))
            }
            Self::BodyText => {
                let lines = snapshot
                    .body()
                    .map(|body| body.lines().to_vec())
                    .unwrap_or_default();
                Ok(ExtractionResult::TextSample(lines))
            }
        }
    }
}

fn ordered(locators: Vec<String>, order: ResourceOrder) -> ExtractionResult {
    let result = ExtractionResult::resources(locators);
    match (order, result) {
        (ResourceOrder::Sorted, ExtractionResult::ResourceList(mut items)) => {
            items.sort();
            ExtractionResult::ResourceList(items)
        }
        (_, result) => result,
    }
}

/// Runs `chain` in order and commits to the first non-empty result.
///
/// Strategies whose query fails are skipped like empty ones. When nothing
/// yields content the result is `ExtractionResult::empty()`.
pub fn extract(snapshot: &Snapshot, chain: &[ExtractionStrategy]) -> ExtractionResult {
    for (position, strategy) in chain.iter().enumerate() {
        match strategy.apply(snapshot) {
            Ok(result) if !result.is_empty() => {
                watch_info!(
                    "Strategy #{} ({}) extracted {} {}",
                    position,
                    strategy.name(),
                    result.len(),
                    result.unit()
                );
                return result;
            }
            Ok(_) => {
                watch_debug!("Strategy #{} ({}) found nothing", position, strategy.name());
            }
            Err(err) => {
                watch_warn!("Strategy #{} ({}) failed: {}", position, strategy.name(), err);
            }
        }
    }
    watch_info!("No extraction strategy yielded content for {}", snapshot.url());
    ExtractionResult::empty()
}
