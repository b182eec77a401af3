use std::collections::HashSet;

/// Structured content pulled out of a page snapshot.
///
/// Empty results are explicit empty vectors; no sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// Text lines in DOM order.
    TextSample(Vec<String>),
    /// Deduplicated resource locators (e.g. image URLs).
    ResourceList(Vec<String>),
}

impl ExtractionResult {
    /// The result produced when no strategy yields content.
    pub fn empty() -> Self {
        Self::TextSample(Vec::new())
    }

    /// Builds a resource list, keeping the first occurrence of each locator.
    pub fn resources<I, S>(locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let items = locators
            .into_iter()
            .map(Into::into)
            .filter(|locator| seen.insert(locator.clone()))
            .collect();
        Self::ResourceList(items)
    }

    pub fn items(&self) -> &[String] {
        match self {
            Self::TextSample(lines) => lines,
            Self::ResourceList(locators) => locators,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Short noun for log lines and summaries.
    /// Counting noun for this result's items, singular for exactly one.
    pub fn unit(&self) -> &'static str {
        match (self, self.len()) {
            (Self::TextSample(_), 1) => "line",
            (Self::TextSample(_), _) => "lines",
            (Self::ResourceList(_), 1) => "resource",
            (Self::ResourceList(_), _) => "resources",
        }
    }
}
