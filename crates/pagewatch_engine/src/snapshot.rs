use scraper::{ElementRef, Html, Selector};

/// Rendered page content that can be queried with CSS selectors.
///
/// Holds the markup rather than a parsed tree so it can cross await points;
/// each query parses the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    url: String,
    html: String,
}

/// A selector could not be parsed or evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector '{selector}': {message}")]
pub struct QueryError {
    pub selector: String,
    pub message: String,
}

/// Owned view of one matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: String,
    lines: Vec<String>,
    attributes: Vec<(String, String)>,
}

impl Snapshot {
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<Element>, QueryError> {
        let selector = parse_selector(selector)?;
        let doc = Html::parse_document(&self.html);
        Ok(doc.select(&selector).map(Element::from_ref).collect())
    }

    /// For each element matching `outer`, its first descendant matching `inner`.
    ///
    /// Outer matches without such a descendant are left out.
    pub fn select_within(&self, outer: &str, inner: &str) -> Result<Vec<Element>, QueryError> {
        let outer = parse_selector(outer)?;
        let inner = parse_selector(inner)?;
        let doc = Html::parse_document(&self.html);
        Ok(doc
            .select(&outer)
            .filter_map(|row| row.select(&inner).next())
            .map(Element::from_ref)
            .collect())
    }

    pub fn body(&self) -> Option<Element> {
        self.select("body").ok()?.into_iter().next()
    }
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        let chunks = visible_text(element);
        let text = collapse_whitespace(&chunks.join(" "));
        let lines = chunks
            .iter()
            .flat_map(|chunk| chunk.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        let attributes = element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self {
            name: element.value().name().to_string(),
            text,
            lines,
            attributes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Visible text with runs of whitespace collapsed to single spaces.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Visible text split into trimmed, non-empty lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of a style property as declared on the element.
    ///
    /// Static markup has no cascade, so the inline declaration stands in for
    /// the computed style.
    pub fn style_property(&self, property: &str) -> Option<&str> {
        self.attr("style")?
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(property))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Locators inside every `url(...)` of a CSS value, quotes removed.
pub fn css_urls(value: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find("url(") {
        let after = &rest[start + 4..];
        let Some(end) = after.find(')') else {
            break;
        };
        let locator = after[..end].trim().trim_matches(['"', '\'']).trim();
        if !locator.is_empty() {
            urls.push(locator.to_string());
        }
        rest = &after[end + 1..];
    }
    urls
}

fn parse_selector(selector: &str) -> Result<Selector, QueryError> {
    Selector::parse(selector).map_err(|err| QueryError {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

fn visible_text(element: ElementRef<'_>) -> Vec<String> {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name()))
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"));
            (!hidden).then(|| text.to_string())
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
