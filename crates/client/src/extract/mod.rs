//! Small extraction helpers shared by the lookup pipeline and the renderer.

use scraper::{ElementRef, Html, Selector};

/// Parse a static CSS selector.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

/// Canonical word from a dictionary page title.
///
/// Cambridge titles look like `TEST | English meaning - Cambridge Dictionary`;
/// the part before the first `|`, trimmed and lowercased, is the word.
pub fn response_word(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title = document.select(&selector("title")).next()?;
    let text = title.text().collect::<String>();
    let word = text.split('|').next().unwrap_or_default().trim().to_lowercase();
    if word.is_empty() { None } else { Some(word) }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Cleaned text of the first match of `css` under `root`, if non-empty.
pub(crate) fn first_text(root: ElementRef<'_>, css: &str) -> Option<String> {
    root.select(&selector(css))
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}
