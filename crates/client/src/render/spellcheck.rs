//! Spellcheck page rendering.

use camdict_core::Error;
use scraper::{ElementRef, Html};

use crate::extract::{element_text, selector};

/// Render a spellcheck suggestions page.
///
/// The first line is the word the site could not find, followed by each
/// suggestion group's notice and its suggestions.
pub fn render_spellcheck(html: &str) -> Result<String, Error> {
    let document = Html::parse_document(html);
    let content = document
        .select(&selector("div.hfl-s"))
        .next()
        .unwrap_or_else(|| document.root_element());

    let title = heading(content).ok_or_else(|| Error::ParseFailed("spellcheck page has no heading".to_string()))?;

    let mut out = title;
    let mut groups = 0;
    for list in content.select(&selector("ul.hul-u")) {
        groups += 1;
        let notice = list.prev_siblings().find_map(ElementRef::wrap).map(element_text);
        if let Some(notice) = notice.filter(|n| !n.is_empty()) {
            out.push_str("\n\n");
            out.push_str(&notice);
        } else {
            out.push('\n');
        }
        for item in list.select(&selector("li")) {
            let suggestion = element_text(item);
            if !suggestion.is_empty() {
                out.push_str(&format!("\n  • {suggestion}"));
            }
        }
    }

    if groups == 0 {
        out.push_str("\nNo suggestions.");
    }
    Ok(out)
}

/// The searched word from the page heading, e.g. `Search suggestions for zzxyqq`.
fn heading(content: ElementRef<'_>) -> Option<String> {
    let headings: Vec<String> = content
        .select(&selector("h1"))
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();

    headings
        .iter()
        .find_map(|text| text.split_once(" for ").map(|(_, word)| word.trim().to_string()))
        .filter(|word| !word.is_empty())
        .or_else(|| headings.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPELLCHECK_HTML: &str = r#"
        <html><body>
          <div class="hfl-s lt2b lmt-10 lmb-25 lp-s_r-20">
            <h1 class="fs36 lmt-5 feature-w-big lmb-10">Search suggestions for <b>tesst</b></h1>
            <div class="lbt lb-cm lpb-10">
              <h2 class="hw">We have these words with similar spellings or pronunciations:</h2>
              <ul class="hul-u">
                <li><a href="/dictionary/english/test">test</a></li>
                <li><a href="/dictionary/english/tease">  tease </a></li>
              </ul>
              <h2>Or, were you looking for one of these?</h2>
              <ul class="hul-u">
                <li><a href="/dictionary/english/taste">taste</a></li>
              </ul>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_render_suggestions() {
        let out = render_spellcheck(SPELLCHECK_HTML).unwrap();
        let expected = "tesst\n\n\
            We have these words with similar spellings or pronunciations:\n  • test\n  • tease\n\n\
            Or, were you looking for one of these?\n  • taste";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_render_no_suggestions() {
        let html = r#"<div class="hfl-s"><h1>Search suggestions for zzxyqq</h1></div>"#;
        assert_eq!(render_spellcheck(html).unwrap(), "zzxyqq\nNo suggestions.");
    }

    #[test]
    fn test_heading_fallbacks() {
        let html = r#"<div class="hfl-s"><h1>Spellcheck</h1><h1>Search suggestions for forum</h1></div>"#;
        assert!(render_spellcheck(html).unwrap().starts_with("forum\n"));

        let html = r#"<div class="hfl-s"><h1>Spellcheck</h1></div>"#;
        assert!(render_spellcheck(html).unwrap().starts_with("Spellcheck\n"));
    }

    #[test]
    fn test_missing_heading() {
        let err = render_spellcheck("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert!(matches!(err, Error::ParseFailed(_)));
    }
}
