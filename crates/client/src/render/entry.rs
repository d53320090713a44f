//! Entry page rendering.

use camdict_core::Error;
use scraper::{ElementRef, Html};
use url::Url;

use crate::extract::{element_text, first_text, selector};

/// Render a dictionary entry page.
///
/// Each entry block becomes a header line (headword, part of speech,
/// pronunciations) followed by its senses and definitions with examples.
/// A page with no `div.pr.dictionary` section is [`Error::EntryNotFound`].
pub fn render_entry(url: &Url, html: &str) -> Result<String, Error> {
    let document = Html::parse_document(html);
    let dictionary = document
        .select(&selector("div.pr.dictionary"))
        .next()
        .ok_or_else(|| Error::EntryNotFound(url.to_string()))?;

    let mut blocks: Vec<ElementRef<'_>> = dictionary.select(&selector("div.entry-body__el")).collect();
    if blocks.is_empty() {
        blocks = dictionary.select(&selector("div.idiom-block")).collect();
    }
    if blocks.is_empty() {
        blocks.push(dictionary);
    }

    let mut out = String::new();
    for block in blocks {
        render_block(block, &mut out);
    }

    let out = out.trim_start_matches('\n').trim_end().to_string();
    if out.is_empty() {
        return Err(Error::EntryNotFound(url.to_string()));
    }
    Ok(out)
}

fn render_block(block: ElementRef<'_>, out: &mut String) {
    let mut header = Vec::new();
    if let Some(word) = first_text(block, ".di-title").or_else(|| first_text(block, ".hw")) {
        header.push(word);
    }
    if let Some(pos) = first_text(block, ".posgram").or_else(|| first_text(block, ".pos")) {
        header.push(pos);
    }
    if let Some(uk) = first_text(block, ".uk.dpron-i .pron") {
        header.push(format!("UK {uk}"));
    }
    if let Some(us) = first_text(block, ".us.dpron-i .pron") {
        header.push(format!("US {us}"));
    }
    if !header.is_empty() {
        out.push('\n');
        out.push_str(&header.join("  "));
        out.push('\n');
    }

    let senses: Vec<ElementRef<'_>> = block.select(&selector("div.dsense")).collect();
    if senses.is_empty() {
        render_definitions(block, out);
        return;
    }

    for sense in senses {
        if let Some(title) = first_text(sense, "h3.dsense_h") {
            out.push('\n');
            out.push_str(&title);
            out.push('\n');
        }
        render_definitions(sense, out);
    }
}

fn render_definitions(root: ElementRef<'_>, out: &mut String) {
    for def_block in root.select(&selector("div.def-block")) {
        let Some(meaning) = first_text(def_block, ".def") else {
            continue;
        };
        let meaning = meaning.trim_end_matches(':').trim_end();
        out.push_str(&format!("  • {meaning}\n"));

        for example in def_block.select(&selector(".examp")) {
            let text = element_text(example);
            if !text.is_empty() {
                out.push_str(&format!("      {text}\n"));
            }
        }
    }
}
