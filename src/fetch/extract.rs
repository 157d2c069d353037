//! Paragraph text extraction
//!
//! Both fetch strategies extract the same thing: the text of every `<p>`
//! element, whitespace collapsed, joined by single spaces. The lightweight
//! path does it on parsed markup; the rendered path runs
//! [`PARAGRAPH_SCRIPT`] inside the live DOM.

use scraper::{Html, Selector};

/// In-page equivalent of [`extract_paragraphs`]
pub const PARAGRAPH_SCRIPT: &str = r#"Array.from(document.querySelectorAll('p'))
    .map(p => (p.innerText || '').replace(/\s+/g, ' ').trim())
    .filter(t => t.length > 0)
    .join(' ')"#;

/// Concatenate the text of all paragraph elements in `html`
pub fn extract_paragraphs(html: &str) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
